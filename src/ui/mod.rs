//! Debate chat broker server implementation.

mod handler;
mod server;
mod signal;
pub mod state; // Handler 層からアクセスするため public

pub use server::Server;
