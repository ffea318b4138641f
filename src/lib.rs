//! Room-scoped debate chat broker library.
//!
//! This library provides the server implementation of a publish/subscribe
//! debate chat: room lifecycle over REST, authenticated WebSocket sessions,
//! PRO/CON membership tracking and ordered event fan-out per room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
