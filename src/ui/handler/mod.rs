//! HTTP and WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{create_room, delete_room, get_room_detail, health_check, list_rooms};
pub use websocket::websocket_handler;
