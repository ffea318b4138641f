//! WebSocket frame DTOs.
//!
//! ## Inbound (client → server)
//!
//! Clients send [`CommandFrame`]s: a `destination` path selecting a room and
//! a verb, plus a free-form JSON `payload` interpreted per verb:
//!
//! ```json
//! {"destination": "/app/room/<roomId>/join", "payload": {}}
//! {"destination": "/app/room/<roomId>/status", "payload": {"status": "PRO"}}
//! {"destination": "/app/room/<roomId>/chat", "payload": {"content": "..."}}
//! ```
//!
//! ## Outbound (server → client)
//!
//! The server pushes [`EventMessage`]s (broadcast to the room) and
//! [`ErrorMessage`]s (to the issuing connection only). `sender` is always
//! the server-side authenticated identity; any sender field a client puts
//! into a payload is ignored by deserialization.

use serde::{Deserialize, Serialize};

/// Kind of a broadcast event frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Join,
    Leave,
    Status,
    Chat,
    RoomClosed,
}

/// Debate side on the wire (`"PRO"` / `"CON"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SideDto {
    Pro,
    Con,
}

/// Event frame broadcast to every subscriber of a room.
///
/// `content` is present only for CHAT, `status` only for STATUS and CHAT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub r#type: EventType,
    pub sender: String,
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SideDto>,
    pub timestamp: i64,
}

/// Command frame received from a client.
///
/// A missing `payload` is treated as `null`; verbs that need no payload
/// (join) accept that.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandFrame {
    pub destination: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload of a `/status` command.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSelectPayload {
    pub status: SideDto,
}

/// Payload of a `/chat` command.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    pub content: String,
}

/// Error frame pushed to the issuing connection only. Never broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: ErrorType,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Error,
}

impl ErrorMessage {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            r#type: ErrorType::Error,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Error codes carried in [`ErrorMessage::code`].
pub mod error_code {
    pub const ROOM_NOT_FOUND: &str = "ROOM_NOT_FOUND";
    pub const DUPLICATE_JOIN: &str = "DUPLICATE_JOIN";
    pub const NOT_JOINED: &str = "NOT_JOINED";
    pub const NOT_ELIGIBLE: &str = "NOT_ELIGIBLE";
    pub const BAD_COMMAND: &str = "BAD_COMMAND";
}
