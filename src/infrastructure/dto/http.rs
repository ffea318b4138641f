//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::SideDto;

/// Request body of `POST /chat/room`.
///
/// `teacher_id` must match the authenticated identity; the room creator is
/// always taken from the token, never from the body alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub teacher_id: Option<String>,
}

/// Response body of `POST /chat/room` (201 Created).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// One entry of the `GET /chat/room` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub state: String,
    pub created_at: String,
}

/// Response body of `GET /chat/room/{room_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailResponse {
    pub room_id: String,
    pub creator_id: String,
    pub state: String,
    pub created_at: String,
    pub participants: Vec<ParticipantInfo>,
}

/// One participant entry inside [`RoomDetailResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SideDto>,
    pub joined_at: String,
}

/// Error body shared by all HTTP error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
