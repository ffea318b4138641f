//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    common::time::timestamp_to_jst_rfc3339,
    domain::{Identity, RoomId},
    infrastructure::{
        auth::bearer_token,
        dto::http::{
            CreateRoomRequest, CreateRoomResponse, ErrorBody, ParticipantInfo, RoomDetailResponse,
            RoomSummary,
        },
    },
    ui::state::AppState,
    usecase::CloseRoomError,
};

type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, message: &str) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// Resolve the authenticated identity from the Authorization header.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, ErrorResponse> {
    let token = bearer_token(headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
    state.token_verifier.verify(token).map_err(|e| {
        tracing::warn!("Rejected request: {}", e);
        error_response(StatusCode::UNAUTHORIZED, "invalid bearer token")
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a new debate room (`POST /chat/room`)
///
/// The room creator is the authenticated identity; `teacherId` in the body
/// must match it.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ErrorResponse> {
    let identity = authenticate(&state, &headers)?;

    let teacher_id = match request.teacher_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(error_response(StatusCode::BAD_REQUEST, "teacherId is required")),
    };
    if identity.as_str() != teacher_id {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "teacherId does not match the authenticated identity",
        ));
    }

    let room = state.create_room_usecase.execute(identity).await;
    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_id: room.id.into_string(),
        }),
    ))
}

/// List rooms created by the authenticated identity (`GET /chat/room`)
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoomSummary>>, ErrorResponse> {
    let identity = authenticate(&state, &headers)?;

    let rooms = state.list_rooms_usecase.execute(&identity).await;

    // Domain Model から DTO への変換
    let summaries: Vec<RoomSummary> = rooms
        .into_iter()
        .map(|room| RoomSummary {
            room_id: room.id.clone().into_string(),
            state: if room.is_active() {
                "ACTIVE".to_string()
            } else {
                "CLOSED".to_string()
            },
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        })
        .collect();
    Ok(Json(summaries))
}

/// Get room detail with its participants (`GET /chat/room/{room_id}`)
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailResponse>, ErrorResponse> {
    authenticate(&state, &headers)?;

    let room_id = RoomId::new(room_id)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "room not found"))?;
    let (room, participants) = state
        .get_room_usecase
        .execute(&room_id)
        .await
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "room not found"))?;

    // Domain Model から DTO への変換
    let response = RoomDetailResponse {
        room_id: room.id.into_string(),
        creator_id: room.creator_id.into_string(),
        state: if room.state == crate::domain::RoomState::Active {
            "ACTIVE".to_string()
        } else {
            "CLOSED".to_string()
        },
        created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        participants: participants
            .into_iter()
            .map(|p| ParticipantInfo {
                sender: p.identity.into_string(),
                status: p.status.map(Into::into),
                joined_at: timestamp_to_jst_rfc3339(p.joined_at.value()),
            })
            .collect(),
    };
    Ok(Json(response))
}

/// Close a room and disconnect its participants (`DELETE /chat/room/{room_id}`)
///
/// Only the room creator may close it.
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    let identity = authenticate(&state, &headers)?;

    let room_id = RoomId::new(room_id)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "room not found"))?;
    match state.close_room_usecase.execute(&room_id, &identity).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(CloseRoomError::NotCreator) => Err(error_response(
            StatusCode::FORBIDDEN,
            "only the room creator may close the room",
        )),
        Err(CloseRoomError::RoomNotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "room not found"))
        }
    }
}
