//! Conversion logic between DTOs and domain entities.

use crate::domain::{
    entity::{Event, EventKind},
    value_object::DebateSide,
};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain → DTO
// ========================================

impl From<DebateSide> for dto::SideDto {
    fn from(side: DebateSide) -> Self {
        match side {
            DebateSide::Pro => dto::SideDto::Pro,
            DebateSide::Con => dto::SideDto::Con,
        }
    }
}

impl From<EventKind> for dto::EventType {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Join => dto::EventType::Join,
            EventKind::Leave => dto::EventType::Leave,
            EventKind::Status => dto::EventType::Status,
            EventKind::Chat => dto::EventType::Chat,
            EventKind::RoomClosed => dto::EventType::RoomClosed,
        }
    }
}

impl From<&Event> for dto::EventMessage {
    fn from(event: &Event) -> Self {
        Self {
            r#type: event.kind.into(),
            sender: event.sender.as_str().to_string(),
            room_id: event.room_id.as_str().to_string(),
            content: event.content.as_ref().map(|c| c.as_str().to_string()),
            status: event.status.map(Into::into),
            timestamp: event.timestamp.value(),
        }
    }
}

// ========================================
// DTO → Domain
// ========================================

impl From<dto::SideDto> for DebateSide {
    fn from(side: dto::SideDto) -> Self {
        match side {
            dto::SideDto::Pro => DebateSide::Pro,
            dto::SideDto::Con => DebateSide::Con,
        }
    }
}
