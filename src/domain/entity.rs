//! Domain entities: rooms, participants and broadcast events.

use super::value_object::{ConnectionId, DebateSide, Identity, MessageContent, RoomId, Timestamp};

/// Lifecycle state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Active,
    Closed,
}

/// A debate room.
///
/// Owned exclusively by the Room Registry; created over REST by a teacher
/// and closed explicitly (or when the server shuts down).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub creator_id: Identity,
    pub created_at: Timestamp,
    pub state: RoomState,
}

impl Room {
    /// Create a new room in the ACTIVE state.
    pub fn new(id: RoomId, creator_id: Identity, created_at: Timestamp) -> Self {
        Self {
            id,
            creator_id,
            created_at,
            state: RoomState::Active,
        }
    }

    /// Mark the room CLOSED. Idempotent.
    pub fn close(&mut self) {
        self.state = RoomState::Closed;
    }

    pub fn is_active(&self) -> bool {
        self.state == RoomState::Active
    }
}

/// One connected identity within a room.
///
/// Keyed by connection id; at most one live entry per connection across all
/// rooms. `status` starts unset and must be selected before chatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub status: Option<DebateSide>,
    pub joined_at: Timestamp,
}

impl Participant {
    /// Create a participant with no debate side selected yet.
    pub fn new(connection_id: ConnectionId, identity: Identity, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            identity,
            status: None,
            joined_at,
        }
    }

    /// Select (or re-select) a debate side. Overwrite is allowed.
    pub fn select_status(&mut self, side: DebateSide) {
        self.status = Some(side);
    }

    /// A participant may chat only after selecting a side.
    pub fn is_eligible_to_chat(&self) -> bool {
        self.status.is_some()
    }
}

/// Kind of a broadcast event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Join,
    Leave,
    Status,
    Chat,
    RoomClosed,
}

/// A notification broadcast to a room's subscribers.
///
/// Events are transient: constructed per action, fanned out once, never
/// persisted. The `sender` always comes from the authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub sender: Identity,
    pub room_id: RoomId,
    pub content: Option<MessageContent>,
    pub status: Option<DebateSide>,
    pub timestamp: Timestamp,
}

impl Event {
    /// JOIN event for a participant entering the room.
    pub fn join(room_id: RoomId, sender: Identity, timestamp: Timestamp) -> Self {
        Self {
            kind: EventKind::Join,
            sender,
            room_id,
            content: None,
            status: None,
            timestamp,
        }
    }

    /// LEAVE event for a participant leaving (explicitly or on disconnect).
    pub fn leave(room_id: RoomId, sender: Identity, timestamp: Timestamp) -> Self {
        Self {
            kind: EventKind::Leave,
            sender,
            room_id,
            content: None,
            status: None,
            timestamp,
        }
    }

    /// STATUS event for a PRO/CON selection.
    pub fn status(room_id: RoomId, sender: Identity, side: DebateSide, timestamp: Timestamp) -> Self {
        Self {
            kind: EventKind::Status,
            sender,
            room_id,
            content: None,
            status: Some(side),
            timestamp,
        }
    }

    /// ROOM_CLOSED event pushed to every subscriber just before the room's
    /// connections are dropped. `sender` is the room creator.
    pub fn room_closed(room_id: RoomId, sender: Identity, timestamp: Timestamp) -> Self {
        Self {
            kind: EventKind::RoomClosed,
            sender,
            room_id,
            content: None,
            status: None,
            timestamp,
        }
    }

    /// CHAT event carrying a message and the sender's current side.
    pub fn chat(
        room_id: RoomId,
        sender: Identity,
        side: DebateSide,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            kind: EventKind::Chat,
            sender,
            room_id,
            content: Some(content),
            status: Some(side),
            timestamp,
        }
    }
}
