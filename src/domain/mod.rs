//! Domain layer for the debate chat broker.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod broker;
pub mod entity;
pub mod error;
pub mod value_object;

pub use broker::{MessageRouter, Outbound, RoomRegistry, SubscriberChannel};
pub use entity::{Event, EventKind, Participant, Room, RoomState};
pub use error::{MembershipError, RegistryError, RouteError, ValueObjectError};
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DebateSide, Identity, MessageContent, RoomId, RoomIdFactory,
    Timestamp,
};
