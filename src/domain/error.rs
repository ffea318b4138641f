//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Identity validation error
    #[error("Identity cannot be empty")]
    IdentityEmpty,

    /// Identity too long error
    #[error("Identity cannot exceed {max} characters (got {actual})")]
    IdentityTooLong { max: usize, actual: usize },

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors related to room lookup and lifecycle
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Room does not exist (or was never created)
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// Errors related to membership operations (join, status, leave)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// Room does not exist or is closed
    #[error("room '{0}' not found or closed")]
    RoomNotFound(String),

    /// The connection has already joined a room
    #[error("connection '{0}' has already joined a room")]
    DuplicateJoin(String),

    /// The connection has no participant entry in the room
    #[error("connection '{0}' has not joined this room")]
    NotJoined(String),
}

/// Errors related to message routing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Room does not exist or is closed
    #[error("room '{0}' not found or closed")]
    RoomNotFound(String),

    /// The sender has no participant entry or has not selected PRO/CON yet
    #[error("connection '{0}' is not eligible to chat (select PRO/CON first)")]
    NotEligible(String),
}
