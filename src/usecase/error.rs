//! UseCase layer error definitions.

use thiserror::Error;

/// Errors returned by [`super::CloseRoomUseCase`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CloseRoomError {
    /// Room does not exist
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// The requester is not the creator of the room
    #[error("only the room creator may close the room")]
    NotCreator,
}
