//! UseCase layer: application services orchestrating domain operations.

pub mod close_room;
pub mod create_room;
pub mod error;
pub mod get_room;
pub mod join_room;
pub mod leave_room;
pub mod list_rooms;
pub mod publish_chat;
pub mod select_status;

pub use close_room::CloseRoomUseCase;
pub use create_room::CreateRoomUseCase;
pub use error::CloseRoomError;
pub use get_room::GetRoomUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use publish_chat::PublishChatUseCase;
pub use select_status::SelectStatusUseCase;
