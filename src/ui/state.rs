//! Server state shared across handlers.

use std::{sync::Arc, time::Duration};

use crate::infrastructure::auth::TokenVerifier;
use crate::usecase::{
    CloseRoomUseCase, CreateRoomUseCase, GetRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    ListRoomsUseCase, PublishChatUseCase, SelectStatusUseCase,
};

/// Shared application state
pub struct AppState {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// CloseRoomUseCase（ルームクローズのユースケース）
    pub close_room_usecase: Arc<CloseRoomUseCase>,
    /// GetRoomUseCase（ルーム詳細取得のユースケース）
    pub get_room_usecase: Arc<GetRoomUseCase>,
    /// ListRoomsUseCase（ルーム一覧取得のユースケース）
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// SelectStatusUseCase（PRO/CON 選択のユースケース）
    pub select_status_usecase: Arc<SelectStatusUseCase>,
    /// PublishChatUseCase（チャット配信のユースケース）
    pub publish_chat_usecase: Arc<PublishChatUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// TokenVerifier（Bearer トークン検証の抽象化）
    pub token_verifier: Arc<dyn TokenVerifier>,
    /// アイドル接続を切断するまでの時間
    pub idle_timeout: Duration,
}
