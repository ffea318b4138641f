//! UseCase: ルームクローズ処理
//!
//! クローズはルーム作成者にのみ許可されます。クローズされたルームの
//! 全参加者は切断されます（Broker が購読チャネルへ Close を送出）。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{ConnectionId, Identity, RoomId, RoomRegistry, Timestamp};

use super::error::CloseRoomError;

/// ルームクローズのユースケース
pub struct CloseRoomUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl CloseRoomUseCase {
    /// 新しい CloseRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルームクローズを実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - クローズ対象のルーム ID
    /// * `requester` - リクエスト元の認証済み identity
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 切断された接続の ID リスト
    /// * `Err(CloseRoomError)` - ルームが存在しない、または作成者でない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        requester: &Identity,
    ) -> Result<Vec<ConnectionId>, CloseRoomError> {
        // 1. 作成者チェック
        let room = self
            .registry
            .get_room(room_id)
            .await
            .map_err(|_| CloseRoomError::RoomNotFound(room_id.as_str().to_string()))?;
        if room.creator_id != *requester {
            return Err(CloseRoomError::NotCreator);
        }

        // 2. クローズして全参加者を切断（ROOM_CLOSED 通知は Broker が配信する）
        let disconnected = self
            .registry
            .close_room(room_id, Timestamp::new(get_jst_timestamp()))
            .await
            .map_err(|_| CloseRoomError::RoomNotFound(room_id.as_str().to_string()))?;

        tracing::info!(
            "Room '{}' closed by '{}', {} connection(s) disconnected",
            room_id,
            requester,
            disconnected.len()
        );
        Ok(disconnected)
    }
}
