//! UseCase: ルーム作成処理

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{Identity, Room, RoomRegistry, Timestamp};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `creator_id` - 作成者の認証済み identity（Domain Model）
    ///
    /// # Returns
    ///
    /// 作成されたルーム（ACTIVE 状態、サーバー発行 ID）
    pub async fn execute(&self, creator_id: Identity) -> Room {
        let created_at = Timestamp::new(get_jst_timestamp());
        let room = self.registry.create_room(creator_id, created_at).await;
        tracing::info!("Room '{}' created by '{}'", room.id, room.creator_id);
        room
    }
}
