//! UseCase: ルーム一覧取得処理

use std::sync::Arc;

use crate::domain::{Identity, Room, RoomRegistry};

/// ルーム一覧取得のユースケース
pub struct ListRoomsUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl ListRoomsUseCase {
    /// 新しい ListRoomsUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 認証済み identity が作成したルーム一覧を取得
    ///
    /// # Returns
    ///
    /// * `Vec<Room>` - 作成時刻順のルームリスト（作成したルームが無ければ空）
    pub async fn execute(&self, creator_id: &Identity) -> Vec<Room> {
        self.registry.get_rooms_by_creator(creator_id).await
    }
}
