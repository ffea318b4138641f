//! UseCase: ルーム詳細取得処理

use std::sync::Arc;

use crate::domain::{Participant, RegistryError, Room, RoomId, RoomRegistry};

/// ルーム詳細取得のユースケース
pub struct GetRoomUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomUseCase {
    /// 新しい GetRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルームと参加者リストを取得
    ///
    /// # Returns
    ///
    /// * `Ok((Room, Vec<Participant>))` - ルームと identity でソート済みの参加者リスト
    /// * `Err(RegistryError)` - ルームが存在しない
    pub async fn execute(
        &self,
        room_id: &RoomId,
    ) -> Result<(Room, Vec<Participant>), RegistryError> {
        let room = self.registry.get_room(room_id).await?;
        let participants = self.registry.get_participants(room_id).await?;
        Ok((room, participants))
    }
}
