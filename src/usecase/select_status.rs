//! UseCase: PRO/CON 選択処理

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    ConnectionId, DebateSide, Event, MembershipError, RoomId, RoomRegistry, Timestamp,
};

/// PRO/CON 選択のユースケース
pub struct SelectStatusUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl SelectStatusUseCase {
    /// 新しい SelectStatusUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// PRO/CON 選択を実行（再選択は上書き）
    ///
    /// # Returns
    ///
    /// * `Ok(Event)` - 配信された STATUS イベント
    /// * `Err(MembershipError)` - ルームが存在しない / 接続が未参加
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        side: DebateSide,
    ) -> Result<Event, MembershipError> {
        let timestamp = Timestamp::new(get_jst_timestamp());
        let event = self
            .registry
            .set_status(room_id, connection_id, side, timestamp)
            .await?;
        tracing::debug!(
            "Connection '{}' selected {} in room '{}'",
            connection_id,
            side,
            room_id
        );
        Ok(event)
    }
}
