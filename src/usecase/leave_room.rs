//! UseCase: ルーム退出処理
//!
//! 明示的な退出と切断検知の両方からこのユースケースが呼ばれます。
//! どちらが先でも LEAVE イベントはちょうど 1 回だけ配信されます（冪等）。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{ConnectionId, Event, RoomRegistry, Timestamp};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム退出を実行
    ///
    /// # Returns
    ///
    /// * `Some(Event)` - 配信された LEAVE イベント
    /// * `None` - 接続はどのルームにも参加していなかった
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Event> {
        let timestamp = Timestamp::new(get_jst_timestamp());
        let event = self.registry.leave(connection_id, timestamp).await?;
        tracing::info!(
            "Connection '{}' left room '{}'",
            connection_id,
            event.room_id
        );
        Some(event)
    }
}
