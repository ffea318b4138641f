//! UseCase: ルーム参加処理
//!
//! 参加者の追加と JOIN イベントの配信は Broker がルーム単位のロックの
//! 内側でまとめて行うため、このユースケースは薄いオーケストレーションです。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    ConnectionId, Event, Identity, MembershipError, RoomId, RoomRegistry, SubscriberChannel,
    Timestamp,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（ルーム管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加先のルーム ID
    /// * `connection_id` - 参加する接続の ID
    /// * `identity` - 接続の認証済み identity
    /// * `channel` - 接続へのイベント送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Event)` - 配信された JOIN イベント
    /// * `Err(MembershipError)` - ルームが存在しない / クローズ済み / 重複参加
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        identity: Identity,
        channel: SubscriberChannel,
    ) -> Result<Event, MembershipError> {
        let joined_at = Timestamp::new(get_jst_timestamp());
        let event = self
            .registry
            .join(room_id, connection_id.clone(), identity, channel, joined_at)
            .await?;
        tracing::info!(
            "Connection '{}' joined room '{}' as '{}'",
            connection_id,
            room_id,
            event.sender
        );
        Ok(event)
    }
}
