//! UseCase: チャット配信処理
//!
//! sender と PRO/CON は Router がメンバーシップの記録から解決するため、
//! ここではクライアント申告の識別情報を一切受け取りません。

use std::sync::Arc;

use crate::common::time::get_jst_timestamp;
use crate::domain::{
    ConnectionId, Event, MessageContent, MessageRouter, RoomId, RouteError, Timestamp,
};

/// チャット配信のユースケース
pub struct PublishChatUseCase {
    /// Router（イベント配信の抽象化）
    router: Arc<dyn MessageRouter>,
}

impl PublishChatUseCase {
    /// 新しい PublishChatUseCase を作成
    pub fn new(router: Arc<dyn MessageRouter>) -> Self {
        Self { router }
    }

    /// チャット配信を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 配信先のルーム ID
    /// * `connection_id` - 送信元接続の ID（sender の解決に使用）
    /// * `content` - メッセージ内容（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(Event)` - 配信された CHAT イベント
    /// * `Err(RouteError)` - ルームが存在しない / 送信資格がない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        content: MessageContent,
    ) -> Result<Event, RouteError> {
        let timestamp = Timestamp::new(get_jst_timestamp());
        let event = self
            .router
            .publish_chat(room_id, connection_id, content, timestamp)
            .await?;
        tracing::debug!(
            "Chat from '{}' published to room '{}'",
            event.sender,
            room_id
        );
        Ok(event)
    }
}
