//! InMemory Room Broker 実装
//!
//! ドメイン層が定義する `RoomRegistry` / `MessageRouter` trait の具体的な実装。
//! HashMap をインメモリストレージとして使用します（依存性の逆転）。
//!
//! ## ルームごとの直列化
//!
//! ルームごとに `Mutex<RoomShard>` を持ち、メンバーシップの更新とイベントの
//! ファンアウトを同じロックの内側で行います。これが唯一の直列化ポイントで、
//! ルーム内のイベント配信順序は受理順序と一致します。ルームをまたぐ操作は
//! 互いにブロックしません。
//!
//! ## ロック順序
//!
//! デッドロック回避のため、複数のロックを取る場合は必ず
//! `connections` → `rooms` → shard の順で取得します。
//! shard ロックを保持したまま `connections` をロックしてはいけません。
//! `close_room` はインデックスの掃除が終わるまで `connections` を保持し、
//! 並行する leave → 再 JOIN が作ったエントリを誤って消さないようにします。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ConnectionId, DebateSide, Event, Identity, MembershipError, MessageContent, MessageRouter,
    Outbound, Participant, RegistryError, Room, RoomId, RoomIdFactory, RoomRegistry, RouteError,
    SubscriberChannel, Timestamp,
};
use crate::infrastructure::dto::websocket::EventMessage;

/// ルーム 1 つぶんの状態。shard の Mutex が直列化ポイント。
struct RoomShard {
    room: Room,
    participants: HashMap<ConnectionId, Participant>,
    subscribers: HashMap<ConnectionId, SubscriberChannel>,
}

impl RoomShard {
    fn new(room: Room) -> Self {
        Self {
            room,
            participants: HashMap::new(),
            subscribers: HashMap::new(),
        }
    }

    /// イベントを全購読者に送信する。shard ロックの内側で呼ぶこと。
    ///
    /// 切断済みの購読者への送信失敗は許容する（クリーンアップは gateway の
    /// leave 経由で行われる）。
    fn fan_out(&self, event: &Event) {
        let json = serde_json::to_string(&EventMessage::from(event)).unwrap();
        for (connection_id, channel) in &self.subscribers {
            if channel.send(Outbound::Frame(json.clone())).is_err() {
                tracing::warn!(
                    "Failed to push event to connection '{}', skipping",
                    connection_id
                );
            }
        }
    }
}

/// インメモリ Room Broker 実装
///
/// `RoomRegistry`（ルームのライフサイクル + メンバーシップ）と
/// `MessageRouter`（イベント配信）の両方を実装します。ルームの状態と
/// 購読者チャネルを同じ shard に置くことで、更新と配信を 1 つのロックで
/// 直列化できます。
pub struct InMemoryRoomBroker {
    /// ルーム ID → shard のマップ
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<RoomShard>>>>,

    /// 接続 ID → 参加中ルーム ID の逆引きインデックス
    ///
    /// 1 接続につき最大 1 エントリ（DuplicateJoin の判定に使用）。
    connections: Mutex<HashMap<ConnectionId, RoomId>>,
}

impl InMemoryRoomBroker {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
        }
    }

    async fn shard(&self, room_id: &RoomId) -> Option<Arc<Mutex<RoomShard>>> {
        self.rooms.read().await.get(room_id).cloned()
    }
}

impl Default for InMemoryRoomBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomBroker {
    async fn create_room(&self, creator_id: Identity, created_at: Timestamp) -> Room {
        let room = Room::new(RoomIdFactory::generate(), creator_id, created_at);
        let shard = Arc::new(Mutex::new(RoomShard::new(room.clone())));
        self.rooms.write().await.insert(room.id.clone(), shard);
        room
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RegistryError> {
        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.as_str().to_string()))?;
        let shard = shard.lock().await;
        Ok(shard.room.clone())
    }

    async fn get_rooms_by_creator(&self, creator_id: &Identity) -> Vec<Room> {
        let shards: Vec<Arc<Mutex<RoomShard>>> =
            self.rooms.read().await.values().cloned().collect();
        let mut rooms = Vec::new();
        for shard in shards {
            let shard = shard.lock().await;
            if shard.room.creator_id == *creator_id {
                rooms.push(shard.room.clone());
            }
        }
        rooms.sort_by(|a, b| {
            a.created_at
                .value()
                .cmp(&b.created_at.value())
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        rooms
    }

    async fn close_room(
        &self,
        room_id: &RoomId,
        closed_at: Timestamp,
    ) -> Result<Vec<ConnectionId>, RegistryError> {
        // connections → rooms → shard の順でロックを取得。インデックスの掃除が
        // 終わるまで connections を保持し、並行する leave / 再 JOIN と直列化する
        let mut connections = self.connections.lock().await;
        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.as_str().to_string()))?;
        let mut shard = shard.lock().await;

        shard.room.close();

        // 切断前に ROOM_CLOSED を全購読者へ通知する
        let event = Event::room_closed(room_id.clone(), shard.room.creator_id.clone(), closed_at);
        shard.fan_out(&event);

        let disconnected: Vec<ConnectionId> = shard.participants.keys().cloned().collect();
        for (connection_id, channel) in shard.subscribers.drain() {
            if channel.send(Outbound::Close).is_err() {
                tracing::debug!("Connection '{}' already gone on close", connection_id);
            }
        }
        shard.participants.clear();

        // 逆引きインデックスはこのルームを指すエントリのみ削除する
        // （既に退出して別ルームを指しているエントリを消してはいけない）
        for connection_id in &disconnected {
            if connections.get(connection_id) == Some(room_id) {
                connections.remove(connection_id);
            }
        }

        Ok(disconnected)
    }

    async fn join(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        identity: Identity,
        channel: SubscriberChannel,
        joined_at: Timestamp,
    ) -> Result<Event, MembershipError> {
        // connections → rooms → shard の順でロックを取得
        let mut connections = self.connections.lock().await;
        if connections.contains_key(&connection_id) {
            return Err(MembershipError::DuplicateJoin(
                connection_id.as_str().to_string(),
            ));
        }

        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| MembershipError::RoomNotFound(room_id.as_str().to_string()))?;
        let mut shard = shard.lock().await;
        if !shard.room.is_active() {
            return Err(MembershipError::RoomNotFound(room_id.as_str().to_string()));
        }

        let participant = Participant::new(connection_id.clone(), identity.clone(), joined_at);
        shard.participants.insert(connection_id.clone(), participant);
        shard.subscribers.insert(connection_id.clone(), channel);
        connections.insert(connection_id, room_id.clone());

        let event = Event::join(room_id.clone(), identity, joined_at);
        shard.fan_out(&event);
        Ok(event)
    }

    async fn set_status(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        side: DebateSide,
        timestamp: Timestamp,
    ) -> Result<Event, MembershipError> {
        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| MembershipError::RoomNotFound(room_id.as_str().to_string()))?;
        let mut shard = shard.lock().await;

        let participant = shard
            .participants
            .get_mut(connection_id)
            .ok_or_else(|| MembershipError::NotJoined(connection_id.as_str().to_string()))?;
        participant.select_status(side);
        let sender = participant.identity.clone();

        let event = Event::status(room_id.clone(), sender, side, timestamp);
        shard.fan_out(&event);
        Ok(event)
    }

    async fn leave(&self, connection_id: &ConnectionId, timestamp: Timestamp) -> Option<Event> {
        let room_id = {
            let mut connections = self.connections.lock().await;
            connections.remove(connection_id)?
        };

        let shard = self.shard(&room_id).await?;
        let mut shard = shard.lock().await;

        // ルームクローズと競合した場合は participants が既に空（冪等）
        let participant = shard.participants.remove(connection_id)?;
        shard.subscribers.remove(connection_id);

        let event = Event::leave(room_id, participant.identity, timestamp);
        // 本人削除後の fan_out なので、LEAVE は残りの購読者にのみ届く
        shard.fan_out(&event);
        Some(event)
    }

    async fn is_eligible_to_chat(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let Some(shard) = self.shard(room_id).await else {
            return false;
        };
        let shard = shard.lock().await;
        shard
            .participants
            .get(connection_id)
            .is_some_and(|p| p.is_eligible_to_chat())
    }

    async fn get_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, RegistryError> {
        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.as_str().to_string()))?;
        let shard = shard.lock().await;
        let mut participants: Vec<Participant> = shard.participants.values().cloned().collect();
        participants.sort_by(|a, b| a.identity.as_str().cmp(b.identity.as_str()));
        Ok(participants)
    }
}

#[async_trait]
impl MessageRouter for InMemoryRoomBroker {
    async fn broadcast(&self, room_id: &RoomId, event: &Event) -> Result<(), RouteError> {
        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| RouteError::RoomNotFound(room_id.as_str().to_string()))?;
        let shard = shard.lock().await;
        shard.fan_out(event);
        Ok(())
    }

    async fn publish_chat(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<Event, RouteError> {
        let shard = self
            .shard(room_id)
            .await
            .ok_or_else(|| RouteError::RoomNotFound(room_id.as_str().to_string()))?;
        let shard = shard.lock().await;

        // sender はメンバーシップの記録から解決する（クライアント申告は信用しない）
        let participant = shard
            .participants
            .get(connection_id)
            .ok_or_else(|| RouteError::NotEligible(connection_id.as_str().to_string()))?;
        let side = participant
            .status
            .ok_or_else(|| RouteError::NotEligible(connection_id.as_str().to_string()))?;

        let event = Event::chat(
            room_id.clone(),
            participant.identity.clone(),
            side,
            content,
            timestamp,
        );
        shard.fan_out(&event);
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomBroker のルームライフサイクルとメンバーシップ操作
    // - イベントのファンアウト（配信先・配信順序・配信内容）
    // - エラーハンドリング（存在しないルーム、重複 JOIN、未参加、資格なし）
    //
    // 【なぜこのテストが必要か】
    // - Broker は UseCase から呼ばれる状態管理の中核
    // - 「配信順序 = 受理順序」「LEAVE は残りの購読者のみ」「sender は
    //   サーバー側で解決」という保証をここで担保する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. ルーム作成・取得・クローズ（冪等性を含む）
    // 2. JOIN の成功・重複・存在しないルーム
    // 3. STATUS 選択と上書き、未参加時のエラー
    // 4. CHAT の sender 解決と資格チェック
    // 5. LEAVE の配信先（本人を含まない）
    // 6. クローズ時の全購読者への Close 送出
    // ========================================

    fn test_identity(name: &str) -> Identity {
        Identity::new(name.to_string()).unwrap()
    }

    fn test_content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    async fn create_test_room(broker: &InMemoryRoomBroker) -> Room {
        broker
            .create_room(test_identity("t1"), Timestamp::new(1000))
            .await
    }

    /// 接続を 1 つ JOIN させ、受信側チャネルを返す
    async fn join_subscriber(
        broker: &InMemoryRoomBroker,
        room_id: &RoomId,
        name: &str,
    ) -> (ConnectionId, UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = crate::domain::ConnectionIdFactory::generate();
        broker
            .join(
                room_id,
                connection_id.clone(),
                test_identity(name),
                tx,
                Timestamp::new(1000),
            )
            .await
            .unwrap();
        (connection_id, rx)
    }

    /// 受信済みフレームを JSON として取り出す
    fn recv_frame(rx: &mut UnboundedReceiver<Outbound>) -> serde_json::Value {
        match rx.try_recv().unwrap() {
            Outbound::Frame(json) => serde_json::from_str(&json).unwrap(),
            Outbound::Close => panic!("expected a frame, got Close"),
        }
    }

    #[tokio::test]
    async fn test_create_room_returns_active_room() {
        // テスト項目: 作成されたルームは ACTIVE で、取得できる
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();

        // when (操作):
        let room = create_test_room(&broker).await;
        let fetched = broker.get_room(&room.id).await.unwrap();

        // then (期待する結果):
        assert!(fetched.is_active());
        assert_eq!(fetched.creator_id.as_str(), "t1");
    }

    #[tokio::test]
    async fn test_create_room_ids_are_unique() {
        // テスト項目: 作成されるルーム ID は一意
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();

        // when (操作):
        let room1 = create_test_room(&broker).await;
        let room2 = create_test_room(&broker).await;

        // then (期待する結果):
        assert_ne!(room1.id, room2.id);
    }

    #[tokio::test]
    async fn test_get_room_not_found() {
        // テスト項目: 存在しないルームの取得は RoomNotFound
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let unknown = RoomId::new("unknown".to_string()).unwrap();

        // when (操作):
        let result = broker.get_room(&unknown).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RegistryError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_join_broadcasts_to_all_including_joiner() {
        // テスト項目: JOIN イベントは参加者本人を含む全購読者に届く
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (_alice_conn, mut alice_rx) = join_subscriber(&broker, &room.id, "alice").await;

        // when (操作):
        let (_bob_conn, mut bob_rx) = join_subscriber(&broker, &room.id, "bob").await;

        // then (期待する結果): alice は自分と bob の JOIN、bob は自分の JOIN のみ受信
        let alice_join = recv_frame(&mut alice_rx);
        assert_eq!(alice_join["type"], "JOIN");
        assert_eq!(alice_join["sender"], "alice");
        let bob_join_seen_by_alice = recv_frame(&mut alice_rx);
        assert_eq!(bob_join_seen_by_alice["sender"], "bob");

        let bob_join = recv_frame(&mut bob_rx);
        assert_eq!(bob_join["sender"], "bob");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_unknown_room_fails() {
        // テスト項目: 存在しないルームへの JOIN は RoomNotFound
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let unknown = RoomId::new("unknown".to_string()).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = broker
            .join(
                &unknown,
                crate::domain::ConnectionIdFactory::generate(),
                test_identity("alice"),
                tx,
                Timestamp::new(1000),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_join_fails() {
        // テスト項目: 既に参加済みの接続による再 JOIN は DuplicateJoin
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room1 = create_test_room(&broker).await;
        let room2 = create_test_room(&broker).await;
        let (conn, _rx) = join_subscriber(&broker, &room1.id, "alice").await;

        // when (操作): 別のルームへの JOIN も拒否される
        let (tx, _rx2) = mpsc::unbounded_channel();
        let result = broker
            .join(&room2.id, conn, test_identity("alice"), tx, Timestamp::new(2000))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::DuplicateJoin(_))));
    }

    #[tokio::test]
    async fn test_set_status_broadcasts_and_allows_overwrite() {
        // テスト項目: STATUS 選択がブロードキャストされ、再選択で上書きされる
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (conn, mut rx) = join_subscriber(&broker, &room.id, "alice").await;
        let _ = rx.try_recv(); // 自分の JOIN を読み捨て

        // when (操作):
        broker
            .set_status(&room.id, &conn, DebateSide::Pro, Timestamp::new(2000))
            .await
            .unwrap();
        broker
            .set_status(&room.id, &conn, DebateSide::Con, Timestamp::new(3000))
            .await
            .unwrap();

        // then (期待する結果):
        let first = recv_frame(&mut rx);
        assert_eq!(first["type"], "STATUS");
        assert_eq!(first["status"], "PRO");
        let second = recv_frame(&mut rx);
        assert_eq!(second["status"], "CON");

        let participants = broker.get_participants(&room.id).await.unwrap();
        assert_eq!(participants[0].status, Some(DebateSide::Con));
    }

    #[tokio::test]
    async fn test_set_status_without_join_fails() {
        // テスト項目: 未参加の接続による STATUS 選択は NotJoined
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let stranger = crate::domain::ConnectionIdFactory::generate();

        // when (操作):
        let result = broker
            .set_status(&room.id, &stranger, DebateSide::Pro, Timestamp::new(2000))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::NotJoined(_))));
    }

    #[tokio::test]
    async fn test_publish_chat_resolves_sender_from_membership() {
        // テスト項目: CHAT の sender と status はメンバーシップ記録から解決される
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (conn, mut rx) = join_subscriber(&broker, &room.id, "alice").await;
        broker
            .set_status(&room.id, &conn, DebateSide::Pro, Timestamp::new(2000))
            .await
            .unwrap();
        let _ = rx.try_recv(); // JOIN
        let _ = rx.try_recv(); // STATUS

        // when (操作):
        let event = broker
            .publish_chat(&room.id, &conn, test_content("hello"), Timestamp::new(3000))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(event.sender.as_str(), "alice");
        let chat = recv_frame(&mut rx);
        assert_eq!(chat["type"], "CHAT");
        assert_eq!(chat["sender"], "alice");
        assert_eq!(chat["status"], "PRO");
        assert_eq!(chat["content"], "hello");
    }

    #[tokio::test]
    async fn test_publish_chat_before_status_fails() {
        // テスト項目: PRO/CON 未選択の参加者による CHAT は NotEligible
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (conn, _rx) = join_subscriber(&broker, &room.id, "alice").await;

        // when (操作):
        let result = broker
            .publish_chat(&room.id, &conn, test_content("hello"), Timestamp::new(2000))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RouteError::NotEligible(_))));
        assert!(!broker.is_eligible_to_chat(&room.id, &conn).await);
    }

    #[tokio::test]
    async fn test_publish_chat_without_join_fails() {
        // テスト項目: 未参加の接続による CHAT は NotEligible
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let stranger = crate::domain::ConnectionIdFactory::generate();

        // when (操作):
        let result = broker
            .publish_chat(&room.id, &stranger, test_content("hi"), Timestamp::new(2000))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RouteError::NotEligible(_))));
    }

    #[tokio::test]
    async fn test_broadcast_order_matches_acceptance_order() {
        // テスト項目: 1 ルーム内の配信順序は受理順序と一致する
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (alice, _alice_rx) = join_subscriber(&broker, &room.id, "alice").await;
        let (bob, mut bob_rx) = join_subscriber(&broker, &room.id, "bob").await;
        broker
            .set_status(&room.id, &alice, DebateSide::Pro, Timestamp::new(2000))
            .await
            .unwrap();
        broker
            .set_status(&room.id, &bob, DebateSide::Con, Timestamp::new(2000))
            .await
            .unwrap();
        let _ = bob_rx.try_recv(); // JOIN (bob)
        let _ = bob_rx.try_recv(); // STATUS (alice)
        let _ = bob_rx.try_recv(); // STATUS (bob)

        // when (操作): 交互に 4 通のチャットを受理させる
        for (conn, text) in [(&alice, "a1"), (&bob, "b1"), (&alice, "a2"), (&bob, "b2")] {
            broker
                .publish_chat(&room.id, conn, test_content(text), Timestamp::new(3000))
                .await
                .unwrap();
        }

        // then (期待する結果): bob は受理順で受信する
        let order: Vec<String> = (0..4)
            .map(|_| recv_frame(&mut bob_rx)["content"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["a1", "b1", "a2", "b2"]);
    }

    #[tokio::test]
    async fn test_broadcast_delivers_prebuilt_event() {
        // テスト項目: broadcast が任意のイベントを全購読者に配信する
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (_alice, mut alice_rx) = join_subscriber(&broker, &room.id, "alice").await;
        let _ = alice_rx.try_recv(); // JOIN

        // when (操作):
        let event = Event::status(
            room.id.clone(),
            test_identity("t1"),
            DebateSide::Con,
            Timestamp::new(5000),
        );
        broker.broadcast(&room.id, &event).await.unwrap();

        // then (期待する結果):
        let frame = recv_frame(&mut alice_rx);
        assert_eq!(frame["type"], "STATUS");
        assert_eq!(frame["sender"], "t1");
    }

    #[tokio::test]
    async fn test_broadcast_unknown_room_fails() {
        // テスト項目: 存在しないルームへの broadcast は RoomNotFound
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let unknown = RoomId::new("unknown".to_string()).unwrap();
        let event = Event::join(unknown.clone(), test_identity("alice"), Timestamp::new(1000));

        // when (操作):
        let result = broker.broadcast(&unknown, &event).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RouteError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_only() {
        // テスト項目: LEAVE イベントは残りの購読者にのみ届く
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (alice, mut alice_rx) = join_subscriber(&broker, &room.id, "alice").await;
        let (_bob, mut bob_rx) = join_subscriber(&broker, &room.id, "bob").await;

        // when (操作):
        let event = broker.leave(&alice, Timestamp::new(2000)).await;

        // then (期待する結果):
        assert!(event.is_some());
        let _ = bob_rx.try_recv(); // JOIN (bob)
        let leave = recv_frame(&mut bob_rx);
        assert_eq!(leave["type"], "LEAVE");
        assert_eq!(leave["sender"], "alice");

        let _ = alice_rx.try_recv(); // JOIN (alice)
        let _ = alice_rx.try_recv(); // JOIN (bob)
        assert!(alice_rx.try_recv().is_err()); // alice 自身には LEAVE は届かない
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        // テスト項目: 参加していない接続の leave は None（冪等）
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (alice, _rx) = join_subscriber(&broker, &room.id, "alice").await;
        broker.leave(&alice, Timestamp::new(2000)).await;

        // when (操作):
        let second = broker.leave(&alice, Timestamp::new(3000)).await;

        // then (期待する結果):
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_close_room_notifies_then_disconnects_all_participants() {
        // テスト項目: ルームクローズで ROOM_CLOSED 通知の後に Close が送出される
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (_alice, mut alice_rx) = join_subscriber(&broker, &room.id, "alice").await;
        let (_bob, mut bob_rx) = join_subscriber(&broker, &room.id, "bob").await;

        // when (操作):
        let disconnected = broker.close_room(&room.id, Timestamp::new(5000)).await.unwrap();

        // then (期待する結果):
        assert_eq!(disconnected.len(), 2);
        let _ = alice_rx.try_recv(); // JOIN (alice)
        let _ = alice_rx.try_recv(); // JOIN (bob)
        let closed = recv_frame(&mut alice_rx);
        assert_eq!(closed["type"], "ROOM_CLOSED");
        assert_eq!(closed["sender"], "t1");
        assert_eq!(alice_rx.try_recv().unwrap(), Outbound::Close);
        let _ = bob_rx.try_recv(); // JOIN (bob)
        let _ = bob_rx.try_recv(); // ROOM_CLOSED
        assert_eq!(bob_rx.try_recv().unwrap(), Outbound::Close);

        let fetched = broker.get_room(&room.id).await.unwrap();
        assert!(!fetched.is_active());
    }

    #[tokio::test]
    async fn test_join_closed_room_fails() {
        // テスト項目: クローズ済みルームへの JOIN は RoomNotFound
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        broker.close_room(&room.id, Timestamp::new(1500)).await.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = broker
            .join(
                &room.id,
                crate::domain::ConnectionIdFactory::generate(),
                test_identity("alice"),
                tx,
                Timestamp::new(2000),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_close_room_allows_rejoin_elsewhere() {
        // テスト項目: クローズで切断された接続は別ルームに再 JOIN できる
        // given (前提条件): クローズが逆引きインデックスも掃除すること
        let broker = InMemoryRoomBroker::new();
        let room1 = create_test_room(&broker).await;
        let room2 = create_test_room(&broker).await;
        let (alice, _rx) = join_subscriber(&broker, &room1.id, "alice").await;
        broker.close_room(&room1.id, Timestamp::new(1500)).await.unwrap();

        // when (操作):
        let (tx, _rx2) = mpsc::unbounded_channel();
        let result = broker
            .join(&room2.id, alice, test_identity("alice"), tx, Timestamp::new(2000))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_close_room_keeps_index_entry_for_other_room() {
        // テスト項目: クローズ時のインデックス掃除は別ルームを指すエントリを消さない
        // given (前提条件): shard 上にはまだ残っているが、退出 → 別ルームへの
        // 再 JOIN が先行したため、インデックスが既に別ルームを指している接続
        let broker = InMemoryRoomBroker::new();
        let room1 = create_test_room(&broker).await;
        let room2 = create_test_room(&broker).await;
        let (alice, _rx1) = join_subscriber(&broker, &room1.id, "alice").await;
        {
            let mut connections = broker.connections.lock().await;
            connections.insert(alice.clone(), room2.id.clone());
        }
        {
            let shard = broker.shard(&room2.id).await.unwrap();
            let mut shard = shard.lock().await;
            let (tx, _rx2) = mpsc::unbounded_channel();
            shard.participants.insert(
                alice.clone(),
                Participant::new(alice.clone(), test_identity("alice"), Timestamp::new(2000)),
            );
            shard.subscribers.insert(alice.clone(), tx);
        }

        // when (操作):
        broker.close_room(&room1.id, Timestamp::new(3000)).await.unwrap();

        // then (期待する結果): room2 への参加は維持され、三重参加もできない
        let room3 = create_test_room(&broker).await;
        let (tx3, _rx3) = mpsc::unbounded_channel();
        let result = broker
            .join(
                &room3.id,
                alice.clone(),
                test_identity("alice"),
                tx3,
                Timestamp::new(4000),
            )
            .await;
        assert!(matches!(result, Err(MembershipError::DuplicateJoin(_))));

        let event = broker.leave(&alice, Timestamp::new(5000)).await.unwrap();
        assert_eq!(event.room_id, room2.id);
    }

    #[tokio::test]
    async fn test_get_rooms_by_creator_filters_and_sorts() {
        // テスト項目: 作成者のルームのみが作成時刻順で返る
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room1 = broker
            .create_room(test_identity("t1"), Timestamp::new(1000))
            .await;
        let room2 = broker
            .create_room(test_identity("t2"), Timestamp::new(2000))
            .await;
        let room3 = broker
            .create_room(test_identity("t1"), Timestamp::new(3000))
            .await;

        // when (操作):
        let rooms = broker.get_rooms_by_creator(&test_identity("t1")).await;

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![room1.id.as_str(), room3.id.as_str()]);
        assert!(!ids.contains(&room2.id.as_str()));
    }

    #[tokio::test]
    async fn test_get_participants_sorted_by_identity() {
        // テスト項目: 参加者リストは identity でソートされる
        // given (前提条件):
        let broker = InMemoryRoomBroker::new();
        let room = create_test_room(&broker).await;
        let (_carol, _rx1) = join_subscriber(&broker, &room.id, "carol").await;
        let (_alice, _rx2) = join_subscriber(&broker, &room.id, "alice").await;
        let (_bob, _rx3) = join_subscriber(&broker, &room.id, "bob").await;

        // when (操作):
        let participants = broker.get_participants(&room.id).await.unwrap();

        // then (期待する結果):
        let names: Vec<&str> = participants.iter().map(|p| p.identity.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
