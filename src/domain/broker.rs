//! Broker trait 定義
//!
//! ドメイン層が必要とするルーム管理・メッセージ配信のインターフェースを
//! 定義します。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::{Event, Participant, Room},
    error::{MembershipError, RegistryError, RouteError},
    value_object::{ConnectionId, DebateSide, Identity, MessageContent, RoomId, Timestamp},
};

/// Frame pushed to one subscriber connection.
///
/// `Frame` carries an already serialized JSON payload; `Close` instructs the
/// gateway's send pump to close the WebSocket (used when a room is closed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Frame(String),
    Close,
}

/// Per-connection push channel registered on join.
pub type SubscriberChannel = mpsc::UnboundedSender<Outbound>;

/// Room Registry + Membership Tracker trait
///
/// ルームのライフサイクル（作成・参照・クローズ）と、ルームごとの参加者集合
/// （JOIN / STATUS / LEAVE）を管理するインターフェース。
///
/// ## 順序保証
///
/// メンバーシップを変更する操作（`join` / `set_status` / `leave`）は、
/// ルームごとの直列化ポイント（実装ではルーム単位のロック）の内側で
/// 参加者集合の更新と結果イベントのブロードキャストを両方行ってから
/// 返ります。これにより、1 つのルーム内でのイベント配信順序は受理順序と
/// 一致します（ルームをまたぐ順序保証はありません）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// ルームを作成（ACTIVE 状態、サーバー発行の推測困難な ID）
    async fn create_room(&self, creator_id: Identity, created_at: Timestamp) -> Room;

    /// ルームを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RegistryError>;

    /// 指定した作成者のルーム一覧を取得（作成時刻順）
    async fn get_rooms_by_creator(&self, creator_id: &Identity) -> Vec<Room>;

    /// ルームをクローズし、全参加者を切断する（冪等）
    ///
    /// 切断前に ROOM_CLOSED イベントを全購読者に配信し、切断された接続の
    /// ID リストを返す。
    async fn close_room(
        &self,
        room_id: &RoomId,
        closed_at: Timestamp,
    ) -> Result<Vec<ConnectionId>, RegistryError>;

    /// 参加者を追加し、JOIN イベントを全購読者（本人含む）に配信する
    ///
    /// ルームが存在しない・クローズ済みの場合は `RoomNotFound`、
    /// 接続が既にいずれかのルームに参加済みの場合は `DuplicateJoin`。
    async fn join(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        identity: Identity,
        channel: SubscriberChannel,
        joined_at: Timestamp,
    ) -> Result<Event, MembershipError>;

    /// PRO/CON を選択（再選択は上書き）し、STATUS イベントを配信する
    async fn set_status(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        side: DebateSide,
        timestamp: Timestamp,
    ) -> Result<Event, MembershipError>;

    /// 参加者を削除し、残りの購読者に LEAVE イベントを配信する
    ///
    /// 接続がどのルームにも参加していない場合は `None`（冪等）。
    async fn leave(&self, connection_id: &ConnectionId, timestamp: Timestamp) -> Option<Event>;

    /// 参加者が存在し、かつ PRO/CON を選択済みかどうか
    async fn is_eligible_to_chat(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool;

    /// ルームの参加者リストを取得（identity でソート済み）
    async fn get_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, RegistryError>;
}

/// Message Router trait
///
/// ルームのトピックへのイベント配信を抽象化するインターフェース。
/// 配信はルーム単位の受理順序を保持し、接続ごとに at-most-once、
/// リプレイなし（後から購読した接続は過去のイベントを受け取らない）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRouter: Send + Sync {
    /// イベントをルームの全購読者に配信する
    async fn broadcast(&self, room_id: &RoomId, event: &Event) -> Result<(), RouteError>;

    /// CHAT イベントを構築して配信する
    ///
    /// 送信者の identity と PRO/CON は Membership Tracker の記録から解決する
    /// （クライアントが申告した sender は決して信用しない）。参加者が存在
    /// しない、または PRO/CON 未選択の場合は `NotEligible`。
    async fn publish_chat(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<Event, RouteError>;
}
