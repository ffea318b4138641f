//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::infrastructure::auth::TokenVerifier;
use crate::usecase::{
    CloseRoomUseCase, CreateRoomUseCase, GetRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    ListRoomsUseCase, PublishChatUseCase, SelectStatusUseCase,
};

use super::{
    handler::{
        create_room, delete_room, get_room_detail, health_check, list_rooms, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Debate chat broker server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     create_room_usecase,
///     close_room_usecase,
///     get_room_usecase,
///     list_rooms_usecase,
///     join_room_usecase,
///     select_status_usecase,
///     publish_chat_usecase,
///     leave_room_usecase,
///     token_verifier,
///     Duration::from_secs(300),
/// );
/// server.run("127.0.0.1".to_string(), 8081).await?;
/// ```
pub struct Server {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    create_room_usecase: Arc<CreateRoomUseCase>,
    /// CloseRoomUseCase（ルームクローズのユースケース）
    close_room_usecase: Arc<CloseRoomUseCase>,
    /// GetRoomUseCase（ルーム詳細取得のユースケース）
    get_room_usecase: Arc<GetRoomUseCase>,
    /// ListRoomsUseCase（ルーム一覧取得のユースケース）
    list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// SelectStatusUseCase（PRO/CON 選択のユースケース）
    select_status_usecase: Arc<SelectStatusUseCase>,
    /// PublishChatUseCase（チャット配信のユースケース）
    publish_chat_usecase: Arc<PublishChatUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// TokenVerifier（Bearer トークン検証の抽象化）
    token_verifier: Arc<dyn TokenVerifier>,
    /// アイドル接続を切断するまでの時間
    idle_timeout: Duration,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        create_room_usecase: Arc<CreateRoomUseCase>,
        close_room_usecase: Arc<CloseRoomUseCase>,
        get_room_usecase: Arc<GetRoomUseCase>,
        list_rooms_usecase: Arc<ListRoomsUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        select_status_usecase: Arc<SelectStatusUseCase>,
        publish_chat_usecase: Arc<PublishChatUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        token_verifier: Arc<dyn TokenVerifier>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            create_room_usecase,
            close_room_usecase,
            get_room_usecase,
            list_rooms_usecase,
            join_room_usecase,
            select_status_usecase,
            publish_chat_usecase,
            leave_room_usecase,
            token_verifier,
            idle_timeout,
        }
    }

    /// Build the axum router. Exposed so tests can serve it in-process.
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            create_room_usecase: self.create_room_usecase,
            close_room_usecase: self.close_room_usecase,
            get_room_usecase: self.get_room_usecase,
            list_rooms_usecase: self.list_rooms_usecase,
            join_room_usecase: self.join_room_usecase,
            select_status_usecase: self.select_status_usecase,
            publish_chat_usecase: self.publish_chat_usecase,
            leave_room_usecase: self.leave_room_usecase,
            token_verifier: self.token_verifier,
            idle_timeout: self.idle_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws-stomp", get(websocket_handler))
            // HTTP エンドポイント
            .route("/chat/room", post(create_room).get(list_rooms))
            .route(
                "/chat/room/{room_id}",
                get(get_room_detail).delete(delete_room),
            )
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the debate chat broker server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8081)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Debate chat broker listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws-stomp", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
