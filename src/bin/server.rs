//! Room-scoped debate chat broker.
//!
//! Teachers create rooms over REST; students join over WebSocket, pick a
//! PRO/CON side and debate. Every surface requires a bearer token.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use touron::{
    common::logger::setup_logger,
    infrastructure::{auth::PrefixTokenVerifier, broker::InMemoryRoomBroker},
    ui::Server,
    usecase::{
        CloseRoomUseCase, CreateRoomUseCase, GetRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        ListRoomsUseCase, PublishChatUseCase, SelectStatusUseCase,
    },
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Room-scoped debate chat broker", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8081")]
    port: u16,

    /// Seconds a connection may stay idle before it is disconnected
    #[arg(long, default_value = "300")]
    idle_timeout_secs: u64,

    /// Accepted bearer tokens are "<prefix><identity>" (development verifier)
    #[arg(long, default_value = "dev-")]
    auth_prefix: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Broker
    // 2. TokenVerifier
    // 3. UseCases
    // 4. Server

    // 1. Create Broker (in-memory registry + router)
    let broker = Arc::new(InMemoryRoomBroker::new());

    // 2. Create TokenVerifier (development prefix scheme)
    let token_verifier = Arc::new(PrefixTokenVerifier::new(args.auth_prefix));

    // 3. Create UseCases
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(broker.clone()));
    let close_room_usecase = Arc::new(CloseRoomUseCase::new(broker.clone()));
    let get_room_usecase = Arc::new(GetRoomUseCase::new(broker.clone()));
    let list_rooms_usecase = Arc::new(ListRoomsUseCase::new(broker.clone()));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(broker.clone()));
    let select_status_usecase = Arc::new(SelectStatusUseCase::new(broker.clone()));
    let publish_chat_usecase = Arc::new(PublishChatUseCase::new(broker.clone()));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(broker.clone()));

    // 4. Create and run the server
    let server = Server::new(
        create_room_usecase,
        close_room_usecase,
        get_room_usecase,
        list_rooms_usecase,
        join_room_usecase,
        select_status_usecase,
        publish_chat_usecase,
        leave_room_usecase,
        token_verifier,
        Duration::from_secs(args.idle_timeout_secs),
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
