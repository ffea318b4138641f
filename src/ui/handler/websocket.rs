//! WebSocket session gateway.
//!
//! One WebSocket connection corresponds to one authenticated session. The
//! gateway verifies the bearer token before the upgrade, assigns a fresh
//! connection id, and then translates command frames into usecase calls.
//! Command errors are pushed back to the issuing connection only; they are
//! never broadcast.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionIdFactory, Identity, MembershipError, MessageContent, Outbound,
        RoomId, RouteError, SubscriberChannel,
    },
    infrastructure::{
        auth::bearer_token,
        dto::websocket::{ChatPayload, CommandFrame, ErrorMessage, StatusSelectPayload, error_code},
    },
    ui::state::AppState,
};

/// Verb part of a command destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Join,
    Status,
    Chat,
}

/// Parse a destination of the form `/app/room/{room_id}/{verb}`.
fn parse_destination(destination: &str) -> Option<(RoomId, CommandKind)> {
    let mut parts = destination.split('/');
    if parts.next() != Some("") {
        return None;
    }
    if parts.next() != Some("app") {
        return None;
    }
    if parts.next() != Some("room") {
        return None;
    }
    let room_id = parts.next()?;
    let verb = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let kind = match verb {
        "join" => CommandKind::Join,
        "status" => CommandKind::Status,
        "chat" => CommandKind::Chat,
        _ => return None,
    };
    let room_id = RoomId::new(room_id.to_string()).ok()?;
    Some((room_id, kind))
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    // Authenticate before the upgrade; unauthenticated sockets are never accepted
    let token = bearer_token(&headers).ok_or_else(|| {
        tracing::warn!("WebSocket connect without bearer token");
        StatusCode::UNAUTHORIZED
    })?;
    let identity = state.token_verifier.verify(token).map_err(|e| {
        tracing::warn!("WebSocket connect rejected: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    let connection_id = ConnectionIdFactory::generate();
    tracing::info!(
        "Connection '{}' authenticated as '{}'",
        connection_id,
        identity
    );
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id, identity)))
}

/// Spawns a task that receives outbound items from the rx channel and pushes
/// them to the WebSocket sender.
///
/// `Outbound::Close` forces the socket shut; the broker sends it when the
/// room a connection subscribes to is closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Frame(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    identity: Identity,
) {
    let (sender, mut receiver) = socket.split();

    // Channel carrying broadcast events and error frames for this connection
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    let idle_timeout = state.idle_timeout;
    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();
    let issuer = tx.clone();

    // Spawn a task to receive command frames from this client
    let mut recv_task = tokio::spawn(async move {
        loop {
            let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
                Ok(Some(Ok(msg))) => msg,
                Ok(Some(Err(e))) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::info!(
                        "Connection '{}' idle for {:?}, disconnecting",
                        recv_connection_id,
                        idle_timeout
                    );
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_command(
                        &recv_state,
                        &recv_connection_id,
                        &identity,
                        &issuer,
                        &text,
                    )
                    .await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Exactly one LEAVE per membership, no matter how the socket ended
    if state.leave_room_usecase.execute(&connection_id).await.is_none() {
        tracing::debug!(
            "Connection '{}' closed without an active membership",
            connection_id
        );
    }
}

/// Dispatch one command frame to the matching usecase.
async fn handle_command(
    state: &AppState,
    connection_id: &ConnectionId,
    identity: &Identity,
    issuer: &SubscriberChannel,
    text: &str,
) {
    let frame = match serde_json::from_str::<CommandFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Failed to parse command frame: {}", e);
            send_error(issuer, error_code::BAD_COMMAND, "Malformed command frame");
            return;
        }
    };

    let Some((room_id, kind)) = parse_destination(&frame.destination) else {
        send_error(
            issuer,
            error_code::BAD_COMMAND,
            format!("Unknown destination '{}'", frame.destination),
        );
        return;
    };

    match kind {
        CommandKind::Join => {
            let result = state
                .join_room_usecase
                .execute(&room_id, connection_id.clone(), identity.clone(), issuer.clone())
                .await;
            if let Err(e) = result {
                send_membership_error(issuer, &e);
            }
        }
        CommandKind::Status => {
            let payload = match serde_json::from_value::<StatusSelectPayload>(frame.payload) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Failed to parse status payload: {}", e);
                    send_error(
                        issuer,
                        error_code::BAD_COMMAND,
                        "status payload must carry \"PRO\" or \"CON\"",
                    );
                    return;
                }
            };
            let result = state
                .select_status_usecase
                .execute(&room_id, connection_id, payload.status.into())
                .await;
            if let Err(e) = result {
                send_membership_error(issuer, &e);
            }
        }
        CommandKind::Chat => {
            let payload = match serde_json::from_value::<ChatPayload>(frame.payload) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Failed to parse chat payload: {}", e);
                    send_error(issuer, error_code::BAD_COMMAND, "chat payload must carry content");
                    return;
                }
            };
            let content = match MessageContent::new(payload.content) {
                Ok(content) => content,
                Err(e) => {
                    send_error(issuer, error_code::BAD_COMMAND, e.to_string());
                    return;
                }
            };
            let result = state
                .publish_chat_usecase
                .execute(&room_id, connection_id, content)
                .await;
            match result {
                Ok(_) => {}
                Err(RouteError::RoomNotFound(_)) => {
                    send_error(
                        issuer,
                        error_code::ROOM_NOT_FOUND,
                        format!("Room '{}' not found", room_id),
                    );
                }
                Err(RouteError::NotEligible(_)) => {
                    send_error(issuer, error_code::NOT_ELIGIBLE, "Select PRO/CON first");
                }
            }
        }
    }
}

fn send_membership_error(issuer: &SubscriberChannel, err: &MembershipError) {
    let code = match err {
        MembershipError::RoomNotFound(_) => error_code::ROOM_NOT_FOUND,
        MembershipError::DuplicateJoin(_) => error_code::DUPLICATE_JOIN,
        MembershipError::NotJoined(_) => error_code::NOT_JOINED,
    };
    send_error(issuer, code, err.to_string());
}

/// Push an error frame to the issuing connection only.
fn send_error(issuer: &SubscriberChannel, code: &str, message: impl Into<String>) {
    let frame = ErrorMessage::new(code, message);
    let json = serde_json::to_string(&frame).unwrap();
    if issuer.send(Outbound::Frame(json)).is_err() {
        tracing::debug!("Connection gone before error frame could be pushed");
    }
}
