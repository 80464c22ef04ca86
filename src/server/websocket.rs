//! Chat WebSocket upgrade and connection handling
//!
//! Authentication flow (before any presence state is created):
//! 1. Claimed identity from the `user_id` query parameter
//! 2. JWT token from the query string (?token=...) or Authorization header
//! 3. The token's subject must equal the claimed identity
//!
//! A failed check rejects the upgrade with 401; there is no retry inside
//! the gateway. After the upgrade the connection is registered with the
//! coordinator and runs a select loop between its outbound channel and
//! incoming frames until either side closes.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{extract_token_from_header, extract_token_from_query};
use crate::chat::{ChatCoordinator, ClientMessage, ServerMessage};
use crate::routes::{error_response, parse_query_params};
use crate::server::http::AppState;

/// WebSocket type after upgrade
type HyperWebSocket =
    hyper_tungstenite::WebSocketStream<hyper_util::rt::TokioIo<hyper::upgrade::Upgraded>>;

/// Handle WebSocket upgrade for a chat connection
pub async fn handle_chat_upgrade(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    if !hyper_tungstenite::is_upgrade_request(&req) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "WebSocket upgrade required",
            "upgrade_required",
        );
    }

    let params = parse_query_params(req.uri().query().unwrap_or(""));
    let Some(user_id) = params.get("user_id").filter(|u| !u.is_empty()).cloned() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "user_id query parameter required",
            "missing_user_id",
        );
    };

    // Token from query string or Authorization header
    let token = extract_token_from_query(req.uri().query()).or_else(|| {
        let auth_header = req
            .headers()
            .get(hyper::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        extract_token_from_header(auth_header).map(|t| t.to_string())
    });

    let Some(token) = token else {
        warn!(user = %user_id, "chat: connection without credentials rejected");
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
            "missing_token",
        );
    };

    // The token's embedded identity must match the claimed identifier
    let result = state.jwt.verify_token(&token);
    let subject = result.claims.map(|c| c.sub);
    if !result.valid || subject.as_deref() != Some(user_id.as_str()) {
        warn!(user = %user_id, "chat: token subject mismatch or invalid token");
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
            "invalid_token",
        );
    }

    if let Some(max) = state.args.chat_max_clients {
        if state.chat.connection_count() >= max {
            warn!("chat: at capacity, rejecting {}", user_id);
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Server at capacity",
                "at_capacity",
            );
        }
    }

    let (response, websocket) = match hyper_tungstenite::upgrade(req, None) {
        Ok(upgrade) => upgrade,
        Err(e) => {
            warn!("chat: WebSocket upgrade failed for {}: {}", user_id, e);
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("WebSocket upgrade failed: {e}"),
                "upgrade_failed",
            );
        }
    };

    let chat = Arc::clone(&state.chat);
    tokio::spawn(async move {
        match websocket.await {
            Ok(ws) => {
                handle_chat_connection(chat, ws, user_id).await;
            }
            Err(e) => {
                warn!("chat: WebSocket connection failed: {}", e);
            }
        }
    });

    response.map(|_| Full::new(Bytes::new()))
}

/// Handle an established chat WebSocket connection
async fn handle_chat_connection(chat: Arc<ChatCoordinator>, ws: HyperWebSocket, user_id: String) {
    let (mut sink, mut stream) = ws.split();
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel();

    info!(user = %user_id, connection = %connection_id, "chat: connection established");
    chat.connect(&user_id, connection_id, tx.clone());

    loop {
        tokio::select! {
            // Outbound traffic routed through the coordinator
            outbound = rx.recv() => {
                let Some(msg) = outbound else { break };
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("chat: failed to encode outbound message: {}", e);
                        continue;
                    }
                };
                if sink.send(WsMessage::Text(json)).await.is_err() {
                    break;
                }
            }

            // Inbound frames from the client
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_client_text(&chat, &user_id, &text, &tx);
                    }
                    Some(Ok(WsMessage::Close(_))) => break,
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = sink.send(WsMessage::Pong(data)).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(user = %user_id, "chat: read error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    chat.disconnect(&user_id, connection_id);
    let _ = sink.close().await;
    info!(user = %user_id, connection = %connection_id, "chat: connection closed");
}

/// Dispatch one parsed client frame
///
/// Rejections go back to this connection only, never to other clients.
fn handle_client_text(
    chat: &ChatCoordinator,
    user_id: &str,
    text: &str,
    reply: &mpsc::UnboundedSender<ServerMessage>,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            let _ = reply.send(ServerMessage::Error {
                message: format!("Unrecognized message: {e}"),
            });
            return;
        }
    };

    match message {
        ClientMessage::PrivateMessage { to, content } => {
            if let Err(e) = chat.send_private(user_id, &to, &content) {
                let _ = reply.send(ServerMessage::Error {
                    message: e.to_string(),
                });
            }
        }
        ClientMessage::Typing { to } => chat.signal_typing(user_id, &to),
        ClientMessage::StopTyping { to } => chat.stop_typing(user_id, &to),
        ClientMessage::Ping => {
            let _ = reply.send(ServerMessage::Pong);
        }
    }
}
