//! WebSocket endpoint for the push channel.
//!
//! One connection can join any number of session topics. Client frames are
//! `join`/`leave`/`ping`; the server forwards topic events as they are
//! published and answers pings with the current server time. The ping is
//! purely a liveness check.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::AppState;

/// Frames a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", rename_all_fields = "camelCase")]
enum ClientFrame {
    Join { session_id: String },
    Leave { session_id: String },
    Ping,
}

/// Frames the server sends outside of topic events.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "lowercase")]
enum ServerFrame {
    /// Liveness reply, payload is the server clock in epoch ms.
    Pong(i64),
}

/// GET /api/ws - Upgrade to the push channel.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    debug!("push channel connection opened");
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Forwarder tasks and the ping handler share one outbound lane so
    // frames never interleave mid-write.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(64);
    let send_task = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                debug!("push channel send failed, client disconnected");
                break;
            }
        }
    });

    let mut joined: HashMap<String, tokio::task::JoinHandle<()>> = HashMap::new();

    while let Some(result) = ws_rx.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(error) => {
                warn!(%error, "push channel receive error");
                break;
            }
        };

        let frame: ClientFrame = match serde_json::from_str(&text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, "ignoring malformed push channel frame");
                continue;
            }
        };

        match frame {
            ClientFrame::Join { session_id } => {
                if joined.contains_key(&session_id) {
                    continue;
                }
                debug!(%session_id, "joining topic");
                let receiver = state.push.subscribe(&session_id);
                let forward_tx = outbound_tx.clone();
                let handle = tokio::spawn(async move {
                    let mut events = BroadcastStream::new(receiver)
                        .filter_map(|result| futures::future::ready(result.ok()));
                    while let Some(event) = events.next().await {
                        let json = serde_json::to_string(&event)
                            .unwrap_or_else(|_| "{}".to_string());
                        if forward_tx.send(json).await.is_err() {
                            break;
                        }
                    }
                });
                joined.insert(session_id, handle);
            }
            ClientFrame::Leave { session_id } => {
                if let Some(handle) = joined.remove(&session_id) {
                    debug!(%session_id, "leaving topic");
                    handle.abort();
                    // Wait for the forwarder to actually drop its
                    // receiver; pruning earlier would see it as live.
                    let _ = handle.await;
                    state.push.prune(&session_id);
                }
            }
            ClientFrame::Ping => {
                let pong = ServerFrame::Pong(Utc::now().timestamp_millis());
                let json = serde_json::to_string(&pong).unwrap_or_else(|_| "{}".to_string());
                if outbound_tx.send(json).await.is_err() {
                    break;
                }
            }
        }
    }

    for (session_id, handle) in joined {
        handle.abort();
        let _ = handle.await;
        state.push.prune(&session_id);
    }
    drop(outbound_tx);
    let _ = send_task.await;
    debug!("push channel connection closed");
}
