// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for the hub's fan-out endpoint.
//!
//! Client -> Server (JSON): `{"type": "ping"}` heartbeats.
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "connect", "data": {"message": "..."}}
//! {"type": "pong"}
//! {"type": "order_updated", "data": {...}}
//! {"type": "resync"}
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use brigade_core::{BrigadeError, Event};

use crate::server::HubState;

/// WebSocket upgrade handler.
///
/// Upgrades the HTTP connection to WebSocket and spawns a handler task.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<HubState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// Registers the connection with the hub, then runs two halves:
/// 1. Sender task: drains the connection's outbound queue to the socket
/// 2. Receiver loop: decodes client envelopes (heartbeats) and answers them
async fn handle_socket(socket: WebSocket, state: HubState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let conn = state.hub.register();
    let conn_id = conn.id;
    tracing::info!(connection = %conn_id, "client connected");

    conn.enqueue(&Event::Connect {
        message: "brigade hub connected".to_string(),
    });

    // Drain the outbound queue to the socket until the queue closes or the
    // socket errors.
    let sender_conn = conn.clone();
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = sender_conn.next_frame().await {
            if ws_sender
                .send(Message::Text(frame.to_string().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Read envelopes from the client.
    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => match Event::decode(&text) {
                Ok(Event::Ping) => {
                    conn.enqueue(&Event::Pong);
                    // Heartbeat is the re-sync point for a lagged connection.
                    if conn.take_lagged() {
                        tracing::info!(connection = %conn_id, "lagged connection told to re-sync");
                        conn.enqueue(&Event::Resync);
                    }
                }
                Ok(Event::Pong) => {
                    tracing::debug!(connection = %conn_id, "pong received");
                }
                Ok(other) => {
                    // Writes flow through the REST surface, never the socket.
                    tracing::debug!(connection = %conn_id, event = ?other, "ignoring non-heartbeat client event");
                }
                Err(BrigadeError::Protocol { detail }) => {
                    // Drop the single envelope; the connection stays up.
                    tracing::warn!(connection = %conn_id, %detail, "protocol error, envelope dropped");
                }
                Err(e) => {
                    tracing::warn!(connection = %conn_id, error = %e, "unexpected decode failure");
                }
            },
            Message::Close(_) => break,
            _ => {} // Ignore binary and transport-level ping/pong frames
        }
    }

    // Cleanup.
    state.hub.unregister(conn_id);
    sender_task.abort();
    tracing::info!(connection = %conn_id, "client disconnected");
}
