// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hub HTTP server built on axum.
//!
//! Sets up the WebSocket route, health endpoint, and shared state.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use brigade_core::{BrigadeError, Event};

use crate::hub::BroadcastHub;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct HubState {
    /// The broadcast hub singleton.
    pub hub: Arc<BroadcastHub>,
}

/// Hub server configuration (mirrors HubConfig from brigade-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Health check response body.
async fn get_health(State(state): State<HubState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.hub.connection_count(),
    }))
}

/// Mutation-notification ingress for the persistence layer.
///
/// Called after each successful mutating write with the event envelope to
/// fan out. Heartbeat frames are connection-scoped and not publishable.
async fn post_publish(
    State(state): State<HubState>,
    Json(event): Json<Event>,
) -> StatusCode {
    match event {
        Event::Ping | Event::Pong | Event::Connect { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        event => {
            state.hub.publish(&event);
            StatusCode::NO_CONTENT
        }
    }
}

/// Build the hub router: `GET /ws` (upgrade), `GET /health`, and the
/// internal `POST /publish` ingress.
pub fn build_router(state: HubState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(get_health))
        .route("/publish", post(post_publish))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Start the hub WebSocket server.
///
/// Binds to the configured host:port and serves until `shutdown` fires,
/// then stops accepting and drains in-flight requests.
pub async fn start_server(
    config: &ServerConfig,
    state: HubState,
    shutdown: CancellationToken,
) -> Result<(), BrigadeError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BrigadeError::Channel {
            message: format!("failed to bind hub to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("hub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| BrigadeError::Channel {
            message: format!("hub server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
