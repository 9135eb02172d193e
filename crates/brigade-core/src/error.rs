// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Brigade sync core.

use thiserror::Error;

use crate::types::EntityKind;

/// The primary error type used across the Brigade hub, client, and store crates.
#[derive(Debug, Error)]
pub enum BrigadeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel errors (WebSocket handshake failure, send failure, unexpected close).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persistence collaborator errors (REST call failed, bad response body).
    #[error("store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Protocol errors (malformed envelope, unknown event type). The offending
    /// envelope is dropped; the connection itself stays up.
    #[error("protocol error: {detail}")]
    Protocol { detail: String },

    /// An illegal status transition was requested. Carries the current and
    /// attempted status so the caller can surface both; no state change occurs
    /// and no event is published.
    #[error("invalid {entity} transition: {current} -> {attempted}")]
    InvalidTransition {
        entity: EntityKind,
        current: String,
        attempted: String,
    },

    /// The reconnect attempt cap was exceeded. Fatal: the connection manager
    /// stops retrying and the condition must be surfaced to the user.
    #[error("connection lost after {attempts} reconnect attempts")]
    ConnectionLost { attempts: u32 },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
