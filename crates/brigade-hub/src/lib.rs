// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side broadcast hub for the Brigade sync core.
//!
//! Holds the registry of active WebSocket connections and fans out typed
//! event envelopes published by the persistence layer after each successful
//! mutating write. Each connection drains its own bounded outbound queue;
//! slow clients lag individually and are told to re-sync on their next
//! heartbeat instead of blocking the fan-out path.

pub mod hub;
pub mod queue;
pub mod server;
pub mod ws;

pub use hub::{BroadcastHub, ConnectionId, HubConnection};
pub use server::{HubState, ServerConfig, build_router, start_server};
