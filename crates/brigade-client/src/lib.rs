// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client side of the Brigade sync core.
//!
//! Three cooperating pieces:
//!
//! - [`ConnectionManager`] owns the WebSocket: heartbeat pings, reconnects
//!   with capped exponential backoff, an observable state machine.
//! - [`ReconciliationEngine`] turns events into cache updates: snapshot
//!   events replace directly, signal events trigger a debounced re-fetch
//!   from the authoritative store, reconnects re-fetch everything.
//! - [`OptimisticPipeline`] makes creates visible locally before the store
//!   confirms them, and rolls back on rejection.
//!
//! [`SyncClient`] wires the three together over one [`LocalCache`].

pub mod backoff;
pub mod cache;
pub mod connection;
pub mod optimistic;
pub mod reconcile;
pub mod sync;

pub use backoff::BackoffPolicy;
pub use cache::{CacheSnapshot, CollectionRows, LocalCache};
pub use connection::{ConnectionHandles, ConnectionManager, ConnectionSignal, ConnectionState};
pub use optimistic::OptimisticPipeline;
pub use reconcile::ReconciliationEngine;
pub use sync::SyncClient;
