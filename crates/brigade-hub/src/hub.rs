// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The broadcast hub: registry of active connections and event fan-out.
//!
//! `publish` is called by the persistence layer immediately after a
//! successful mutating write. The envelope is serialized once and pushed to
//! every registered connection's own bounded queue; no lock is held across
//! a socket send, so one stalled client never delays the others.
//!
//! Delivery is at-least-once to connections open at publish time.
//! Disconnected clients discover the change via post-reconnect re-fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use brigade_core::Event;

use crate::queue::OutboundQueue;

/// Unique identifier for a registered connection.
pub type ConnectionId = Uuid;

/// Hub-side state for one client connection.
pub struct HubConnection {
    pub id: ConnectionId,
    queue: OutboundQueue,
    /// Set when the outbound queue overflowed and events were lost for this
    /// connection. Cleared when the hub tells the client to re-fetch.
    lagged: AtomicBool,
}

impl HubConnection {
    fn new(queue_capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: OutboundQueue::new(queue_capacity),
            lagged: AtomicBool::new(false),
        }
    }

    /// Enqueue an event for this connection only.
    pub fn enqueue(&self, event: &Event) {
        if self.queue.push(event.encode().into()) {
            self.lagged.store(true, Ordering::Release);
        }
    }

    /// Dequeue the next serialized frame; `None` after close.
    pub async fn next_frame(&self) -> Option<Arc<str>> {
        self.queue.pop().await
    }

    /// Atomically read and clear the lagged flag.
    pub fn take_lagged(&self) -> bool {
        self.lagged.swap(false, Ordering::AcqRel)
    }

    fn close(&self) {
        self.queue.close();
    }
}

/// Server-side singleton fanning out mutation events to all connections.
pub struct BroadcastHub {
    connections: DashMap<ConnectionId, Arc<HubConnection>>,
    queue_capacity: usize,
}

impl BroadcastHub {
    /// Create a hub whose per-connection queues hold at most
    /// `queue_capacity` frames.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            connections: DashMap::new(),
            queue_capacity,
        }
    }

    /// Add a connection to the fan-out set.
    pub fn register(&self) -> Arc<HubConnection> {
        let conn = Arc::new(HubConnection::new(self.queue_capacity));
        self.connections.insert(conn.id, conn.clone());
        debug!(connection = %conn.id, total = self.connections.len(), "connection registered");
        conn
    }

    /// Remove a connection from the fan-out set and close its queue.
    ///
    /// Idempotent: unregistering an already-removed connection is a no-op.
    pub fn unregister(&self, id: ConnectionId) {
        if let Some((_, conn)) = self.connections.remove(&id) {
            conn.close();
            debug!(connection = %id, total = self.connections.len(), "connection unregistered");
        }
    }

    /// Serialize `event` once and push it to every registered connection.
    ///
    /// Connections whose queue overflows lose their oldest buffered event
    /// and are flagged for a re-fetch on their next heartbeat.
    pub fn publish(&self, event: &Event) {
        let frame: Arc<str> = event.encode().into();
        for entry in self.connections.iter() {
            let conn = entry.value();
            if conn.queue.push(frame.clone()) {
                conn.lagged.store(true, Ordering::Release);
                warn!(
                    connection = %conn.id,
                    "outbound queue overflow, dropped oldest event; client will re-sync"
                );
            }
        }
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
