// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the connection manager, reconciliation engine, and optimistic
//! pipeline into one running client.

use std::sync::Arc;

use brigade_config::model::ClientConfig;
use brigade_core::{BrigadeError, EntityStore, Order, OrderDraft, OrderId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheSnapshot, LocalCache};
use crate::connection::{ConnectionHandles, ConnectionManager, ConnectionState};
use crate::optimistic::OptimisticPipeline;
use crate::reconcile::ReconciliationEngine;

/// A running sync client: one connection to the hub, one local cache.
///
/// Dropping the client does not stop its tasks; call [`shutdown`] for a
/// clean close (sends a WebSocket close frame before tearing down).
///
/// [`shutdown`]: SyncClient::shutdown
pub struct SyncClient {
    cache: LocalCache,
    engine: ReconciliationEngine,
    pipeline: OptimisticPipeline,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncClient {
    /// Start connecting and reconciling. Returns immediately; the cache
    /// fills as the connection opens and events arrive.
    pub fn start(config: &ClientConfig, store: Arc<dyn EntityStore>) -> Self {
        let cache = LocalCache::new();
        let engine = ReconciliationEngine::new(store.clone(), cache.clone(), config);
        let pipeline = OptimisticPipeline::new(store, cache.clone());
        let (manager, handles) = ConnectionManager::new(config);
        let ConnectionHandles {
            state,
            mut events,
            mut signals,
        } = handles;
        let cancel = CancellationToken::new();

        let manager_task = tokio::spawn(manager.run(cancel.clone()));

        let pump_engine = engine.clone();
        let pump_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => pump_engine.on_event(&event),
                        None => break,
                    },
                    signal = signals.recv() => match signal {
                        Some(signal) => pump_engine.on_signal(signal),
                        None => break,
                    },
                }
            }
        });

        Self {
            cache,
            engine,
            pipeline,
            state,
            cancel,
            tasks: vec![manager_task, pump_task],
        }
    }

    /// Current cache snapshot. Never blocks.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.cache.snapshot()
    }

    /// Observe connection state changes.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Create an order optimistically. See
    /// [`OptimisticPipeline::submit_create`].
    pub fn submit_create(
        &self,
        draft: OrderDraft,
    ) -> (OrderId, JoinHandle<Result<Order, BrigadeError>>) {
        self.pipeline.submit_create(draft)
    }

    /// Await all scheduled re-fetches. Test seam.
    pub async fn wait_idle(&self) {
        self.engine.wait_idle().await;
    }

    /// Close the socket and stop all client tasks.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}
