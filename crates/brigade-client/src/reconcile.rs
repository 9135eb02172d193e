// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation engine.
//!
//! Turns inbound events into cache updates. Snapshot events replace their
//! cache slot directly. Signal events only mark a collection stale: the
//! engine schedules a debounced re-fetch from the authoritative store, and a
//! newer schedule for the same collection supersedes a pending one, so a
//! burst of signals costs one fetch. Reconnects and `resync` envelopes
//! force a re-fetch of every collection; events missed while disconnected
//! are never replayed, only re-fetched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use brigade_config::model::ClientConfig;
use brigade_core::event::SignalKey;
use brigade_core::{Collection, EntityStore, Event};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backoff::BackoffPolicy;
use crate::cache::{CollectionRows, LocalCache};
use crate::connection::ConnectionSignal;

/// One slot per concurrently scheduled fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FetchSlot {
    Rows(Collection),
    Stats,
}

/// Shared engine handle. Cheap to clone; all clones drive the same cache.
#[derive(Clone)]
pub struct ReconciliationEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<dyn EntityStore>,
    cache: LocalCache,
    debounce: Duration,
    backoff: BackoffPolicy,
    /// entity id → last status whose fetch was applied (or is in flight),
    /// per collection. Entries are dropped when a fetch is abandoned.
    last_status: Mutex<HashMap<(Collection, String), String>>,
    /// In-flight debounced fetches; a newer schedule aborts the older one.
    pending: Mutex<HashMap<FetchSlot, JoinHandle<()>>>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn EntityStore>, cache: LocalCache, config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                cache,
                debounce: Duration::from_millis(config.refetch_debounce_ms),
                backoff: BackoffPolicy::from_config(config),
                last_status: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.inner.cache
    }

    /// Single entry point for decoded envelopes.
    pub fn on_event(&self, event: &Event) {
        match event {
            Event::StatsUpdated(stats) => self.inner.cache.set_stats(stats.clone()),
            Event::Resync => {
                info!("hub requested resync");
                self.refetch_all();
            }
            _ => {
                if let Some(key) = event.signal_key() {
                    if self.is_duplicate(&key) {
                        debug!(
                            collection = %key.collection,
                            entity = %key.entity_id,
                            "duplicate status signal dropped"
                        );
                        return;
                    }
                    self.schedule_refetch(FetchSlot::Rows(key.collection), self.inner.debounce);
                }
            }
        }
    }

    /// Connection transitions from the manager.
    pub fn on_signal(&self, signal: ConnectionSignal) {
        match signal {
            ConnectionSignal::Connected => {
                info!("connected, loading initial snapshot");
                self.refetch_all();
            }
            ConnectionSignal::Reconnected => {
                info!("reconnected, re-fetching all collections");
                self.refetch_all();
            }
            ConnectionSignal::ConnectionLost { attempts } => {
                warn!(attempts, "connection lost for good");
            }
            ConnectionSignal::Disconnected => {}
        }
    }

    /// Re-fetch every collection plus the stats snapshot, without debounce.
    pub fn refetch_all(&self) {
        // The cache is about to be rebuilt from authority; stale dedup
        // entries must not swallow the next status signal.
        self.inner
            .last_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        for collection in [Collection::Orders, Collection::KitchenTokens, Collection::Bills] {
            self.schedule_refetch(FetchSlot::Rows(collection), Duration::ZERO);
        }
        self.schedule_refetch(FetchSlot::Stats, Duration::ZERO);
    }

    /// Await every scheduled fetch, including ones scheduled while waiting.
    /// Test seam; production callers let fetches land whenever they land.
    pub async fn wait_idle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut pending = self
                    .inner
                    .pending
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                pending.drain().map(|(_, handle)| handle).collect()
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                // Aborted handles were superseded; that is not a failure.
                let _ = handle.await;
            }
        }
    }

    fn is_duplicate(&self, key: &SignalKey) -> bool {
        let Some(status) = &key.status else {
            // Payloads without a status cannot be deduplicated.
            return false;
        };
        let mut last = self
            .inner
            .last_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let slot = (key.collection, key.entity_id.clone());
        match last.get(&slot) {
            Some(previous) if previous == status => true,
            _ => {
                last.insert(slot, status.clone());
                false
            }
        }
    }

    fn schedule_refetch(&self, slot: FetchSlot, delay: Duration) {
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            engine.fetch_with_retry(slot).await;
        });
        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.insert(slot, handle) {
            previous.abort();
        }
    }

    /// Fetch one slot, retrying transient failures with the same backoff
    /// family the socket uses. Giving up after the attempt limit forgets
    /// the collection's dedup entries: the cache never applied those
    /// statuses, so a redelivery of the very same signal must schedule a
    /// fresh fetch rather than be dropped as a duplicate.
    async fn fetch_with_retry(&self, slot: FetchSlot) {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_slot(slot).await {
                Ok(()) => return,
                Err(err) => {
                    attempt += 1;
                    warn!(?slot, attempt, error = %err, "re-fetch failed");
                    if self.inner.backoff.exhausted(attempt) {
                        warn!(?slot, "re-fetch attempts exhausted");
                        if let FetchSlot::Rows(collection) = slot {
                            self.forget_statuses(collection);
                        }
                        return;
                    }
                    tokio::time::sleep(self.inner.backoff.delay(attempt - 1)).await;
                }
            }
        }
    }

    /// Drop dedup entries for a collection whose re-fetch was abandoned.
    fn forget_statuses(&self, collection: Collection) {
        self.inner
            .last_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|(c, _), _| *c != collection);
    }

    async fn fetch_slot(&self, slot: FetchSlot) -> Result<(), brigade_core::BrigadeError> {
        match slot {
            FetchSlot::Rows(Collection::Orders) => {
                let rows = self.inner.store.fetch_orders().await?;
                self.inner
                    .cache
                    .set_collection(Collection::Orders, CollectionRows::Orders(rows));
            }
            FetchSlot::Rows(Collection::KitchenTokens) => {
                let rows = self.inner.store.fetch_kitchen_tokens().await?;
                self.inner.cache.set_collection(
                    Collection::KitchenTokens,
                    CollectionRows::KitchenTokens(rows),
                );
            }
            FetchSlot::Rows(Collection::Bills) => {
                let rows = self.inner.store.fetch_bills().await?;
                self.inner
                    .cache
                    .set_collection(Collection::Bills, CollectionRows::Bills(rows));
            }
            FetchSlot::Stats => {
                let stats = self.inner.store.fetch_stats().await?;
                self.inner.cache.set_stats(stats);
            }
        }
        Ok(())
    }
}
