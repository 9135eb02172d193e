// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic mutation pipeline.
//!
//! A create shows up in the local cache immediately under a provisional
//! `tmp-<uuid>` id while the real write races to the store. Confirmation
//! remaps the same cache slot to the server-assigned entity in one swap;
//! failure removes the provisional row. Readers never see a duplicate.

use std::sync::Arc;

use brigade_core::{BrigadeError, EntityStore, Order, OrderDraft, OrderId, OrderStatus};
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::cache::LocalCache;

/// Issues writes against the store while keeping the cache ahead of them.
#[derive(Clone)]
pub struct OptimisticPipeline {
    store: Arc<dyn EntityStore>,
    cache: LocalCache,
}

impl OptimisticPipeline {
    pub fn new(store: Arc<dyn EntityStore>, cache: LocalCache) -> Self {
        Self { store, cache }
    }

    /// Insert a provisional order synchronously and submit the real create.
    ///
    /// Returns the provisional id (already visible in the cache when this
    /// returns) and a handle resolving to the server's verdict. The caller
    /// may drop the handle; the cache is settled either way.
    pub fn submit_create(
        &self,
        draft: OrderDraft,
    ) -> (OrderId, JoinHandle<Result<Order, BrigadeError>>) {
        let provisional_id = OrderId(format!("tmp-{}", Uuid::new_v4()));
        let now = Utc::now();
        let provisional = Order {
            id: provisional_id.clone(),
            // The server assigns the real order number on confirm.
            order_number: String::new(),
            table_number: draft.table_number,
            status: OrderStatus::Pending,
            total: draft.total,
            channel: draft.channel,
            created_at: now,
            updated_at: now,
        };
        self.cache.mutate(|snapshot| snapshot.orders.push(provisional));

        let pipeline = self.clone();
        let pending_id = provisional_id.clone();
        let handle = tokio::spawn(async move {
            match pipeline.store.create_order(draft).await {
                Ok(order) => {
                    pipeline.confirm_create(&pending_id, &order);
                    Ok(order)
                }
                Err(err) => {
                    warn!(provisional = %pending_id.0, error = %err, "create rejected, rolling back");
                    pipeline.rollback_create(&pending_id);
                    Err(err)
                }
            }
        });
        (provisional_id, handle)
    }

    /// Swap the provisional row for the confirmed entity in place. If a
    /// re-fetch already landed the confirmed row, the provisional one is
    /// simply removed.
    fn confirm_create(&self, provisional_id: &OrderId, confirmed: &Order) {
        let confirmed = confirmed.clone();
        let provisional_id = provisional_id.clone();
        self.cache.mutate(move |snapshot| {
            let already_present = snapshot
                .orders
                .iter()
                .any(|order| order.id == confirmed.id);
            if already_present {
                snapshot.orders.retain(|order| order.id != provisional_id);
            } else if let Some(slot) = snapshot
                .orders
                .iter_mut()
                .find(|order| order.id == provisional_id)
            {
                *slot = confirmed;
            } else {
                // Provisional row vanished (full re-fetch without the new
                // order yet); land the confirmed entity anyway.
                snapshot.orders.push(confirmed);
            }
        });
    }

    fn rollback_create(&self, provisional_id: &OrderId) {
        let provisional_id = provisional_id.clone();
        self.cache
            .mutate(move |snapshot| snapshot.orders.retain(|order| order.id != provisional_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_core::OrderChannel;
    use brigade_test_utils::MockStore;

    fn draft() -> OrderDraft {
        OrderDraft {
            table_number: Some(6),
            channel: OrderChannel::Manual,
            total: 480.0,
        }
    }

    #[tokio::test]
    async fn provisional_row_is_visible_immediately() {
        let store = Arc::new(MockStore::new());
        store.delay_creates();
        let cache = LocalCache::new();
        let pipeline = OptimisticPipeline::new(store, cache.clone());

        let (provisional_id, _handle) = pipeline.submit_create(draft());

        let view = cache.snapshot();
        assert_eq!(view.orders.len(), 1);
        assert_eq!(view.orders[0].id, provisional_id);
        assert!(view.orders[0].id.0.starts_with("tmp-"));
    }

    #[tokio::test]
    async fn confirm_replaces_the_same_slot() {
        let store = Arc::new(MockStore::new());
        let cache = LocalCache::new();
        let pipeline = OptimisticPipeline::new(store, cache.clone());

        let (provisional_id, handle) = pipeline.submit_create(draft());
        let confirmed = handle.await.unwrap().unwrap();

        let view = cache.snapshot();
        assert_eq!(view.orders.len(), 1, "no duplicate row");
        assert_eq!(view.orders[0].id, confirmed.id);
        assert_ne!(view.orders[0].id, provisional_id);
        assert!(!view.orders[0].order_number.is_empty());
    }

    #[tokio::test]
    async fn rejected_create_rolls_back() {
        let store = Arc::new(MockStore::new());
        store.fail_next_create("kitchen closed");
        let cache = LocalCache::new();
        let pipeline = OptimisticPipeline::new(store, cache.clone());

        let (_, handle) = pipeline.submit_create(draft());
        let result = handle.await.unwrap();

        assert!(result.is_err());
        assert!(cache.snapshot().orders.is_empty());
    }

    #[tokio::test]
    async fn confirm_after_refetch_does_not_duplicate() {
        let store = Arc::new(MockStore::new());
        store.delay_creates();
        let cache = LocalCache::new();
        let pipeline = OptimisticPipeline::new(store.clone(), cache.clone());

        let (provisional_id, handle) = pipeline.submit_create(draft());
        // A re-fetch lands the confirmed row before the create resolves.
        let confirmed_preview = store.preview_next_create();
        cache.mutate(|snapshot| snapshot.orders = vec![confirmed_preview.clone()]);

        store.release_creates();
        let confirmed = handle.await.unwrap().unwrap();

        let view = cache.snapshot();
        assert_eq!(view.orders.len(), 1);
        assert_eq!(view.orders[0].id, confirmed.id);
        assert!(view.orders.iter().all(|o| o.id != provisional_id));
    }
}
