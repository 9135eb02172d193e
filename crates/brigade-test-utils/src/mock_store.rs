// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock entity store for deterministic testing.
//!
//! `MockStore` implements `EntityStore` over in-memory collections with
//! per-collection fetch counters, scripted fetch/create failures, and a
//! gate for holding creates open while a test races other work against
//! them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use brigade_core::lifecycle::token_blocks_order;
use brigade_core::{
    Bill, BrigadeError, Collection, EntityKind, EntityStore, KitchenToken, Order, OrderChannel,
    OrderDraft, OrderId, OrderStatus, StatsSnapshot, TokenId, TokenStatus,
};

/// An in-memory entity store for testing.
///
/// Fetches serve the seeded collections and are counted per collection.
/// Failures are scripted ahead of time with [`fail_next_fetches`] and
/// [`fail_next_create`]; creates can be held open with [`delay_creates`].
///
/// [`fail_next_fetches`]: MockStore::fail_next_fetches
/// [`fail_next_create`]: MockStore::fail_next_create
/// [`delay_creates`]: MockStore::delay_creates
pub struct MockStore {
    orders: Mutex<Vec<Order>>,
    tokens: Mutex<Vec<KitchenToken>>,
    bills: Mutex<Vec<Bill>>,
    stats: Mutex<StatsSnapshot>,
    fetch_counts: Mutex<HashMap<Collection, usize>>,
    stats_fetches: AtomicUsize,
    fail_fetches: Mutex<HashMap<Collection, u32>>,
    create_error: Mutex<Option<String>>,
    order_seq: AtomicU64,
    create_gate: watch::Sender<bool>,
}

impl MockStore {
    /// Create a new mock store with empty collections.
    pub fn new() -> Self {
        let (create_gate, _) = watch::channel(true);
        Self {
            orders: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            bills: Mutex::new(Vec::new()),
            stats: Mutex::new(StatsSnapshot::default()),
            fetch_counts: Mutex::new(HashMap::new()),
            stats_fetches: AtomicUsize::new(0),
            fail_fetches: Mutex::new(HashMap::new()),
            create_error: Mutex::new(None),
            order_seq: AtomicU64::new(1),
            create_gate,
        }
    }

    /// Seed the orders collection.
    pub fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.lock().unwrap() = orders;
    }

    /// Seed the kitchen-tokens collection.
    pub fn set_tokens(&self, tokens: Vec<KitchenToken>) {
        *self.tokens.lock().unwrap() = tokens;
    }

    /// Seed the bills collection.
    pub fn set_bills(&self, bills: Vec<Bill>) {
        *self.bills.lock().unwrap() = bills;
    }

    /// Seed the stats snapshot.
    pub fn set_stats(&self, stats: StatsSnapshot) {
        *self.stats.lock().unwrap() = stats;
    }

    /// How many times the given collection was fetched.
    pub fn fetch_count(&self, collection: Collection) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }

    /// How many times the stats snapshot was fetched.
    pub fn stats_fetches(&self) -> usize {
        self.stats_fetches.load(Ordering::SeqCst)
    }

    /// Make the next `n` fetches of `collection` fail with a store error.
    pub fn fail_next_fetches(&self, collection: Collection, n: u32) {
        self.fail_fetches.lock().unwrap().insert(collection, n);
    }

    /// Make the next create fail with the given message.
    pub fn fail_next_create(&self, message: &str) {
        *self.create_error.lock().unwrap() = Some(message.to_string());
    }

    /// Hold all creates open until [`release_creates`] is called.
    ///
    /// [`release_creates`]: MockStore::release_creates
    pub fn delay_creates(&self) {
        self.create_gate.send_replace(false);
    }

    /// Let held creates proceed.
    pub fn release_creates(&self) {
        self.create_gate.send_replace(true);
    }

    /// The order the next successful create will return, id and number
    /// included. Useful for racing a re-fetch against a pending create.
    pub fn preview_next_create(&self) -> Order {
        let seq = self.order_seq.load(Ordering::SeqCst);
        Self::build_order(seq, None, OrderChannel::Manual, 0.0)
    }

    fn build_order(
        seq: u64,
        table_number: Option<u32>,
        channel: OrderChannel,
        total: f64,
    ) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId(seq.to_string()),
            order_number: format!("ORD-{}", 1000 + seq),
            table_number,
            status: OrderStatus::Pending,
            total,
            channel,
            created_at: now,
            updated_at: now,
        }
    }

    fn record_fetch(&self, collection: Collection) -> Result<(), BrigadeError> {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(collection)
            .or_insert(0) += 1;
        let mut failures = self.fail_fetches.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&collection) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BrigadeError::Store {
                    message: format!("scripted {collection} fetch failure"),
                    source: None,
                });
            }
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MockStore {
    async fn fetch_orders(&self) -> Result<Vec<Order>, BrigadeError> {
        self.record_fetch(Collection::Orders)?;
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn fetch_kitchen_tokens(&self) -> Result<Vec<KitchenToken>, BrigadeError> {
        self.record_fetch(Collection::KitchenTokens)?;
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn fetch_bills(&self) -> Result<Vec<Bill>, BrigadeError> {
        self.record_fetch(Collection::Bills)?;
        Ok(self.bills.lock().unwrap().clone())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, BrigadeError> {
        self.stats_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, BrigadeError> {
        let mut gate = self.create_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if let Some(message) = self.create_error.lock().unwrap().take() {
            return Err(BrigadeError::Store {
                message,
                source: None,
            });
        }

        let seq = self.order_seq.fetch_add(1, Ordering::SeqCst);
        let order = Self::build_order(seq, draft.table_number, draft.channel, draft.total);
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        proposed: OrderStatus,
    ) -> Result<Order, BrigadeError> {
        // Kitchen gate, same as the production store: an order may not
        // outrun a still-pending token.
        {
            let tokens = self.tokens.lock().unwrap();
            if tokens
                .iter()
                .any(|t| t.order_id == *id && token_blocks_order(proposed, t.status))
            {
                let orders = self.orders.lock().unwrap();
                let current = orders
                    .iter()
                    .find(|order| &order.id == id)
                    .map(|order| order.status.to_string())
                    .unwrap_or_default();
                return Err(BrigadeError::InvalidTransition {
                    entity: EntityKind::Order,
                    current,
                    attempted: proposed.to_string(),
                });
            }
        }

        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| BrigadeError::Store {
                message: format!("no such order: {}", id.0),
                source: None,
            })?;
        order.transition(proposed)?;
        Ok(order.clone())
    }

    async fn update_token_status(
        &self,
        id: &TokenId,
        proposed: TokenStatus,
    ) -> Result<KitchenToken, BrigadeError> {
        let mut tokens = self.tokens.lock().unwrap();
        let token = tokens
            .iter_mut()
            .find(|token| &token.id == id)
            .ok_or_else(|| BrigadeError::Store {
                message: format!("no such kitchen token: {}", id.0),
                source: None,
            })?;
        token.transition(proposed)?;
        Ok(token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            table_number: Some(2),
            channel: OrderChannel::Phone,
            total: 150.0,
        }
    }

    #[tokio::test]
    async fn fetches_are_counted_per_collection() {
        let store = MockStore::new();
        store.fetch_orders().await.unwrap();
        store.fetch_orders().await.unwrap();
        store.fetch_bills().await.unwrap();

        assert_eq!(store.fetch_count(Collection::Orders), 2);
        assert_eq!(store.fetch_count(Collection::Bills), 1);
        assert_eq!(store.fetch_count(Collection::KitchenTokens), 0);
    }

    #[tokio::test]
    async fn scripted_failures_then_recovery() {
        let store = MockStore::new();
        store.fail_next_fetches(Collection::Orders, 2);

        assert!(store.fetch_orders().await.is_err());
        assert!(store.fetch_orders().await.is_err());
        assert!(store.fetch_orders().await.is_ok());
        assert_eq!(store.fetch_count(Collection::Orders), 3);
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MockStore::new();
        let preview = store.preview_next_create();
        let first = store.create_order(draft()).await.unwrap();
        let second = store.create_order(draft()).await.unwrap();

        assert_eq!(first.id, preview.id);
        assert_eq!(first.order_number, "ORD-1001");
        assert_eq!(second.order_number, "ORD-1002");
        assert_eq!(store.fetch_orders().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn status_updates_run_the_validator() {
        let store = MockStore::new();
        let order = store.create_order(draft()).await.unwrap();

        let updated = store
            .update_order_status(&order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        let err = store
            .update_order_status(&order.id, OrderStatus::Billed)
            .await
            .unwrap_err();
        assert!(matches!(err, BrigadeError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn order_cannot_outrun_its_pending_token() {
        let store = MockStore::new();
        let order = store.create_order(draft()).await.unwrap();
        store.set_tokens(vec![KitchenToken {
            id: TokenId("t1".into()),
            token_number: "T-1".into(),
            order_id: order.id.clone(),
            status: TokenStatus::Pending,
            urgent: false,
            started_at: Utc::now(),
        }]);

        store
            .update_order_status(&order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        let err = store
            .update_order_status(&order.id, OrderStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, BrigadeError::InvalidTransition { .. }));

        // Once the kitchen picks the token up, the order may go ready.
        store
            .update_token_status(&TokenId("t1".into()), TokenStatus::Preparing)
            .await
            .unwrap();
        let updated = store
            .update_order_status(&order.id, OrderStatus::Ready)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn delayed_creates_wait_for_release() {
        let store = std::sync::Arc::new(MockStore::new());
        store.delay_creates();

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.create_order(draft()).await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        store.release_creates();
        assert!(pending.await.unwrap().is_ok());
    }
}
