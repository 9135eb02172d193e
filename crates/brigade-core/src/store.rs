// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persistence collaborator seam.
//!
//! All entity reads and writes flow through [`EntityStore`]; the sync core
//! never bypasses it. After a reconnect the store is the source of truth:
//! clients reconcile by re-fetching collections, not by event replay.

use async_trait::async_trait;

use crate::error::BrigadeError;
use crate::types::{
    Bill, KitchenToken, Order, OrderDraft, OrderId, OrderStatus, StatsSnapshot, TokenId,
    TokenStatus,
};

/// Client interface to the authoritative entity store.
///
/// Implemented by the REST collaborator client (`brigade-store`) and by
/// the in-memory mock in `brigade-test-utils`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch the full orders collection.
    async fn fetch_orders(&self) -> Result<Vec<Order>, BrigadeError>;

    /// Fetch the full kitchen-tokens collection.
    async fn fetch_kitchen_tokens(&self) -> Result<Vec<KitchenToken>, BrigadeError>;

    /// Fetch the full bills collection.
    async fn fetch_bills(&self) -> Result<Vec<Bill>, BrigadeError>;

    /// Fetch the current dashboard stats snapshot.
    async fn fetch_stats(&self) -> Result<StatsSnapshot, BrigadeError>;

    /// Create a new order. The server assigns id, order number, and timestamps.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, BrigadeError>;

    /// Request an order status transition. Illegal transitions are rejected
    /// with [`BrigadeError::InvalidTransition`] before any write occurs.
    async fn update_order_status(
        &self,
        id: &OrderId,
        proposed: OrderStatus,
    ) -> Result<Order, BrigadeError>;

    /// Request a kitchen-token status transition, same contract as orders.
    async fn update_token_status(
        &self,
        id: &TokenId,
        proposed: TokenStatus,
    ) -> Result<KitchenToken, BrigadeError>;
}
