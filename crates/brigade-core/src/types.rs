// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Brigade workspace.
//!
//! The persistence collaborator owns the authoritative copies of these
//! entities; each client holds a read-mostly cache that is always
//! reconcilable by re-fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Unique identifier for a kitchen token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

/// Unique identifier for a bill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillId(pub String);

/// The kind of entity a status transition applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    KitchenToken,
}

/// A cached collection tracked by the client reconciliation engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Orders,
    KitchenTokens,
    Bills,
}

/// Order lifecycle status.
///
/// The legal transition graph lives in [`crate::lifecycle`]. `Pending` is
/// initial and `Billed` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Delayed,
    Ready,
    Completed,
    Delivered,
    Billed,
}

impl OrderStatus {
    /// Whether a bill may be created for an order in this status.
    pub fn is_billable(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }
}

/// Kitchen token lifecycle status. Mirrors a subset of the order lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Pending,
    Preparing,
    Delayed,
    Ready,
    Served,
}

/// The channel an order originated from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderChannel {
    Manual,
    Phone,
    Chat,
    Zomato,
    Swiggy,
    Assistant,
}

/// A restaurant order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable order number, e.g. "ORD-1001".
    pub order_number: String,
    /// Table number for dine-in orders; `None` for takeaway/delivery.
    pub table_number: Option<u32>,
    pub status: OrderStatus,
    pub total: f64,
    pub channel: OrderChannel,
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last accepted transition. Strictly increases with
    /// each transition; elapsed-time displays subtract this from "now".
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for creating a new order. The server assigns the
/// id, order number, and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub table_number: Option<u32>,
    pub channel: OrderChannel,
    pub total: f64,
}

/// A kitchen preparation token. An order has at most one active token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenToken {
    pub id: TokenId,
    /// Display number shown on the kitchen screen, e.g. "T-17".
    pub token_number: String,
    pub order_id: OrderId,
    pub status: TokenStatus,
    pub urgent: bool,
    /// Timestamp of the last accepted transition (preparation elapsed time
    /// is derived from this, never from a cached creation time).
    pub started_at: DateTime<Utc>,
}

/// Payment status of a bill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Payment method used to settle a bill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

/// A bill for a completed order. One-to-one with its order once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub bill_number: String,
    pub order_id: OrderId,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
}

/// Dashboard statistics snapshot. Pushed whole in `stats_updated` events,
/// so clients replace their copy directly without a re-fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub orders_today: u64,
    pub active_orders: u64,
    pub pending_tokens: u64,
    pub revenue_today: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn order_status_display_round_trips() {
        let all = [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Delayed,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Delivered,
            OrderStatus::Billed,
        ];
        assert_eq!(all.len(), 7, "OrderStatus must have exactly 7 variants");
        for status in &all {
            let s = status.to_string();
            let parsed = OrderStatus::from_str(&s).expect("should parse back");
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn order_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
        let parsed: OrderStatus = serde_json::from_str("\"delayed\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delayed);
    }

    #[test]
    fn billable_statuses() {
        assert!(OrderStatus::Completed.is_billable());
        assert!(OrderStatus::Delivered.is_billable());
        assert!(!OrderStatus::Pending.is_billable());
        assert!(!OrderStatus::Ready.is_billable());
        assert!(!OrderStatus::Billed.is_billable());
    }

    #[test]
    fn order_round_trips_through_json() {
        let order = Order {
            id: OrderId("1042".into()),
            order_number: "ORD-1042".into(),
            table_number: Some(7),
            status: OrderStatus::Pending,
            total: 540.0,
            channel: OrderChannel::Manual,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, parsed);
    }

    #[test]
    fn stats_snapshot_defaults_to_zero() {
        let stats = StatsSnapshot::default();
        assert_eq!(stats.orders_today, 0);
        assert_eq!(stats.revenue_today, 0.0);
    }
}
