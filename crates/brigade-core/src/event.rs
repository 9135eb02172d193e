// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The wire event envelope exchanged between the hub and its clients.
//!
//! Every frame is a JSON object of shape `{"type": string, "data"?: object}`,
//! modeled as an adjacently tagged enum so downstream code matches
//! exhaustively instead of probing fields. Decoding happens once at the
//! channel boundary; an unknown `type` or malformed payload is a protocol
//! error that drops the single envelope, never the connection.
//!
//! Snapshot events (`stats_updated`) carry a complete replacement value.
//! Signal events (`new_order`, `order_updated`, ...) carry a partial payload
//! and tell the client which collection to re-fetch.

use serde::{Deserialize, Serialize};

use crate::error::BrigadeError;
use crate::types::{BillId, Collection, OrderId, OrderStatus, StatsSnapshot, TokenId, TokenStatus};

/// Partial order payload carried by `new_order` / `order_updated` signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSignal {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// Partial kitchen-token payload carried by token signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSignal {
    pub id: TokenId,
    pub order_id: OrderId,
    #[serde(default)]
    pub status: Option<TokenStatus>,
}

/// Partial bill payload carried by bill signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSignal {
    pub id: BillId,
    pub order_id: OrderId,
}

/// A typed event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    /// Liveness heartbeat sent by clients on a fixed interval.
    Ping,
    /// Optional heartbeat reply; logged when seen, not required for liveness.
    Pong,
    /// Connection acknowledgement sent by the hub on open.
    Connect { message: String },
    /// The hub dropped buffered events for this connection; re-fetch all
    /// tracked collections (same client path as a reconnect).
    Resync,
    /// Full stats snapshot; clients replace their cached copy directly.
    StatsUpdated(StatsSnapshot),
    NewOrder(OrderSignal),
    OrderUpdated(OrderSignal),
    NewKitchenToken(TokenSignal),
    KitchenTokenUpdated(TokenSignal),
    NewBill(BillSignal),
    BillUpdated(BillSignal),
}

/// Identity and status carried by a signal event, used by the client for
/// deduplication of repeated identical status signals.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalKey {
    pub collection: Collection,
    pub entity_id: String,
    /// Status as carried on the wire; `None` when the payload omits it.
    pub status: Option<String>,
}

impl Event {
    /// Decode a single text frame. Malformed JSON or an unknown `type`
    /// yields [`BrigadeError::Protocol`].
    pub fn decode(text: &str) -> Result<Self, BrigadeError> {
        serde_json::from_str(text).map_err(|e| BrigadeError::Protocol {
            detail: format!("malformed envelope: {e}"),
        })
    }

    /// Encode to a text frame. Serialization of these types cannot fail.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("event envelope serializes")
    }

    /// The cached collection a signal event invalidates, if any.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            Event::NewOrder(_) | Event::OrderUpdated(_) => Some(Collection::Orders),
            Event::NewKitchenToken(_) | Event::KitchenTokenUpdated(_) => {
                Some(Collection::KitchenTokens)
            }
            Event::NewBill(_) | Event::BillUpdated(_) => Some(Collection::Bills),
            Event::Ping
            | Event::Pong
            | Event::Connect { .. }
            | Event::Resync
            | Event::StatsUpdated(_) => None,
        }
    }

    /// The dedup key for a signal event, if this event is one.
    pub fn signal_key(&self) -> Option<SignalKey> {
        match self {
            Event::NewOrder(sig) | Event::OrderUpdated(sig) => Some(SignalKey {
                collection: Collection::Orders,
                entity_id: sig.id.0.clone(),
                status: sig.status.map(|s| s.to_string()),
            }),
            Event::NewKitchenToken(sig) | Event::KitchenTokenUpdated(sig) => Some(SignalKey {
                collection: Collection::KitchenTokens,
                entity_id: sig.id.0.clone(),
                status: sig.status.map(|s| s.to_string()),
            }),
            Event::NewBill(sig) => Some(SignalKey {
                collection: Collection::Bills,
                entity_id: sig.id.0.clone(),
                status: None,
            }),
            Event::BillUpdated(sig) => Some(SignalKey {
                collection: Collection::Bills,
                entity_id: sig.id.0.clone(),
                status: None,
            }),
            _ => None,
        }
    }
}
