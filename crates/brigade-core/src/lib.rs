// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Brigade real-time sync framework.
//!
//! This crate provides the domain types (orders, kitchen tokens, bills),
//! the wire event envelope, the status-transition validator, and the
//! [`EntityStore`] trait through which every entity read and write flows.
//! The hub and client crates build on these definitions.

pub mod error;
pub mod event;
pub mod lifecycle;
pub mod store;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BrigadeError;
pub use event::Event;
pub use store::EntityStore;
pub use types::{
    Bill, BillId, Collection, EntityKind, KitchenToken, Order, OrderChannel, OrderDraft, OrderId,
    OrderStatus, PaymentMethod, PaymentStatus, StatsSnapshot, TokenId, TokenStatus,
};
