// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the authoritative entity store.
//!
//! The persistence collaborator is treated as a black box behind a
//! `GET/POST/PATCH` surface on the orders, kitchen-tokens, and bills
//! collections. The sync core never bypasses this surface for writes; it
//! only listens for the resulting events and re-fetches through it.

pub mod rest;

pub use rest::RestStore;
