// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Brigade integration tests.
//!
//! Provides an in-memory [`MockStore`] implementing `EntityStore` with
//! scripted failures and call counting, for fast, deterministic,
//! CI-runnable tests without an external collaborator service.

pub mod mock_store;

pub use mock_store::MockStore;
