// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local entity cache with lock-free reads.
//!
//! Readers take an [`arc_swap`] snapshot and never block; writers serialize
//! through a mutex, clone the current snapshot, apply their change, and swap
//! the new snapshot in whole. Every swap is a consistent view, so a reader
//! never observes a half-applied mutation.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use brigade_core::{Bill, Collection, KitchenToken, Order, StatsSnapshot};

/// One immutable, internally consistent view of all cached collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    pub orders: Vec<Order>,
    pub kitchen_tokens: Vec<KitchenToken>,
    pub bills: Vec<Bill>,
    pub stats: StatsSnapshot,
}

impl CacheSnapshot {
    /// Replace the named collection's rows wholesale.
    pub fn set_collection(&mut self, collection: Collection, snapshot: CollectionRows) {
        match (collection, snapshot) {
            (Collection::Orders, CollectionRows::Orders(rows)) => self.orders = rows,
            (Collection::KitchenTokens, CollectionRows::KitchenTokens(rows)) => {
                self.kitchen_tokens = rows
            }
            (Collection::Bills, CollectionRows::Bills(rows)) => self.bills = rows,
            // Mismatched payloads are a caller bug; leave the cache untouched.
            _ => {}
        }
    }
}

/// Typed rows for one collection, as fetched from the entity store.
#[derive(Debug, Clone)]
pub enum CollectionRows {
    Orders(Vec<Order>),
    KitchenTokens(Vec<KitchenToken>),
    Bills(Vec<Bill>),
}

/// Shared cache handle. Cheap to clone; all clones see the same data.
#[derive(Clone)]
pub struct LocalCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    snapshot: ArcSwap<CacheSnapshot>,
    // Serializes read-modify-write cycles so concurrent mutators cannot
    // lose each other's updates between load and store.
    write: Mutex<()>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                snapshot: ArcSwap::from_pointee(CacheSnapshot::default()),
                write: Mutex::new(()),
            }),
        }
    }

    /// Current snapshot. Never blocks, never sees a partial write.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.inner.snapshot.load_full()
    }

    /// Apply `f` to a copy of the current snapshot and publish the result
    /// atomically.
    pub fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut CacheSnapshot),
    {
        let _guard = self
            .inner
            .write
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = (*self.inner.snapshot.load_full()).clone();
        f(&mut next);
        self.inner.snapshot.store(Arc::new(next));
    }

    /// Replace one collection's rows in a single swap.
    pub fn set_collection(&self, collection: Collection, rows: CollectionRows) {
        self.mutate(|snapshot| snapshot.set_collection(collection, rows));
    }

    /// Replace the stats widget values.
    pub fn set_stats(&self, stats: StatsSnapshot) {
        self.mutate(|snapshot| snapshot.stats = stats);
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}
