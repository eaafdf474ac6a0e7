//! Concurrent-read balance cache
//!
//! This module provides the `BalanceCache` struct, the local copy of every
//! currency balance the facade knows about.
//!
//! # Design
//!
//! The cache wraps a `DashMap` so that reads from any thread proceed without
//! waiting on the facade's command queue. Writes are only ever issued by the
//! facade worker, which keeps all mutations linearized; readers observe the
//! snapshots that worker produces.

use dashmap::DashMap;
use std::sync::Arc;

use crate::types::{Amount, BalanceSnapshot};

/// Shared balance cache keyed by currency name
///
/// Cloning is cheap and yields another handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct BalanceCache {
    balances: Arc<DashMap<String, Amount>>,
}

impl BalanceCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            balances: Arc::new(DashMap::new()),
        }
    }

    /// Cached balance for `currency`, or 0 if the currency is unknown
    pub fn get(&self, currency: &str) -> Amount {
        self.balances
            .get(currency)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Apply a signed delta to a single currency
    ///
    /// Missing currencies start from 0. Returns the new balance, or `None` if
    /// the delta would overflow; the stored balance is left untouched then.
    pub fn apply_delta(&self, currency: &str, delta: Amount) -> Option<Amount> {
        let mut entry = self.balances.entry(currency.to_string()).or_insert(0);
        let updated = entry.value().checked_add(delta)?;
        *entry.value_mut() = updated;
        Some(updated)
    }

    /// Merge authoritative balances into the cache
    ///
    /// Each currency in `snapshot` replaces the cached value; currencies absent
    /// from the snapshot keep their local value.
    pub fn merge(&self, snapshot: BalanceSnapshot) {
        for (currency, balance) in snapshot {
            self.balances.insert(currency, balance);
        }
    }

    /// Copy of every cached balance
    pub fn snapshot(&self) -> BalanceSnapshot {
        self.balances
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of cached currencies
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether the cache holds no currencies
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
