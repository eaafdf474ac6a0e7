//! In-memory ledger provider
//!
//! `InMemoryLedger` plays the role of the authoritative service of record. It
//! keeps balances in a `DashMap` and can be switched offline to simulate an
//! unreachable server.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::core::LedgerProvider;
use crate::types::{Amount, BalanceSnapshot, CurrencyError, Session};

/// Ledger provider backed by process memory
///
/// Balances changed through [`InMemoryLedger::grant`] are server-side only:
/// a facade sees them after its next reconciliation.
#[derive(Debug)]
pub struct InMemoryLedger {
    balances: DashMap<String, Amount>,
    session: RwLock<Option<Session>>,
    online: AtomicBool,
    update_requests: AtomicUsize,
}

impl InMemoryLedger {
    /// Create an online ledger with no balances
    pub fn new() -> Self {
        Self::with_balances(BalanceSnapshot::new())
    }

    /// Create an online ledger preloaded with authoritative balances
    pub fn with_balances(balances: BalanceSnapshot) -> Self {
        Self {
            balances: balances.into_iter().collect(),
            session: RwLock::new(None),
            online: AtomicBool::new(true),
            update_requests: AtomicUsize::new(0),
        }
    }

    /// Credit `amount` to `currency` on the server side only
    pub fn grant(&self, currency: &str, amount: Amount) -> Result<Amount, CurrencyError> {
        self.apply(currency, Some(amount), "grant")
    }

    /// Switch the simulated server reachability
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        tracing::debug!(online, "In-memory ledger reachability changed");
    }

    /// Whether the simulated server is reachable
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Number of `check_for_update` calls received so far
    pub fn update_requests(&self) -> usize {
        self.update_requests.load(Ordering::SeqCst)
    }

    /// Session the ledger was initialized with, if any
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Authoritative balance for `currency` (0 if unknown)
    pub fn balance(&self, currency: &str) -> Amount {
        self.balances.get(currency).map(|b| *b.value()).unwrap_or(0)
    }

    /// Copy of every authoritative balance
    pub fn snapshot(&self) -> BalanceSnapshot {
        self.balances
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    fn ensure_online(&self) -> Result<(), CurrencyError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(CurrencyError::provider_unavailable("ledger server is unreachable"))
        }
    }

    fn apply(
        &self,
        currency: &str,
        delta: Option<Amount>,
        operation: &str,
    ) -> Result<Amount, CurrencyError> {
        let overflow = || {
            CurrencyError::reconciliation_failed(format!(
                "{} on '{}' would overflow the ledger balance",
                operation, currency
            ))
        };

        let delta = delta.ok_or_else(overflow)?;
        let mut entry = self.balances.entry(currency.to_string()).or_insert(0);
        let updated = entry.value().checked_add(delta).ok_or_else(overflow)?;
        *entry.value_mut() = updated;
        Ok(updated)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerProvider for InMemoryLedger {
    async fn init_manager(&self, session: &Session) -> Result<(), CurrencyError> {
        self.ensure_online()?;
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn check_for_update(&self) -> Result<BalanceSnapshot, CurrencyError> {
        self.update_requests.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;

        if self.session.read().await.is_none() {
            return Err(CurrencyError::reconciliation_failed(
                "ledger has not been initialized with a session",
            ));
        }

        Ok(self.snapshot())
    }

    async fn get_balance(&self, currency: &str) -> Result<Amount, CurrencyError> {
        self.ensure_online()?;
        Ok(self.balance(currency))
    }

    async fn increase_balance(&self, amount: Amount, currency: &str) -> Result<(), CurrencyError> {
        self.ensure_online()?;
        self.apply(currency, Some(amount), "increase").map(|_| ())
    }

    async fn decrease_balance(&self, amount: Amount, currency: &str) -> Result<(), CurrencyError> {
        self.ensure_online()?;
        self.apply(currency, amount.checked_neg(), "decrease")
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("pub1", "").unwrap()
    }

    #[tokio::test]
    async fn test_update_requires_initialization() {
        let ledger = InMemoryLedger::new();

        let result = ledger.check_for_update().await;

        assert!(matches!(
            result,
            Err(CurrencyError::ReconciliationFailed { .. })
        ));
        assert_eq!(ledger.update_requests(), 1);
    }

    #[tokio::test]
    async fn test_initialized_ledger_returns_balances() {
        let ledger = InMemoryLedger::with_balances(BalanceSnapshot::from([(
            "gold".to_string(),
            100,
        )]));
        ledger.init_manager(&session()).await.unwrap();

        let snapshot = ledger.check_for_update().await.unwrap();

        assert_eq!(snapshot.get("gold"), Some(&100));
        assert_eq!(ledger.session().await, Some(session()));
    }

    #[tokio::test]
    async fn test_increase_and_decrease() {
        let ledger = InMemoryLedger::new();

        ledger.increase_balance(50, "coins").await.unwrap();
        ledger.decrease_balance(20, "coins").await.unwrap();

        assert_eq!(ledger.balance("coins"), 30);
        assert_eq!(ledger.get_balance("coins").await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_offline_ledger_rejects_everything() {
        let ledger = InMemoryLedger::new();
        ledger.set_online(false);

        assert!(ledger.init_manager(&session()).await.is_err());
        assert!(ledger.check_for_update().await.is_err());
        assert!(ledger.increase_balance(1, "gold").await.is_err());
        assert_eq!(ledger.balance("gold"), 0);

        ledger.set_online(true);
        assert!(ledger.init_manager(&session()).await.is_ok());
    }

    #[tokio::test]
    async fn test_overflow_is_rejected() {
        let ledger = InMemoryLedger::with_balances(BalanceSnapshot::from([(
            "gold".to_string(),
            Amount::MAX,
        )]));

        let result = ledger.increase_balance(1, "gold").await;

        assert!(result.is_err());
        assert_eq!(ledger.balance("gold"), Amount::MAX);
    }

    #[test]
    fn test_grant_is_server_side() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.grant("gems", 5).unwrap(), 5);
        assert_eq!(ledger.snapshot().get("gems"), Some(&5));
    }
}
