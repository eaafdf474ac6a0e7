//! Core traits for the ledger provider and update observers
//!
//! These are the two seams of the facade: the ledger provider is the opaque
//! service of record the facade reconciles against, and the observer is the
//! single listener told about each reconciliation outcome.

use async_trait::async_trait;

use crate::types::{Amount, BalanceSnapshot, CurrencyError, Session, UpdateEvent};

/// Authoritative source of currency balances
///
/// Implementations wrap whatever SDK or service actually owns the ledger.
/// Every method reports failure through a typed result; the facade turns
/// failures into `UpdateFailed` notifications instead of surfacing them.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Prepare the provider for the given publisher/user session
    async fn init_manager(&self, session: &Session) -> Result<(), CurrencyError>;

    /// Fetch the authoritative balances for every currency
    async fn check_for_update(&self) -> Result<BalanceSnapshot, CurrencyError>;

    /// Provider-side view of a single balance
    async fn get_balance(&self, currency: &str) -> Result<Amount, CurrencyError>;

    /// Record an increase of `amount` for `currency`
    async fn increase_balance(&self, amount: Amount, currency: &str) -> Result<(), CurrencyError>;

    /// Record a decrease of `amount` for `currency`
    async fn decrease_balance(&self, amount: Amount, currency: &str) -> Result<(), CurrencyError>;
}

/// Listener for reconciliation outcomes
///
/// Called on the facade's worker task, once per reconciliation, in the order
/// the reconciliations were enqueued. Implementations must not block.
pub trait UpdateObserver: Send + Sync {
    /// Receive the outcome of one reconciliation
    fn on_update(&self, event: UpdateEvent);
}
