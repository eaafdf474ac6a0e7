//! Script step types for the CLI runner
//!
//! A script is a sequence of steps replayed against a facade backed by the
//! in-memory ledger. Facade steps go through the facade; ledger steps change
//! the simulated server directly.

use super::currency::{Amount, CurrencyId};
use super::event::LifecycleEvent;

/// One row of a replay script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// `CurrencyFacade::increase_balance`
    Increase {
        /// Currency to credit
        currency: CurrencyId,
        /// Amount to add (any sign)
        amount: Amount,
    },

    /// `CurrencyFacade::decrease_balance`
    Decrease {
        /// Currency to debit
        currency: CurrencyId,
        /// Amount to subtract (any sign)
        amount: Amount,
    },

    /// `CurrencyFacade::reconcile`
    Reconcile,

    /// `CurrencyFacade::on_lifecycle_event`
    Lifecycle(LifecycleEvent),

    /// Server-side credit the facade only sees after reconciling
    Grant {
        /// Currency to credit on the ledger
        currency: CurrencyId,
        /// Amount to add on the ledger
        amount: Amount,
    },

    /// Make the ledger unreachable
    Outage,

    /// Make the ledger reachable again
    Restore,
}

impl ScriptStep {
    /// Whether this step acts on the ledger rather than on the facade
    pub fn targets_ledger(&self) -> bool {
        matches!(
            self,
            ScriptStep::Grant { .. } | ScriptStep::Outage | ScriptStep::Restore
        )
    }
}
