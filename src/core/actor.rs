//! Serialized worker behind the currency facade
//!
//! This module provides the `FacadeWorker`, the single consumer of the facade's
//! command queue. It is the only writer of the balance cache and the only
//! caller of the ledger provider.
//!
//! # Design
//!
//! ```text
//! CurrencyFacade ──(Command)──▶ mpsc queue ──▶ FacadeWorker
//!                                   ▲              ├── BalanceCache   (writes)
//!                                   │              ├── LedgerProvider (calls)
//!                                   └─ follow-ups ─┤
//!                                                  └── ObserverSlot   (notifications)
//! ```
//!
//! Commands are processed strictly in arrival order, one at a time, each to
//! completion. Reconciliations scheduled by a command (after initialization or
//! a balance change) are posted to the back of the queue rather than run
//! inline, so anything already queued runs first.
//!
//! # Shutdown
//!
//! The worker keeps only a weak sender for follow-ups. Once every facade
//! handle is gone the queue closes; follow-ups posted after that point are
//! kept locally and drained before the worker exits, so nothing that was
//! scheduled is lost.

use futures::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot, watch};

use super::balance_cache::BalanceCache;
use super::observer::ObserverSlot;
use super::traits::{LedgerProvider, UpdateObserver};
use crate::config::FacadeConfig;
use crate::types::{Amount, BalanceSnapshot, CurrencyError, CurrencyId, Session};

/// Direction and size of an optimistic balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Adjustment {
    Increase(Amount),
    Decrease(Amount),
}

impl Adjustment {
    /// Signed delta to apply locally, or `None` if it cannot be represented
    fn delta(self) -> Option<Amount> {
        match self {
            Adjustment::Increase(amount) => Some(amount),
            Adjustment::Decrease(amount) => amount.checked_neg(),
        }
    }
}

/// Unit of work on the facade queue
pub(crate) enum Command {
    Initialize(Session),
    Adjust {
        currency: CurrencyId,
        adjustment: Adjustment,
    },
    Reconcile,
    SetObserver(Weak<dyn UpdateObserver>),
    ClearObserver,
    Flush(oneshot::Sender<()>),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Initialize(_) => "initialize",
            Command::Adjust { .. } => "adjust",
            Command::Reconcile => "reconcile",
            Command::SetObserver(_) => "set_observer",
            Command::ClearObserver => "clear_observer",
            Command::Flush(_) => "flush",
        }
    }
}

/// Single consumer of the facade command queue
pub(crate) struct FacadeWorker {
    provider: Arc<dyn LedgerProvider>,
    cache: BalanceCache,
    observer: ObserverSlot,
    config: FacadeConfig,
    requeue: mpsc::WeakUnboundedSender<Command>,
    deferred: VecDeque<Command>,
    pending: Arc<watch::Sender<usize>>,
}

impl FacadeWorker {
    pub(crate) fn new(
        provider: Arc<dyn LedgerProvider>,
        cache: BalanceCache,
        config: FacadeConfig,
        requeue: mpsc::WeakUnboundedSender<Command>,
        pending: Arc<watch::Sender<usize>>,
    ) -> Self {
        Self {
            provider,
            cache,
            observer: ObserverSlot::default(),
            config,
            requeue,
            deferred: VecDeque::new(),
            pending,
        }
    }

    /// Drain the queue until every facade handle is gone
    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("Currency facade worker started");

        while let Some(command) = commands.recv().await {
            self.process(command).await;
        }

        while let Some(command) = self.deferred.pop_front() {
            self.process(command).await;
        }

        tracing::debug!("Currency facade worker stopped");
    }

    async fn process(&mut self, command: Command) {
        tracing::trace!(command = command.name(), "Processing facade command");

        match command {
            Command::Initialize(session) => self.initialize(session).await,
            Command::Adjust {
                currency,
                adjustment,
            } => self.adjust(currency, adjustment).await,
            Command::Reconcile => self.reconcile().await,
            Command::SetObserver(observer) => self.observer.set(observer),
            Command::ClearObserver => self.observer.clear(),
            Command::Flush(done) => {
                // The caller may have stopped waiting
                let _ = done.send(());
            }
        }

        self.pending.send_modify(|pending| *pending = pending.saturating_sub(1));
    }

    async fn initialize(&mut self, session: Session) {
        match guarded("init_manager", self.provider.init_manager(&session)).await {
            Ok(()) => tracing::info!(
                publisher_id = %session.publisher_id,
                user_id = session.user_id.as_deref().unwrap_or("<provider default>"),
                "Ledger provider initialized"
            ),
            // Surfaces through the reconciliation scheduled below
            Err(e) => tracing::error!(
                publisher_id = %session.publisher_id,
                error = %e,
                "Ledger provider initialization failed"
            ),
        }

        self.schedule_reconcile();
    }

    async fn adjust(&mut self, currency: CurrencyId, adjustment: Adjustment) {
        match adjustment
            .delta()
            .and_then(|delta| self.cache.apply_delta(currency.as_str(), delta))
        {
            Some(balance) => tracing::debug!(
                currency = %currency,
                ?adjustment,
                balance,
                "Applied optimistic balance change"
            ),
            None => tracing::warn!(
                currency = %currency,
                ?adjustment,
                "Optimistic balance change would overflow; keeping cached balance until reconciliation"
            ),
        }

        let forwarded = match adjustment {
            Adjustment::Increase(amount) => {
                guarded(
                    "increase_balance",
                    self.provider.increase_balance(amount, currency.as_str()),
                )
                .await
            }
            Adjustment::Decrease(amount) => {
                guarded(
                    "decrease_balance",
                    self.provider.decrease_balance(amount, currency.as_str()),
                )
                .await
            }
        };

        if let Err(e) = forwarded {
            tracing::warn!(
                currency = %currency,
                ?adjustment,
                error = %e,
                "Ledger provider rejected balance change"
            );
        }

        if self.config.reconcile_after_mutation {
            self.schedule_reconcile();
        }
    }

    async fn reconcile(&mut self) {
        let success = match guarded("check_for_update", self.provider.check_for_update()).await {
            Ok(snapshot) => {
                let authoritative: BalanceSnapshot = snapshot
                    .into_iter()
                    .filter(|(currency, _)| {
                        let valid = !currency.trim().is_empty();
                        if !valid {
                            tracing::warn!("Ignoring authoritative balance with empty currency name");
                        }
                        valid
                    })
                    .collect();
                let merged = authoritative.len();
                self.cache.merge(authoritative);

                tracing::info!(currencies = merged, "Balances updated from ledger");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Balance update from ledger failed");
                false
            }
        };

        self.observer.notify(success);
    }

    /// Post a reconciliation to the back of the queue
    fn schedule_reconcile(&mut self) {
        self.pending.send_modify(|pending| *pending += 1);

        let rejected = match self.requeue.upgrade() {
            Some(sender) => sender.send(Command::Reconcile).err().map(|e| e.0),
            None => Some(Command::Reconcile),
        };

        if let Some(command) = rejected {
            self.deferred.push_back(command);
        }
    }
}

/// Run a provider call, converting a panic into a provider failure
async fn guarded<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, CurrencyError>>,
) -> Result<T, CurrencyError> {
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(CurrencyError::provider_unavailable(format!(
            "ledger provider panicked during {}",
            operation
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::increase(Adjustment::Increase(10), Some(10))]
    #[case::negative_increase(Adjustment::Increase(-10), Some(-10))]
    #[case::decrease(Adjustment::Decrease(20), Some(-20))]
    #[case::negative_decrease(Adjustment::Decrease(-5), Some(5))]
    #[case::unrepresentable(Adjustment::Decrease(Amount::MIN), None)]
    fn test_adjustment_delta(#[case] adjustment: Adjustment, #[case] expected: Option<Amount>) {
        assert_eq!(adjustment.delta(), expected);
    }

    #[tokio::test]
    async fn test_guarded_passes_results_through() {
        let ok = guarded("op", async { Ok::<_, CurrencyError>(5) }).await;
        assert_eq!(ok, Ok(5));

        let err = guarded("op", async {
            Err::<i32, _>(CurrencyError::reconciliation_failed("down"))
        })
        .await;
        assert_eq!(err, Err(CurrencyError::reconciliation_failed("down")));
    }

    #[tokio::test]
    async fn test_guarded_converts_panics() {
        let result = guarded("check_for_update", async {
            if true {
                panic!("sdk exploded");
            }
            Ok::<i32, CurrencyError>(0)
        })
        .await;

        assert_eq!(
            result,
            Err(CurrencyError::provider_unavailable(
                "ledger provider panicked during check_for_update"
            ))
        );
    }
}
