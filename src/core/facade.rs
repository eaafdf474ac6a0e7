//! Public handle of the currency facade
//!
//! This module provides the `CurrencyFacade` struct: a local cache of named
//! balances kept in step with an external ledger provider.
//!
//! # Design
//!
//! ```text
//! CurrencyFacade
//!     ├── OnceLock<Session>       (one-way initialization, first call wins)
//!     ├── BalanceCache            (lock-free reads from any thread)
//!     ├── mpsc::UnboundedSender   (commands to the worker)
//!     └── JoinHandle              (the FacadeWorker task)
//! ```
//!
//! Reads are answered straight from the cache. Everything else is a command
//! for the worker task: the call enqueues it and returns immediately, and the
//! worker applies commands one at a time in the order they were issued.
//!
//! # Failure Policy
//!
//! Nothing the ledger provider does reaches the caller. Provider failures turn
//! into `UpdateFailed` notifications; operations issued before `initialize`
//! are logged and ignored; `get_balance` answers 0 when it has nothing better.
//! The only errors returned are rejected arguments and a stopped worker.

use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::actor::{Adjustment, Command, FacadeWorker};
use super::balance_cache::BalanceCache;
use super::traits::{LedgerProvider, UpdateObserver};
use crate::config::FacadeConfig;
use crate::types::{Amount, BalanceSnapshot, CurrencyError, CurrencyId, LifecycleEvent, Session};

/// Client-side facade over a virtual currency ledger
///
/// The facade is `Send + Sync`; share it behind an `Arc` when several parts of
/// a host need it.
///
/// # Examples
///
/// ```no_run
/// use currency_facade::core::{ChannelObserver, CurrencyFacade};
/// use currency_facade::config::FacadeConfig;
/// use currency_facade::ledger::InMemoryLedger;
/// use std::sync::Arc;
///
/// # async fn demo() -> Result<(), currency_facade::CurrencyError> {
/// let ledger = Arc::new(InMemoryLedger::new());
/// let facade = CurrencyFacade::new(ledger, FacadeConfig::default())?;
///
/// let (observer, mut events) = ChannelObserver::new();
/// facade.set_observer(&observer)?;
/// facade.initialize("my-publisher", "")?;
///
/// facade.increase_balance("gold", 10)?;
/// println!("gold = {}", facade.get_balance("gold"));
/// let _outcome = events.recv().await;
///
/// facade.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CurrencyFacade {
    session: OnceLock<Session>,
    init_lock: Mutex<()>,
    cache: BalanceCache,
    commands: mpsc::UnboundedSender<Command>,
    pending: Arc<watch::Sender<usize>>,
    worker: JoinHandle<()>,
    config: FacadeConfig,
}

impl CurrencyFacade {
    /// Create a facade whose worker runs on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::NoRuntime` when called outside a runtime.
    pub fn new(
        provider: Arc<dyn LedgerProvider>,
        config: FacadeConfig,
    ) -> Result<Self, CurrencyError> {
        let handle = Handle::try_current().map_err(|_| CurrencyError::NoRuntime)?;
        Ok(Self::with_handle(&handle, provider, config))
    }

    /// Create a facade whose worker runs on the given runtime
    pub fn with_handle(
        handle: &Handle,
        provider: Arc<dyn LedgerProvider>,
        config: FacadeConfig,
    ) -> Self {
        let cache = BalanceCache::new();
        let (commands, receiver) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(0usize);
        let pending = Arc::new(pending);

        let worker = FacadeWorker::new(
            provider,
            cache.clone(),
            config.clone(),
            commands.downgrade(),
            Arc::clone(&pending),
        );
        let worker = handle.spawn(worker.run(receiver));

        Self {
            session: OnceLock::new(),
            init_lock: Mutex::new(()),
            cache,
            commands,
            pending,
            worker,
            config,
        }
    }

    /// Initialize the session and start the first reconciliation
    ///
    /// Only the first call has any effect; later calls are ignored whatever
    /// their arguments. An empty `user_id` lets the ledger provider pick its
    /// default user.
    ///
    /// Provider initialization failures are not returned here. They show up as
    /// an `UpdateFailed` notification from the initial reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidArgument` if `publisher_id` is empty and
    /// the facade is not initialized yet.
    pub fn initialize(&self, publisher_id: &str, user_id: &str) -> Result<(), CurrencyError> {
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_initialized() {
            tracing::debug!(publisher_id, "Currency facade already initialized, ignoring");
            return Ok(());
        }

        let session = Session::new(publisher_id, user_id)?;

        tracing::info!(publisher_id, "Initializing currency facade");
        // Queued before the session is published, so no operation can overtake it
        self.enqueue(Command::Initialize(session.clone()))?;
        // Only ever set here, under `init_lock`
        let _ = self.session.set(session);
        Ok(())
    }

    /// Whether `initialize` has been called successfully
    pub fn is_initialized(&self) -> bool {
        self.session.get().is_some()
    }

    /// Session the facade was initialized with
    pub fn session(&self) -> Option<&Session> {
        self.session.get()
    }

    /// Configuration the facade was built with
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Cached balance for `currency`
    ///
    /// Returns 0 when the currency is unknown, the identifier is empty, or the
    /// facade is not initialized. Never blocks and never fails.
    pub fn get_balance(&self, currency: &str) -> Amount {
        if !self.is_initialized() {
            warn_uninitialized("get_balance");
            return 0;
        }
        self.cache.get(currency)
    }

    /// Cached balance for `currency`, reporting why a balance is unavailable
    ///
    /// # Errors
    ///
    /// - `CurrencyError::InvalidArgument` for an empty currency identifier
    /// - `CurrencyError::UninitializedSession` before `initialize`
    pub fn try_balance(&self, currency: &str) -> Result<Amount, CurrencyError> {
        let currency = CurrencyId::new(currency)?;
        if !self.is_initialized() {
            return Err(CurrencyError::UninitializedSession);
        }
        Ok(self.cache.get(currency.as_str()))
    }

    /// Copy of every cached balance (empty before `initialize`)
    pub fn balances(&self) -> BalanceSnapshot {
        if !self.is_initialized() {
            return BalanceSnapshot::new();
        }
        self.cache.snapshot()
    }

    /// Optimistically add `amount` to `currency`, then reconcile
    ///
    /// No sign check is made: a negative amount lowers the balance.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidArgument` for an empty currency identifier.
    pub fn increase_balance(&self, currency: &str, amount: Amount) -> Result<(), CurrencyError> {
        self.adjust("increase_balance", currency, Adjustment::Increase(amount))
    }

    /// Optimistically subtract `amount` from `currency`, then reconcile
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidArgument` for an empty currency identifier.
    pub fn decrease_balance(&self, currency: &str, amount: Amount) -> Result<(), CurrencyError> {
        self.adjust("decrease_balance", currency, Adjustment::Decrease(amount))
    }

    /// Request authoritative balances from the ledger provider
    ///
    /// The observer receives exactly one notification for this request once it
    /// has run. No-op before `initialize`.
    pub fn reconcile(&self) -> Result<(), CurrencyError> {
        if !self.is_initialized() {
            warn_uninitialized("reconcile");
            return Ok(());
        }
        self.enqueue(Command::Reconcile)
    }

    /// React to a host lifecycle signal
    ///
    /// Every phase reconciles, except `Destroy` when
    /// `FacadeConfig::reconcile_on_teardown` is off. Does nothing before
    /// `initialize`, not even a notification.
    pub fn on_lifecycle_event(&self, event: LifecycleEvent) -> Result<(), CurrencyError> {
        if !self.is_initialized() {
            tracing::debug!(?event, "Lifecycle event before initialization, ignoring");
            return Ok(());
        }

        if event == LifecycleEvent::Destroy && !self.config.reconcile_on_teardown {
            tracing::debug!("Teardown reconciliation disabled, skipping");
            return Ok(());
        }

        tracing::debug!(?event, "Lifecycle event, reconciling balances");
        self.reconcile()
    }

    /// Register the observer for update outcomes, replacing any previous one
    ///
    /// Only a weak reference is kept; the caller owns the observer's lifetime.
    pub fn set_observer<O>(&self, observer: &Arc<O>) -> Result<(), CurrencyError>
    where
        O: UpdateObserver + 'static,
    {
        let observer = Arc::downgrade(observer);
        let observer: Weak<dyn UpdateObserver> = observer;
        self.enqueue(Command::SetObserver(observer))
    }

    /// Remove the registered observer
    pub fn clear_observer(&self) -> Result<(), CurrencyError> {
        self.enqueue(Command::ClearObserver)
    }

    /// Wait until every operation issued before this call has been applied
    ///
    /// Reconciliations scheduled by those operations may still be queued; use
    /// [`CurrencyFacade::settle`] to wait for them as well.
    pub async fn flush(&self) -> Result<(), CurrencyError> {
        let (done, finished) = oneshot::channel();
        self.enqueue(Command::Flush(done))?;
        finished.await.map_err(|_| CurrencyError::FacadeClosed)
    }

    /// Wait until the queue is idle, follow-up reconciliations included
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::FacadeClosed` if the worker stopped before the
    /// queue drained.
    pub async fn settle(&self) -> Result<(), CurrencyError> {
        let mut pending = self.pending.subscribe();

        tokio::select! {
            idle = pending.wait_for(|pending| *pending == 0) => {
                idle.map(|_| ()).map_err(|_| CurrencyError::FacadeClosed)
            }
            _ = self.commands.closed() => {
                if *self.pending.borrow() == 0 {
                    Ok(())
                } else {
                    Err(CurrencyError::FacadeClosed)
                }
            }
        }
    }

    /// Stop accepting operations and wait for queued work to finish
    ///
    /// Everything already enqueued, including follow-up reconciliations, runs
    /// to completion and notifies the observer before this returns.
    pub async fn shutdown(self) {
        let Self {
            commands, worker, ..
        } = self;
        drop(commands);

        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Currency facade worker terminated abnormally");
        }
    }

    fn adjust(
        &self,
        operation: &'static str,
        currency: &str,
        adjustment: Adjustment,
    ) -> Result<(), CurrencyError> {
        let currency = CurrencyId::new(currency)?;
        if !self.is_initialized() {
            warn_uninitialized(operation);
            return Ok(());
        }
        self.enqueue(Command::Adjust {
            currency,
            adjustment,
        })
    }

    fn enqueue(&self, command: Command) -> Result<(), CurrencyError> {
        self.pending.send_modify(|pending| *pending += 1);

        if self.commands.send(command).is_err() {
            self.pending
                .send_modify(|pending| *pending = pending.saturating_sub(1));
            tracing::error!("Currency facade worker is gone, dropping operation");
            return Err(CurrencyError::FacadeClosed);
        }
        Ok(())
    }
}

fn warn_uninitialized(operation: &'static str) {
    tracing::warn!(
        operation,
        "{}",
        CurrencyError::UninitializedSession
    );
}
