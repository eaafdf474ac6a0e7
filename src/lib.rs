//! Currency Facade Library
//! # Overview
//!
//! This library provides a client-side facade over a virtual currency ledger:
//! a local cache of named integer balances, optimistic updates, asynchronous
//! reconciliation with the authoritative ledger, and a success/failure
//! notification per reconciliation.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (CurrencyId, Session, UpdateEvent, etc.)
//! - [`config`] - Facade settings loaded from TOML
//! - [`core`] - Business logic components:
//!   - [`core::facade`] - Public facade handle and its command queue
//!   - [`core::balance_cache`] - Concurrent balance cache
//!   - [`core::observer`] - Update observer plumbing
//!   - [`core::traits`] - Ledger provider and observer seams
//! - [`ledger`] - In-memory ledger provider
//! - [`io`] - CSV scripts, seed files and balance output
//! - [`runner`] - Script replay used by the CLI
//! - [`cli`] - CLI arguments parsing
//!
//! # Operations
//!
//! - **initialize**: Bind the facade to a publisher/user, once
//! - **get_balance**: Read a cached balance, 0 when unknown
//! - **increase/decrease**: Apply an optimistic change, forward it, reconcile
//! - **reconcile**: Replace cached balances with the ledger's
//! - **lifecycle events**: Reconcile on pause, resume and teardown
//!
//! # Guarantees
//!
//! Operations take effect in the order they are issued. Every reconciliation
//! produces exactly one notification, delivered to the current observer.
//! Reconciliation never removes a cached currency the ledger did not report.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod ledger;
pub mod runner;
pub mod types;

pub use config::FacadeConfig;
pub use core::{BalanceCache, ChannelObserver, CurrencyFacade, LedgerProvider, UpdateObserver};
pub use io::write_balances_csv;
pub use ledger::InMemoryLedger;
pub use runner::{RunOptions, RunSummary, ScriptRunner};
pub use types::{
    Amount, BalanceSnapshot, CurrencyError, CurrencyId, LifecycleEvent, ScriptStep, Session,
    UpdateEvent,
};
