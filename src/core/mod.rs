//! Core business logic module
//!
//! This module contains the currency facade components:
//! - `traits` - Seams for the ledger provider and update observers
//! - `balance_cache` - Concurrent-read, single-writer balance cache
//! - `actor` - The worker task that serializes every mutation
//! - `facade` - The public `CurrencyFacade` handle
//! - `observer` - Observer registration and the channel-backed observer

mod actor;
pub mod balance_cache;
pub mod facade;
pub mod observer;
pub mod traits;

pub use balance_cache::BalanceCache;
pub use facade::CurrencyFacade;
pub use observer::ChannelObserver;
pub use traits::{LedgerProvider, UpdateObserver};
