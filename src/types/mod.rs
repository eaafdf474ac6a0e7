//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `currency`: Currency identifiers, amounts and balance snapshots
//! - `session`: Publisher/user identity of an initialized facade
//! - `event`: Update outcomes and host lifecycle signals
//! - `script`: Steps replayed by the CLI runner
//! - `error`: Error types for the currency facade

pub mod currency;
pub mod error;
pub mod event;
pub mod script;
pub mod session;

pub use currency::{Amount, BalanceSnapshot, CurrencyId};
pub use error::CurrencyError;
pub use event::{LifecycleEvent, UpdateEvent};
pub use script::ScriptStep;
pub use session::Session;
