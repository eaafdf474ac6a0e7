//! Ledger provider implementations
//!
//! Real deployments plug their own [`crate::core::LedgerProvider`] in front of
//! whatever service owns the ledger. This module ships the in-memory provider
//! used by the CLI runner, the tests and the benches.

pub mod memory;

pub use memory::InMemoryLedger;
