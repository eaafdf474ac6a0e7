//! Currency-related types for the currency facade
//!
//! This module defines the currency identifier, the integer amount type and the
//! snapshot of authoritative balances returned by a ledger provider.

use super::error::CurrencyError;
use std::collections::HashMap;
use std::fmt;

/// Balance and delta type
///
/// Balances are plain signed integers. Negative balances are not prevented by
/// the facade; the ledger provider is the source of truth.
pub type Amount = i64;

/// Authoritative balances keyed by currency name
pub type BalanceSnapshot = HashMap<String, Amount>;

/// Machine-readable currency name
///
/// Identifiers are case-sensitive and must be non-empty. Construction through
/// [`CurrencyId::new`] is the only way to obtain one, so every `CurrencyId`
/// reaching the cache has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Validate and wrap a currency name
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidArgument` if the name is empty or
    /// consists only of whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, CurrencyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CurrencyError::invalid_argument(
                "currency",
                "currency identifier must not be empty",
            ));
        }
        Ok(Self(name))
    }

    /// Borrow the currency name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the owned name
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CurrencyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyId {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CurrencyId {
    type Error = CurrencyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyId> for String {
    fn from(value: CurrencyId) -> Self {
        value.0
    }
}
