//! Error types for the currency facade
//!
//! This module defines all error types that can occur around the facade.
//! Most of them never reach the caller of a mutating operation: provider
//! failures are converted into `UpdateFailed` notifications and uninitialized
//! use is logged and ignored.
//!
//! # Error Categories
//!
//! - **Session Errors**: operations issued before `initialize`
//! - **Argument Errors**: empty currency or publisher identifiers
//! - **Provider Errors**: the ledger provider failed or is unreachable
//! - **Runtime Errors**: no tokio runtime, worker already stopped
//! - **Script/Config Errors**: I/O, CSV and TOML problems in the CLI runner

use thiserror::Error;

/// Main error type for the currency facade
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurrencyError {
    /// An operation was issued before the session was initialized
    ///
    /// Mutating operations treat this as a logged no-op; only strict reads
    /// such as `try_balance` return it.
    #[error("Currency session has not been initialized; call initialize(publisher_id, user_id) first")]
    UninitializedSession,

    /// The ledger provider failed to produce authoritative balances
    ///
    /// Converted into an `UpdateFailed` notification at the facade boundary.
    #[error("Balance reconciliation failed: {message}")]
    ReconciliationFailed {
        /// Description of the provider failure
        message: String,
    },

    /// The ledger provider cannot be reached at all
    #[error("Ledger provider unavailable: {message}")]
    ProviderUnavailable {
        /// Description of why the provider is unavailable
        message: String,
    },

    /// An argument was rejected at the API boundary
    #[error("Invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// The facade worker has stopped and no longer accepts operations
    #[error("Currency facade has been shut down")]
    FacadeClosed,

    /// The facade was constructed outside of a tokio runtime
    #[error("No tokio runtime available to host the currency facade")]
    NoRuntime,

    /// I/O error while reading scripts, seeds or configuration
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// Malformed script or seed row
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Invalid configuration file
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl From<std::io::Error> for CurrencyError {
    fn from(error: std::io::Error) -> Self {
        CurrencyError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CurrencyError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        CurrencyError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for CurrencyError {
    fn from(error: toml::de::Error) -> Self {
        CurrencyError::Config {
            message: error.to_string(),
        }
    }
}

impl CurrencyError {
    /// Create an InvalidArgument error
    pub fn invalid_argument(field: &str, reason: &str) -> Self {
        CurrencyError::InvalidArgument {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a ReconciliationFailed error
    pub fn reconciliation_failed(message: impl Into<String>) -> Self {
        CurrencyError::ReconciliationFailed {
            message: message.into(),
        }
    }

    /// Create a ProviderUnavailable error
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        CurrencyError::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Create a Parse error
    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        CurrencyError::Parse {
            line,
            message: message.into(),
        }
    }
}
