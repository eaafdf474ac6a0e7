//! Configuration for the currency facade
//!
//! Configuration is optional; every field has a default matching the facade's
//! standard behavior. Files are TOML:
//!
//! ```toml
//! reconcile_on_teardown = false
//! reconcile_after_mutation = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::CurrencyError;

/// Tunable behavior of a [`crate::core::CurrencyFacade`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacadeConfig {
    /// Reconcile with the ledger when the host signals teardown
    ///
    /// Pause and resume always reconcile; teardown does too unless this is off.
    pub reconcile_on_teardown: bool,

    /// Schedule a reconciliation after every increase/decrease
    pub reconcile_after_mutation: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            reconcile_on_teardown: true,
            reconcile_after_mutation: true,
        }
    }
}

impl FacadeConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, CurrencyError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, CurrencyError> {
        let contents = fs::read_to_string(path).map_err(|e| CurrencyError::Config {
            message: format!("Failed to read '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_reconcile_everywhere() {
        let config = FacadeConfig::default();
        assert!(config.reconcile_on_teardown);
        assert!(config.reconcile_after_mutation);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FacadeConfig::from_toml_str("").unwrap();
        assert_eq!(config, FacadeConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = FacadeConfig::from_toml_str("reconcile_on_teardown = false").unwrap();
        assert!(!config.reconcile_on_teardown);
        assert!(config.reconcile_after_mutation);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = FacadeConfig::from_toml_str("reconcile_every = 5");
        assert!(matches!(result, Err(CurrencyError::Config { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"reconcile_after_mutation = false\n")
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");

        let config = FacadeConfig::load(file.path()).unwrap();
        assert!(!config.reconcile_after_mutation);
    }

    #[test]
    fn test_load_missing_file() {
        let result = FacadeConfig::load(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(CurrencyError::Config { .. })));
    }
}
