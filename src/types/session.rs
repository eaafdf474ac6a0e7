//! Session identity for the currency facade

use super::error::CurrencyError;

/// Publisher and user identity a facade was initialized with
///
/// A session is created once per facade and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Publisher identifier for the app (never empty)
    pub publisher_id: String,

    /// User identifier, or `None` to let the ledger provider pick its default
    pub user_id: Option<String>,
}

impl Session {
    /// Build a session from the raw identifiers passed to `initialize`
    ///
    /// An empty `user_id` maps to `None`, meaning "use the provider default".
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidArgument` if `publisher_id` is empty.
    pub fn new(publisher_id: &str, user_id: &str) -> Result<Self, CurrencyError> {
        if publisher_id.trim().is_empty() {
            return Err(CurrencyError::invalid_argument(
                "publisher_id",
                "publisher identifier must not be empty",
            ));
        }

        let user_id = if user_id.is_empty() {
            None
        } else {
            Some(user_id.to_string())
        };

        Ok(Self {
            publisher_id: publisher_id.to_string(),
            user_id,
        })
    }
}
