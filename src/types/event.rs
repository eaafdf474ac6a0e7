//! Events flowing into and out of the currency facade
//!
//! - [`UpdateEvent`] is the outcome of a reconciliation, delivered to the observer.
//! - [`LifecycleEvent`] is a host lifecycle signal that may trigger a reconciliation.

use std::fmt;

/// Outcome of a balance update from the ledger provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Authoritative balances were fetched and merged into the cache
    UpdateSucceeded,

    /// The ledger provider could not be reached or reported an error
    ///
    /// The cache is left exactly as it was before the attempt.
    UpdateFailed,
}

impl UpdateEvent {
    /// Map a boolean outcome to its event
    pub fn from_success(success: bool) -> Self {
        if success {
            UpdateEvent::UpdateSucceeded
        } else {
            UpdateEvent::UpdateFailed
        }
    }

    /// Whether this event reports a successful update
    pub fn is_success(self) -> bool {
        matches!(self, UpdateEvent::UpdateSucceeded)
    }

    /// Event name as delivered to hosts
    pub fn name(self) -> &'static str {
        match self {
            UpdateEvent::UpdateSucceeded => "UpdateSucceeded",
            UpdateEvent::UpdateFailed => "UpdateFailed",
        }
    }
}

impl fmt::Display for UpdateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host lifecycle phase
///
/// All three phases trigger a reconciliation unless teardown reconciliation is
/// disabled in [`crate::config::FacadeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host is being suspended
    Pause,

    /// The host is coming back to the foreground
    Resume,

    /// The host is being torn down
    Destroy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::success(true, UpdateEvent::UpdateSucceeded, "UpdateSucceeded")]
    #[case::failure(false, UpdateEvent::UpdateFailed, "UpdateFailed")]
    fn test_event_from_outcome(
        #[case] success: bool,
        #[case] expected: UpdateEvent,
        #[case] name: &str,
    ) {
        let event = UpdateEvent::from_success(success);
        assert_eq!(event, expected);
        assert_eq!(event.is_success(), success);
        assert_eq!(event.to_string(), name);
    }
}
