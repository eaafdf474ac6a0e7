//! Observer registration and delivery
//!
//! The facade holds its observer weakly: registering an observer never extends
//! its lifetime, and an observer dropped by its owner is silently skipped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

use super::traits::UpdateObserver;
use crate::types::UpdateEvent;

/// Holder for the single registered observer
#[derive(Default)]
pub(crate) struct ObserverSlot {
    observer: Option<Weak<dyn UpdateObserver>>,
}

impl ObserverSlot {
    pub(crate) fn set(&mut self, observer: Weak<dyn UpdateObserver>) {
        self.observer = Some(observer);
    }

    pub(crate) fn clear(&mut self) {
        self.observer = None;
    }

    /// Deliver `success` to the observer if one is registered and alive
    ///
    /// Returns whether the event was delivered. A panicking observer counts
    /// as delivered; the panic is logged and does not reach the worker.
    pub(crate) fn notify(&self, success: bool) -> bool {
        let event = UpdateEvent::from_success(success);
        match self.observer.as_ref().and_then(Weak::upgrade) {
            Some(observer) => {
                if panic::catch_unwind(AssertUnwindSafe(|| observer.on_update(event))).is_err() {
                    tracing::error!(%event, "Update observer panicked while handling event");
                }
                true
            }
            None => {
                tracing::debug!(%event, "No live observer registered, dropping update event");
                false
            }
        }
    }
}

/// Observer that forwards every update event into a tokio channel
///
/// Useful when the consumer wants to `await` outcomes instead of reacting in a
/// callback. Keep the returned `Arc` alive for as long as events are wanted;
/// the facade only holds it weakly.
///
/// ```no_run
/// use currency_facade::core::ChannelObserver;
///
/// let (observer, mut events) = ChannelObserver::new();
/// // facade.set_observer(&observer);
/// # drop(observer);
/// # let _ = events.try_recv();
/// ```
#[derive(Debug)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<UpdateEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiver its events arrive on
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<UpdateEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl UpdateObserver for ChannelObserver {
    fn on_update(&self, event: UpdateEvent) {
        // The receiver going away just means nobody is listening anymore
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_drops_events() {
        let slot = ObserverSlot::default();
        assert!(!slot.notify(true));
    }

    #[test]
    fn test_notify_delivers_to_live_observer() {
        let (observer, mut events) = ChannelObserver::new();
        let as_dyn: Arc<dyn UpdateObserver> = observer.clone();

        let mut slot = ObserverSlot::default();
        slot.set(Arc::downgrade(&as_dyn));

        assert!(slot.notify(true));
        assert!(slot.notify(false));
        assert_eq!(events.try_recv().unwrap(), UpdateEvent::UpdateSucceeded);
        assert_eq!(events.try_recv().unwrap(), UpdateEvent::UpdateFailed);
    }

    #[test]
    fn test_slot_does_not_keep_observer_alive() {
        let (observer, _events) = ChannelObserver::new();
        let as_dyn: Arc<dyn UpdateObserver> = observer;

        let mut slot = ObserverSlot::default();
        slot.set(Arc::downgrade(&as_dyn));
        drop(as_dyn);

        assert!(!slot.notify(true));
    }

    #[test]
    fn test_clear_removes_observer() {
        let (observer, mut events) = ChannelObserver::new();
        let as_dyn: Arc<dyn UpdateObserver> = observer.clone();

        let mut slot = ObserverSlot::default();
        slot.set(Arc::downgrade(&as_dyn));
        slot.clear();

        assert!(!slot.notify(true));
        assert!(events.try_recv().is_err());
    }

    struct PanickingObserver;

    impl UpdateObserver for PanickingObserver {
        fn on_update(&self, _event: UpdateEvent) {
            panic!("host callback failed");
        }
    }

    #[test]
    fn test_panicking_observer_is_contained() {
        let observer: Arc<dyn UpdateObserver> = Arc::new(PanickingObserver);

        let mut slot = ObserverSlot::default();
        slot.set(Arc::downgrade(&observer));

        assert!(slot.notify(true));
        assert!(slot.notify(false));
    }
}
