// Motor telemetry events reported by the droid and the handler registry
//
// Handlers are dispatched from a snapshot of the registry, so a handler may
// subscribe or unsubscribe (itself included) while an event is in flight.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Telemetry events, with the codes the droid reports them under
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorEvent {
    MotorStarted = 2,
    MotorMovingRight = 3,
    MotorMovingLeft = 4,
    MotorStopped = 130,
    MotorHitLeftLimit = 131,
    MotorHitRightLimit = 132,
}

impl TryFrom<u8> for MotorEvent {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            2 => Ok(Self::MotorStarted),
            3 => Ok(Self::MotorMovingRight),
            4 => Ok(Self::MotorMovingLeft),
            130 => Ok(Self::MotorStopped),
            131 => Ok(Self::MotorHitLeftLimit),
            132 => Ok(Self::MotorHitRightLimit),
            other => Err(ValidationError::UnknownEvent(other)),
        }
    }
}

/// Shared handle to a registered handler. Identity is the allocation, so keep
/// the handle around to unsubscribe later.
pub type MotorEventHandler = Arc<dyn Fn(MotorEvent) + Send + Sync>;

/// Ordered registry of motor event handlers
#[derive(Clone, Default)]
pub struct MotorEvents {
    handlers: Arc<Mutex<Vec<MotorEventHandler>>>,
}

impl MotorEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Returns false if it was already registered.
    pub fn subscribe(&self, handler: &MotorEventHandler) -> bool {
        let mut handlers = self.handlers.lock();
        if handlers.iter().any(|h| Arc::ptr_eq(h, handler)) {
            return false;
        }
        handlers.push(Arc::clone(handler));
        true
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, handler: &MotorEventHandler) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Invoke every handler registered at call time, in registration order
    pub fn dispatch(&self, event: MotorEvent) {
        // Lock is released before any handler runs
        let snapshot: Vec<MotorEventHandler> = self.handlers.lock().clone();
        for handler in snapshot {
            handler(event);
        }
    }
}

impl std::fmt::Debug for MotorEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorEvents")
            .field("handlers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Arc<Mutex<Vec<(usize, MotorEvent)>>>, tag: usize) -> MotorEventHandler {
        let log = Arc::clone(log);
        Arc::new(move |event: MotorEvent| log.lock().push((tag, event)))
    }

    #[test]
    fn test_event_codes() {
        assert_eq!(MotorEvent::try_from(2u8), Ok(MotorEvent::MotorStarted));
        assert_eq!(MotorEvent::try_from(132u8), Ok(MotorEvent::MotorHitRightLimit));
        assert_eq!(
            MotorEvent::try_from(5u8),
            Err(ValidationError::UnknownEvent(5))
        );
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let events = MotorEvents::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log, 0);

        assert!(events.subscribe(&handler));
        assert!(!events.subscribe(&handler));
        assert_eq!(events.len(), 1);

        events.dispatch(MotorEvent::MotorStarted);
        assert_eq!(*log.lock(), vec![(0, MotorEvent::MotorStarted)]);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let events = MotorEvents::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let registered = recorder(&log, 0);
        let stranger = recorder(&log, 1);

        events.subscribe(&registered);
        assert!(!events.unsubscribe(&stranger));
        assert_eq!(events.len(), 1);

        assert!(events.unsubscribe(&registered));
        assert!(events.is_empty());
        events.dispatch(MotorEvent::MotorStopped);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let events = MotorEvents::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handlers: Vec<_> = (0..3).map(|tag| recorder(&log, tag)).collect();
        for handler in &handlers {
            events.subscribe(handler);
        }

        events.dispatch(MotorEvent::MotorHitLeftLimit);
        let tags: Vec<usize> = log.lock().iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, vec![0, 1, 2]);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_dispatch() {
        let events = MotorEvents::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let late = recorder(&log, 1);

        // First handler removes itself and adds another while dispatch is running
        let slot: Arc<Mutex<Option<MotorEventHandler>>> = Arc::new(Mutex::new(None));
        let self_removing: MotorEventHandler = {
            let events = events.clone();
            let slot = Arc::clone(&slot);
            let late = Arc::clone(&late);
            let log = Arc::clone(&log);
            Arc::new(move |event: MotorEvent| {
                log.lock().push((0, event));
                if let Some(me) = slot.lock().take() {
                    events.unsubscribe(&me);
                }
                events.subscribe(&late);
            })
        };
        *slot.lock() = Some(Arc::clone(&self_removing));
        events.subscribe(&self_removing);

        events.dispatch(MotorEvent::MotorMovingLeft);
        // The snapshot held only the first handler
        assert_eq!(*log.lock(), vec![(0, MotorEvent::MotorMovingLeft)]);
        assert_eq!(events.len(), 1);

        events.dispatch(MotorEvent::MotorMovingRight);
        assert_eq!(log.lock().last(), Some(&(1, MotorEvent::MotorMovingRight)));
    }
}
