//! In-memory lifecycle event recorder.

use std::sync::{Mutex, PoisonError};

use super::{EventSink, TransactionEvent, TransactionEventKind};

/// In-memory recorder for lifecycle events.
///
/// Usable directly as an [`EventSink`] or as a subscriber of an
/// [`EventBus`](super::EventBus).
///
/// # Example
///
/// ```
/// use request_unit::events::{EventSink, EventTrail, TransactionEvent, TransactionEventKind};
///
/// let trail = EventTrail::new();
/// trail.notify(&TransactionEvent::new("req-1", TransactionEventKind::AfterRollback));
///
/// assert_eq!(trail.count(TransactionEventKind::AfterRollback), 1);
/// ```
#[derive(Debug, Default)]
pub struct EventTrail {
    events: Mutex<Vec<TransactionEvent>>,
}

impl EventTrail {
    /// Creates a new empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event.
    pub fn record(&self, event: TransactionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<TransactionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded kinds in order.
    pub fn kinds(&self) -> Vec<TransactionEventKind> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(TransactionEvent::kind)
            .collect()
    }

    /// Returns how many events of `kind` were recorded.
    pub fn count(&self, kind: TransactionEventKind) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for EventTrail {
    fn notify(&self, event: &TransactionEvent) {
        self.record(event.clone());
    }
}
