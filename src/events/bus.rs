//! Event publication through tracing and registered subscribers.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::TransactionEvent;

/// Receives lifecycle notifications.
///
/// Notification is fire-and-forget: sinks cannot fail the transaction.
pub trait EventSink: Send + Sync {
    /// Delivers `event`.
    fn notify(&self, event: &TransactionEvent);
}

/// A subscriber callback registered on an [`EventBus`].
pub type Subscriber = Arc<dyn Fn(&TransactionEvent) + Send + Sync>;

/// Process-wide lifecycle publisher.
///
/// Every event is emitted as a structured `tracing` event under the
/// `tx_lifecycle` target and then handed to each subscriber in
/// subscription order.
///
/// # Example
///
/// ```
/// use request_unit::events::{EventBus, EventSink, EventTrail, TransactionEvent, TransactionEventKind};
/// use std::sync::Arc;
///
/// let bus = EventBus::new();
/// let trail = Arc::new(EventTrail::new());
/// bus.subscribe_trail(trail.clone());
///
/// bus.notify(&TransactionEvent::new("req-1", TransactionEventKind::AfterCommit));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber callback.
    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&TransactionEvent) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(subscriber));
    }

    /// Registers an [`EventTrail`](super::EventTrail) as a subscriber.
    pub fn subscribe_trail(&self, trail: Arc<super::EventTrail>) {
        self.subscribe(move |event| trail.record(event.clone()));
    }

    /// Returns the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl EventSink for EventBus {
    fn notify(&self, event: &TransactionEvent) {
        tracing::info!(
            target: "tx_lifecycle",
            request_id = %event.request_id(),
            kind = %event.kind(),
            "transaction event"
        );

        // Snapshot so a subscriber may subscribe further callbacks.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in subscribers {
            subscriber(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
