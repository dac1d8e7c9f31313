//! Lifecycle event schema.

use std::fmt;

/// Kind of transaction lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionEventKind {
    /// An active transaction reached the commit decision
    BeforeCommit,
    /// The transaction committed
    AfterCommit,
    /// The transaction was rolled back
    AfterRollback,
}

impl fmt::Display for TransactionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionEventKind::BeforeCommit => write!(f, "before_commit"),
            TransactionEventKind::AfterCommit => write!(f, "after_commit"),
            TransactionEventKind::AfterRollback => write!(f, "after_rollback"),
        }
    }
}

/// A lifecycle event tied to the request that produced it.
///
/// # Example
///
/// ```
/// use request_unit::events::{TransactionEvent, TransactionEventKind};
///
/// let event = TransactionEvent::new("req-7", TransactionEventKind::AfterCommit);
///
/// assert_eq!(event.request_id(), "req-7");
/// assert_eq!(event.to_string(), "TransactionEvent[kind=after_commit, request_id=req-7]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    request_id: String,
    kind: TransactionEventKind,
}

impl TransactionEvent {
    /// Creates a new event.
    pub fn new(request_id: impl Into<String>, kind: TransactionEventKind) -> Self {
        Self {
            request_id: request_id.into(),
            kind,
        }
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the event kind.
    pub fn kind(&self) -> TransactionEventKind {
        self.kind
    }
}

impl fmt::Display for TransactionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransactionEvent[kind={}, request_id={}]",
            self.kind, self.request_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(TransactionEventKind::BeforeCommit.to_string(), "before_commit");
        assert_eq!(TransactionEventKind::AfterRollback.to_string(), "after_rollback");
    }

    #[test]
    fn event_accessors() {
        let event = TransactionEvent::new("req-1", TransactionEventKind::BeforeCommit);
        assert_eq!(event.request_id(), "req-1");
        assert_eq!(event.kind(), TransactionEventKind::BeforeCommit);
    }
}
