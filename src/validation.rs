//! Request-scoped validation state.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A single validation failure recorded by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    /// Field or rule the failure belongs to (e.g. `order.quantity`)
    pub category: String,
    /// Human-readable message
    pub message: String,
}

impl ValidationMessage {
    /// Creates a validation message.
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Accumulates validation failures for one request.
///
/// Clones share the same list, so the transaction boundary and its
/// redirect hook observe what the handler recorded.
///
/// # Examples
///
/// ```
/// use request_unit::validation::{ValidationMessage, Validator};
///
/// let validator = Validator::new();
/// let seen_by_boundary = validator.clone();
///
/// validator.add(ValidationMessage::new("order.quantity", "must be positive"));
///
/// assert!(seen_by_boundary.has_errors());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    errors: Arc<Mutex<Vec<ValidationMessage>>>,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    pub fn add(&self, message: ValidationMessage) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Records a failure when `condition` is false.
    pub fn check(&self, condition: bool, message: ValidationMessage) {
        if !condition {
            self.add(message);
        }
    }

    /// Returns true if any failure was recorded.
    pub fn has_errors(&self) -> bool {
        !self
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Returns a snapshot of recorded failures.
    pub fn errors(&self) -> Vec<ValidationMessage> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
