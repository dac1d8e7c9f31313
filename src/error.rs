use std::fmt;

use thiserror::Error as ThisError;

use crate::metadata::EntityType;

/// Errors that can occur while running a request through the pipeline.
///
/// Not-found outcomes are not errors: they are recorded on the
/// [`Response`](crate::web::Response) and the chain is short-circuited.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Entity metadata or converter registry is incomplete for a load-directed parameter.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),
    /// Begin, commit or rollback failed.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
    /// The backing store failed while loading or persisting an entity.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// The handler (or a later stage) reported a failure.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),
    /// Pipeline configuration could not be read.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// A mapping defect: the entity metadata cannot support loading by id.
///
/// These are programming errors, never retried and never turned into a
/// not-found response.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{kind} on {entity_type}: {message}")]
pub struct MappingError {
    /// The kind of mapping defect
    pub kind: MappingErrorKind,
    /// Entity type the defect was found on
    pub entity_type: EntityType,
    /// Human-readable message
    pub message: String,
}

impl MappingError {
    /// Creates a new mapping error.
    pub fn new(kind: MappingErrorKind, entity_type: EntityType, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity_type,
            message: message.into(),
        }
    }
}

/// The kind of mapping defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingErrorKind {
    /// The entity type has no identifier type at all
    MissingIdentifierType,
    /// No identifier attribute is declared where the lookup looked for one
    MissingDeclaredIdentifier,
    /// No converter is registered for the identifier's declared type
    MissingConverter,
    /// A load-directed parameter does not have an entity type
    NotAnEntity,
}

impl fmt::Display for MappingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingErrorKind::MissingIdentifierType => write!(f, "missing identifier type"),
            MappingErrorKind::MissingDeclaredIdentifier => {
                write!(f, "missing declared identifier")
            }
            MappingErrorKind::MissingConverter => write!(f, "missing converter"),
            MappingErrorKind::NotAnEntity => write!(f, "not an entity"),
        }
    }
}

/// A failure reported by a [`Transaction`](crate::store::Transaction).
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{kind} failed: {message}")]
pub struct TransactionError {
    /// Which transition failed
    pub kind: TransactionErrorKind,
    /// Human-readable message
    pub message: String,
}

impl TransactionError {
    /// Creates a new transaction error.
    pub fn new(kind: TransactionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The transaction transition that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionErrorKind {
    /// `begin`
    Begin,
    /// `commit`
    Commit,
    /// `rollback`
    Rollback,
}

impl fmt::Display for TransactionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionErrorKind::Begin => write!(f, "begin"),
            TransactionErrorKind::Commit => write!(f, "commit"),
            TransactionErrorKind::Rollback => write!(f, "rollback"),
        }
    }
}

/// A failure reported by an [`EntityStore`](crate::store::EntityStore).
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct StorageError {
    /// Human-readable message
    pub message: String,
}

impl StorageError {
    /// Creates a new storage error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A failure raised by a request handler.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable message
    pub message: String,
}

impl HandlerError {
    /// Creates a new handler error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
