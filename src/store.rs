//! Persistence collaborators: transactions, units of work and entity lookup.

use std::fmt;
use std::sync::Arc;

use crate::entity::{EntityHandle, IdValue};
use crate::error::{Error, StorageError, TransactionError};
use crate::metadata::EntityType;

/// Lifecycle state of a [`Transaction`].
///
/// ```text
/// NotStarted --begin--> Active --commit--> Committed
///                         |
///                         +----rollback--> RolledBack
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// `begin` has not been called
    NotStarted,
    /// Begun, neither committed nor rolled back
    Active,
    /// Committed
    Committed,
    /// Rolled back
    RolledBack,
}

impl TransactionState {
    /// Returns true for [`TransactionState::Active`].
    pub fn is_active(self) -> bool {
        self == TransactionState::Active
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::NotStarted => write!(f, "not-started"),
            TransactionState::Active => write!(f, "active"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::RolledBack => write!(f, "rolled-back"),
        }
    }
}

/// A transaction owned by one [`UnitOfWork`].
///
/// Methods take `&self`: the handle is shared between the transaction
/// boundary and the redirect hook it registers. Commit and rollback on a
/// transaction that is not active must be no-ops.
pub trait Transaction: Send + Sync {
    /// Starts the transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` if the transaction cannot be started.
    fn begin(&self) -> Result<(), TransactionError>;

    /// Commits the transaction if it is active.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` if the commit fails; the transaction stays active.
    fn commit(&self) -> Result<(), TransactionError>;

    /// Rolls the transaction back if it is active.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` if the rollback fails.
    fn rollback(&self) -> Result<(), TransactionError>;

    /// Returns true while the transaction is active.
    fn is_active(&self) -> bool;
}

/// Lookup of persisted entities by identifier.
pub trait EntityStore: Send + Sync {
    /// Finds the entity of `entity_type` with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read. A missing
    /// entity is `Ok(None)`.
    fn find(&self, entity_type: EntityType, id: &IdValue)
        -> Result<Option<EntityHandle>, StorageError>;
}

/// Request-scoped handle coordinating one transaction.
pub trait UnitOfWork: EntityStore {
    /// Returns the transaction of this unit of work.
    ///
    /// Every call returns a handle to the same transaction.
    fn current_transaction(&self) -> Arc<dyn Transaction>;

    /// Stages `entity` to be inserted or replaced.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the unit of work is closed.
    fn persist(&self, entity: EntityHandle) -> Result<(), StorageError>;

    /// Stages the removal of the entity with `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the unit of work is closed.
    fn remove(&self, entity_type: EntityType, id: &IdValue) -> Result<(), StorageError>;

    /// Returns true until [`close`](UnitOfWork::close) is called.
    fn is_open(&self) -> bool;

    /// Releases the unit of work. Closing twice is a no-op.
    fn close(&self);
}

/// Opens one [`UnitOfWork`] per request.
pub trait UnitOfWorkFactory: Send + Sync {
    /// Opens a new unit of work.
    ///
    /// # Errors
    ///
    /// Returns `Error` if the backing store cannot provide one.
    fn open(&self) -> Result<Arc<dyn UnitOfWork>, Error>;
}
