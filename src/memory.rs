//! In-process reference store.
//!
//! `MemoryDatabase` is the storage behind tests and demos. Units of work
//! stage their writes inside the transaction and publish them to the
//! shared rows only on commit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::entity::{Entity, EntityHandle, IdValue};
use crate::error::{Error, StorageError, TransactionError, TransactionErrorKind};
use crate::metadata::EntityType;
use crate::store::{EntityStore, Transaction, TransactionState, UnitOfWork, UnitOfWorkFactory};

type Key = (EntityType, IdValue);
type Rows = RwLock<HashMap<Key, EntityHandle>>;

#[derive(Debug, Clone)]
enum Write {
    Put(EntityHandle),
    Delete(Key),
}

impl Write {
    fn key(&self) -> Key {
        match self {
            Write::Put(handle) => (handle.entity_type(), handle.id().clone()),
            Write::Delete(key) => key.clone(),
        }
    }
}

/// Shared in-memory entity rows.
///
/// # Examples
///
/// ```
/// use request_unit::entity::{Entity, IdValue};
/// use request_unit::memory::MemoryDatabase;
/// use request_unit::metadata::EntityType;
/// use request_unit::store::{EntityStore, UnitOfWorkFactory};
///
/// struct Note(i64);
///
/// impl Entity for Note {
///     const ENTITY_TYPE: EntityType = EntityType::named("Note");
///     fn id(&self) -> IdValue {
///         IdValue::Long(self.0)
///     }
/// }
///
/// let db = MemoryDatabase::new();
/// db.seed(Note(1));
///
/// let uow = db.open().unwrap();
/// assert!(uow.find(Note::ENTITY_TYPE, &IdValue::Long(1)).unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    rows: Arc<Rows>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entity` directly, outside any transaction.
    pub fn seed<E: Entity>(&self, entity: E) -> EntityHandle {
        let handle = EntityHandle::new(entity);
        self.write_rows()
            .insert((handle.entity_type(), handle.id().clone()), handle.clone());
        handle
    }

    /// Returns the committed row for `id`.
    pub fn get(&self, entity_type: EntityType, id: &IdValue) -> Option<EntityHandle> {
        self.read_rows().get(&(entity_type, id.clone())).cloned()
    }

    /// Returns the number of committed rows.
    pub fn len(&self) -> usize {
        self.read_rows().len()
    }

    /// Returns true if no rows are committed.
    pub fn is_empty(&self) -> bool {
        self.read_rows().is_empty()
    }

    fn read_rows(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Key, EntityHandle>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rows(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Key, EntityHandle>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UnitOfWorkFactory for MemoryDatabase {
    fn open(&self) -> Result<Arc<dyn UnitOfWork>, Error> {
        Ok(Arc::new(MemoryUnitOfWork::new(self.rows.clone())))
    }
}

/// Transaction over a [`MemoryDatabase`].
///
/// Begin while active is an error; commit and rollback outside the
/// active state do nothing.
#[derive(Debug)]
pub struct MemoryTransaction {
    rows: Arc<Rows>,
    state: Mutex<TransactionState>,
    pending: Mutex<Vec<Write>>,
}

impl MemoryTransaction {
    fn new(rows: Arc<Rows>) -> Self {
        Self {
            rows,
            state: Mutex::new(TransactionState::NotStarted),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> TransactionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stage(&self, write: Write) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(write);
    }

    fn staged(&self, key: &Key) -> Option<Option<EntityHandle>> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.iter().rev().find(|w| &w.key() == key).map(|w| match w {
            Write::Put(handle) => Some(handle.clone()),
            Write::Delete(_) => None,
        })
    }

    fn discard(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Transaction for MemoryTransaction {
    fn begin(&self) -> Result<(), TransactionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_active() {
            return Err(TransactionError::new(
                TransactionErrorKind::Begin,
                "transaction already active",
            ));
        }
        *state = TransactionState::Active;
        Ok(())
    }

    fn commit(&self) -> Result<(), TransactionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.is_active() {
            return Ok(());
        }

        let writes: Vec<Write> = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        for write in writes {
            match write {
                Write::Put(handle) => {
                    rows.insert((handle.entity_type(), handle.id().clone()), handle);
                }
                Write::Delete(key) => {
                    rows.remove(&key);
                }
            }
        }

        *state = TransactionState::Committed;
        Ok(())
    }

    fn rollback(&self) -> Result<(), TransactionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.is_active() {
            return Ok(());
        }
        self.discard();
        *state = TransactionState::RolledBack;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state().is_active()
    }
}

/// Unit of work over a [`MemoryDatabase`].
///
/// Reads see the unit's own staged writes. Writes left uncommitted when
/// the unit is closed are dropped.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    rows: Arc<Rows>,
    transaction: Arc<MemoryTransaction>,
    open: AtomicBool,
}

impl MemoryUnitOfWork {
    fn new(rows: Arc<Rows>) -> Self {
        Self {
            transaction: Arc::new(MemoryTransaction::new(rows.clone())),
            rows,
            open: AtomicBool::new(true),
        }
    }

    /// Returns the state of this unit's transaction.
    pub fn transaction_state(&self) -> TransactionState {
        self.transaction.state()
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StorageError::new("unit of work is closed"))
        }
    }
}

impl EntityStore for MemoryUnitOfWork {
    fn find(
        &self,
        entity_type: EntityType,
        id: &IdValue,
    ) -> Result<Option<EntityHandle>, StorageError> {
        self.ensure_open()?;
        let key = (entity_type, id.clone());
        if let Some(staged) = self.transaction.staged(&key) {
            return Ok(staged);
        }
        Ok(self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    fn current_transaction(&self) -> Arc<dyn Transaction> {
        self.transaction.clone()
    }

    fn persist(&self, entity: EntityHandle) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.transaction.stage(Write::Put(entity));
        Ok(())
    }

    fn remove(&self, entity_type: EntityType, id: &IdValue) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.transaction
            .stage(Write::Delete((entity_type, id.clone())));
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.transaction.discard();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: i64,
        label: &'static str,
    }

    impl Entity for Item {
        const ENTITY_TYPE: EntityType = EntityType::named("Item");

        fn id(&self) -> IdValue {
            IdValue::Long(self.id)
        }
    }

    fn label(handle: &EntityHandle) -> &'static str {
        handle.downcast_ref::<Item>().map(|i| i.label).unwrap_or("?")
    }

    #[test]
    fn transaction_state_machine() {
        let tx = MemoryTransaction::new(Arc::new(Rows::default()));
        assert_eq!(tx.state(), TransactionState::NotStarted);

        // not active: no-ops
        tx.commit().unwrap();
        tx.rollback().unwrap();
        assert_eq!(tx.state(), TransactionState::NotStarted);

        tx.begin().unwrap();
        assert!(tx.is_active());
        assert!(tx.begin().is_err());

        tx.commit().unwrap();
        assert_eq!(tx.state(), TransactionState::Committed);

        tx.rollback().unwrap();
        assert_eq!(tx.state(), TransactionState::Committed);
    }

    #[test]
    fn commit_publishes_staged_writes() {
        let db = MemoryDatabase::new();
        let uow = db.open().unwrap();
        let tx = uow.current_transaction();

        tx.begin().unwrap();
        uow.persist(EntityHandle::new(Item { id: 1, label: "one" })).unwrap();
        assert!(db.is_empty());

        tx.commit().unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(
            label(&db.get(Item::ENTITY_TYPE, &IdValue::Long(1)).unwrap()),
            "one"
        );
    }

    #[test]
    fn rollback_discards_staged_writes() {
        let db = MemoryDatabase::new();
        db.seed(Item { id: 1, label: "kept" });
        let uow = db.open().unwrap();
        let tx = uow.current_transaction();

        tx.begin().unwrap();
        uow.persist(EntityHandle::new(Item { id: 2, label: "two" })).unwrap();
        uow.remove(Item::ENTITY_TYPE, &IdValue::Long(1)).unwrap();
        tx.rollback().unwrap();

        assert_eq!(db.len(), 1);
        assert!(db.get(Item::ENTITY_TYPE, &IdValue::Long(1)).is_some());
    }

    #[test]
    fn reads_see_own_staged_writes() {
        let db = MemoryDatabase::new();
        db.seed(Item { id: 1, label: "old" });
        let uow = db.open().unwrap();

        uow.persist(EntityHandle::new(Item { id: 1, label: "new" })).unwrap();
        let found = uow.find(Item::ENTITY_TYPE, &IdValue::Long(1)).unwrap().unwrap();
        assert_eq!(label(&found), "new");

        uow.remove(Item::ENTITY_TYPE, &IdValue::Long(1)).unwrap();
        assert!(uow.find(Item::ENTITY_TYPE, &IdValue::Long(1)).unwrap().is_none());

        // other units only see committed rows
        let other = db.open().unwrap();
        let found = other.find(Item::ENTITY_TYPE, &IdValue::Long(1)).unwrap().unwrap();
        assert_eq!(label(&found), "old");
    }

    #[test]
    fn closed_unit_rejects_access() {
        let db = MemoryDatabase::new();
        let uow = db.open().unwrap();
        uow.close();
        uow.close();

        assert!(!uow.is_open());
        assert!(uow.find(Item::ENTITY_TYPE, &IdValue::Long(1)).is_err());
        assert!(uow
            .persist(EntityHandle::new(Item { id: 1, label: "x" }))
            .is_err());
    }

    #[test]
    fn transaction_handle_is_stable() {
        let db = MemoryDatabase::new();
        let uow = db.open().unwrap();
        uow.current_transaction().begin().unwrap();
        assert!(uow.current_transaction().is_active());
    }
}
