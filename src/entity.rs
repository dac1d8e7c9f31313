//! Persisted domain objects and their identifiers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::metadata::{EntityType, IdKind};

/// A converted identifier value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdValue {
    /// 64-bit signed integer id
    Long(i64),
    /// 32-bit signed integer id
    Integer(i32),
    /// String id
    Text(String),
    /// UUID id
    Uuid(Uuid),
}

impl IdValue {
    /// Returns the identifier type this value belongs to.
    pub fn kind(&self) -> IdKind {
        match self {
            IdValue::Long(_) => IdKind::Long,
            IdValue::Integer(_) => IdKind::Integer,
            IdValue::Text(_) => IdKind::Text,
            IdValue::Uuid(_) => IdKind::Uuid,
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Long(v) => write!(f, "{}", v),
            IdValue::Integer(v) => write!(f, "{}", v),
            IdValue::Text(v) => f.write_str(v),
            IdValue::Uuid(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for IdValue {
    fn from(v: i64) -> Self {
        IdValue::Long(v)
    }
}

impl From<i32> for IdValue {
    fn from(v: i32) -> Self {
        IdValue::Integer(v)
    }
}

impl From<&str> for IdValue {
    fn from(v: &str) -> Self {
        IdValue::Text(v.to_string())
    }
}

impl From<String> for IdValue {
    fn from(v: String) -> Self {
        IdValue::Text(v)
    }
}

impl From<Uuid> for IdValue {
    fn from(v: Uuid) -> Self {
        IdValue::Uuid(v)
    }
}

/// A Rust type persisted as an entity.
///
/// # Examples
///
/// ```
/// use request_unit::entity::{Entity, EntityHandle, IdValue};
/// use request_unit::metadata::EntityType;
///
/// #[derive(Debug)]
/// struct Order {
///     order_id: i64,
/// }
///
/// impl Entity for Order {
///     const ENTITY_TYPE: EntityType = EntityType::named("Order");
///
///     fn id(&self) -> IdValue {
///         IdValue::Long(self.order_id)
///     }
/// }
///
/// let handle = EntityHandle::new(Order { order_id: 42 });
/// assert_eq!(handle.id(), &IdValue::Long(42));
/// assert_eq!(handle.downcast_ref::<Order>().unwrap().order_id, 42);
/// ```
pub trait Entity: Any + Send + Sync {
    /// Entity type key in the [`Metamodel`](crate::metadata::Metamodel).
    const ENTITY_TYPE: EntityType;

    /// Returns this instance's identifier.
    fn id(&self) -> IdValue;
}

/// A type-erased, shareable entity instance.
///
/// Handles are cheap to clone; clones point to the same object.
#[derive(Clone)]
pub struct EntityHandle {
    entity_type: EntityType,
    id: IdValue,
    value: Arc<dyn Any + Send + Sync>,
}

impl EntityHandle {
    /// Wraps a typed entity.
    pub fn new<E: Entity>(entity: E) -> Self {
        Self {
            entity_type: E::ENTITY_TYPE,
            id: entity.id(),
            value: Arc::new(entity),
        }
    }

    /// Returns the entity type.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the identifier.
    pub fn id(&self) -> &IdValue {
        &self.id
    }

    /// Returns the entity as `E` if it is one.
    pub fn downcast_ref<E: Entity>(&self) -> Option<&E> {
        self.value.downcast_ref::<E>()
    }

    /// Returns true if both handles point to the same instance.
    pub fn ptr_eq(&self, other: &EntityHandle) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("entity_type", &self.entity_type)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
