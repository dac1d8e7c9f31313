//! Static persistence metadata: entity types, identifier types and declared
//! identifier attributes.

use std::collections::HashMap;
use std::fmt;

/// Name of a persisted entity type.
///
/// Entity types are compared by name, so the name must be unique within
/// one [`Metamodel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityType(&'static str);

impl EntityType {
    /// Creates an entity type key.
    pub const fn named(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the type name.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Declared type of an identifier attribute.
///
/// Selects the [`Converter`](crate::convert::Converter) used to turn a raw
/// request string into an [`IdValue`](crate::entity::IdValue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// 64-bit signed integer
    Long,
    /// 32-bit signed integer
    Integer,
    /// Free-form string
    Text,
    /// RFC 4122 UUID
    Uuid,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Long => write!(f, "long"),
            IdKind::Integer => write!(f, "integer"),
            IdKind::Text => write!(f, "text"),
            IdKind::Uuid => write!(f, "uuid"),
        }
    }
}

/// Name and declared type of an entity's identifier attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierDescriptor {
    /// Attribute name, used as the request field suffix (`order.orderId`)
    pub name: String,
    /// Declared identifier type
    pub kind: IdKind,
}

impl IdentifierDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, kind: IdKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Read access to persistence metadata.
pub trait Metamodel: Send + Sync {
    /// Returns the identifier type of `entity`, declared or inherited.
    ///
    /// `None` means the type cannot be loaded by id at all.
    fn identifier_type(&self, entity: EntityType) -> Option<IdKind>;

    /// Returns the identifier attribute `entity` itself declares for `kind`.
    ///
    /// Inherited identifiers are not reported here.
    fn declared_identifier(&self, entity: EntityType, kind: IdKind)
        -> Option<IdentifierDescriptor>;

    /// Returns the direct supertype of `entity`, if it has one.
    fn supertype_of(&self, entity: EntityType) -> Option<EntityType>;
}

#[derive(Debug, Clone, Default)]
struct TypeEntry {
    declared_id: Option<IdentifierDescriptor>,
    supertype: Option<EntityType>,
}

/// A [`Metamodel`] assembled in code.
///
/// # Examples
///
/// ```
/// use request_unit::metadata::{EntityType, IdKind, Metamodel, StaticMetamodel};
///
/// const BASE: EntityType = EntityType::named("Base");
/// const CHILD: EntityType = EntityType::named("Child");
///
/// let model = StaticMetamodel::builder()
///     .entity(BASE)
///     .declares_id("id", IdKind::Long)
///     .entity(CHILD)
///     .extends(BASE)
///     .build();
///
/// assert_eq!(model.identifier_type(CHILD), Some(IdKind::Long));
/// assert!(model.declared_identifier(CHILD, IdKind::Long).is_none());
/// assert_eq!(model.supertype_of(CHILD), Some(BASE));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticMetamodel {
    types: HashMap<EntityType, TypeEntry>,
}

impl StaticMetamodel {
    /// Starts building a metamodel.
    pub fn builder() -> StaticMetamodelBuilder {
        StaticMetamodelBuilder {
            model: StaticMetamodel::default(),
            current: None,
        }
    }

    /// Returns true if `entity` was declared.
    pub fn contains(&self, entity: EntityType) -> bool {
        self.types.contains_key(&entity)
    }
}

impl Metamodel for StaticMetamodel {
    fn identifier_type(&self, entity: EntityType) -> Option<IdKind> {
        let mut cursor = Some(entity);
        while let Some(ty) = cursor {
            let entry = self.types.get(&ty)?;
            if let Some(id) = &entry.declared_id {
                return Some(id.kind);
            }
            cursor = entry.supertype;
        }
        None
    }

    fn declared_identifier(
        &self,
        entity: EntityType,
        kind: IdKind,
    ) -> Option<IdentifierDescriptor> {
        self.types
            .get(&entity)
            .and_then(|entry| entry.declared_id.as_ref())
            .filter(|id| id.kind == kind)
            .cloned()
    }

    fn supertype_of(&self, entity: EntityType) -> Option<EntityType> {
        self.types.get(&entity).and_then(|entry| entry.supertype)
    }
}

/// Builder for [`StaticMetamodel`].
///
/// `declares_id` and `extends` apply to the most recent `entity` call.
#[derive(Debug)]
pub struct StaticMetamodelBuilder {
    model: StaticMetamodel,
    current: Option<EntityType>,
}

impl StaticMetamodelBuilder {
    /// Declares an entity type and makes it the current one.
    pub fn entity(mut self, entity: EntityType) -> Self {
        self.model.types.entry(entity).or_default();
        self.current = Some(entity);
        self
    }

    /// Declares the identifier attribute of the current entity type.
    pub fn declares_id(mut self, name: impl Into<String>, kind: IdKind) -> Self {
        if let Some(entry) = self.current_entry() {
            entry.declared_id = Some(IdentifierDescriptor::new(name, kind));
        }
        self
    }

    /// Sets the direct supertype of the current entity type.
    pub fn extends(mut self, supertype: EntityType) -> Self {
        if let Some(entry) = self.current_entry() {
            entry.supertype = Some(supertype);
        }
        self
    }

    /// Finishes the metamodel.
    pub fn build(self) -> StaticMetamodel {
        self.model
    }

    fn current_entry(&mut self) -> Option<&mut TypeEntry> {
        let current = self.current?;
        self.model.types.get_mut(&current)
    }
}
