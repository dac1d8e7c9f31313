//! Discovery of identifier descriptors from entity metadata.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;

use crate::error::{MappingError, MappingErrorKind};
use crate::metadata::{EntityType, IdentifierDescriptor, Metamodel};

/// How far up the supertype chain the identifier attribute is looked for
/// when the entity type does not declare one itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupertypeWalk {
    /// Inspect the direct supertype only.
    #[default]
    SingleHop,
    /// Walk every ancestor until one declares the identifier.
    FullChain,
}

/// Resolves and caches the [`IdentifierDescriptor`] of entity types.
///
/// Descriptors depend only on static metadata, so they are computed once
/// per type and kept for the lifetime of the resolver. Concurrent first
/// lookups for the same type may compute it twice; both results are equal.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use request_unit::identifier::{IdentifierResolver, SupertypeWalk};
/// use request_unit::metadata::{EntityType, IdKind, StaticMetamodel};
///
/// const ORDER: EntityType = EntityType::named("Order");
///
/// let model = StaticMetamodel::builder()
///     .entity(ORDER)
///     .declares_id("orderId", IdKind::Long)
///     .build();
///
/// let resolver = IdentifierResolver::new(Arc::new(model), SupertypeWalk::SingleHop);
/// let descriptor = resolver.resolve(ORDER).unwrap();
/// assert_eq!(descriptor.name, "orderId");
/// ```
pub struct IdentifierResolver {
    metamodel: Arc<dyn Metamodel>,
    walk: SupertypeWalk,
    cache: RwLock<HashMap<EntityType, IdentifierDescriptor>>,
}

impl IdentifierResolver {
    /// Creates a resolver over `metamodel`.
    pub fn new(metamodel: Arc<dyn Metamodel>, walk: SupertypeWalk) -> Self {
        Self {
            metamodel,
            walk,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the configured supertype walk.
    pub fn walk(&self) -> SupertypeWalk {
        self.walk
    }

    /// Returns the identifier descriptor of `entity`.
    ///
    /// # Errors
    ///
    /// Returns a `MappingError` if the type has no identifier type, or no
    /// identifier attribute is declared where the walk looks for it.
    pub fn resolve(&self, entity: EntityType) -> Result<IdentifierDescriptor, MappingError> {
        if let Some(found) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
        {
            return Ok(found.clone());
        }

        let descriptor = self.discover(entity)?;
        tracing::debug!(
            entity = %entity,
            id = %descriptor.name,
            kind = %descriptor.kind,
            "identifier descriptor discovered"
        );

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity, descriptor.clone());
        Ok(descriptor)
    }

    /// Returns the number of cached descriptors.
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn discover(&self, entity: EntityType) -> Result<IdentifierDescriptor, MappingError> {
        let kind = self.metamodel.identifier_type(entity).ok_or_else(|| {
            MappingError::new(
                MappingErrorKind::MissingIdentifierType,
                entity,
                "entity must have an id property to be loaded",
            )
        })?;

        if let Some(own) = self.metamodel.declared_identifier(entity, kind) {
            return Ok(own);
        }

        let mut cursor = self.metamodel.supertype_of(entity);
        while let Some(supertype) = cursor {
            if let Some(inherited) = self.metamodel.declared_identifier(supertype, kind) {
                return Ok(inherited);
            }
            cursor = match self.walk {
                SupertypeWalk::SingleHop => None,
                SupertypeWalk::FullChain => self.metamodel.supertype_of(supertype),
            };
        }

        Err(MappingError::new(
            MappingErrorKind::MissingDeclaredIdentifier,
            entity,
            format!("no {} identifier declared on the type or its supertype", kind),
        ))
    }
}

impl std::fmt::Debug for IdentifierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierResolver")
            .field("walk", &self.walk)
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{IdKind, StaticMetamodel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ENTITY: EntityType = EntityType::named("Entity");
    const OTHER_ID_NAME: EntityType = EntityType::named("EntityOtherIdName");
    const MAPPED: EntityType = EntityType::named("MappedSuperClass");
    const CHILD: EntityType = EntityType::named("Child");
    const SON: EntityType = EntityType::named("Son");
    const GRAND_SON: EntityType = EntityType::named("GrandSon");
    const NO_ID: EntityType = EntityType::named("NoIdEntity");
    const SHADOW: EntityType = EntityType::named("Shadow");

    fn model() -> Arc<dyn Metamodel> {
        Arc::new(
            StaticMetamodel::builder()
                .entity(ENTITY)
                .declares_id("id", IdKind::Long)
                .entity(OTHER_ID_NAME)
                .declares_id("otherIdName", IdKind::Long)
                .entity(MAPPED)
                .declares_id("id", IdKind::Long)
                .entity(CHILD)
                .extends(MAPPED)
                .entity(SON)
                .extends(ENTITY)
                .entity(GRAND_SON)
                .extends(SON)
                .entity(NO_ID)
                .entity(SHADOW)
                .extends(ENTITY)
                .declares_id("code", IdKind::Long)
                .build(),
        )
    }

    #[test]
    fn own_declaration_is_used() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::SingleHop);
        assert_eq!(
            resolver.resolve(OTHER_ID_NAME).unwrap(),
            IdentifierDescriptor::new("otherIdName", IdKind::Long)
        );
    }

    #[test]
    fn own_declaration_wins_over_supertype() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::SingleHop);
        assert_eq!(resolver.resolve(SHADOW).unwrap().name, "code");
    }

    #[test]
    fn direct_supertype_declaration_is_used() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::SingleHop);
        assert_eq!(resolver.resolve(CHILD).unwrap().name, "id");
        assert_eq!(resolver.resolve(SON).unwrap().name, "id");
    }

    #[test]
    fn single_hop_does_not_reach_grandparent() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::SingleHop);
        let err = resolver.resolve(GRAND_SON).unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::MissingDeclaredIdentifier);
        assert_eq!(err.entity_type, GRAND_SON);
    }

    #[test]
    fn full_chain_reaches_grandparent() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::FullChain);
        assert_eq!(
            resolver.resolve(GRAND_SON).unwrap(),
            IdentifierDescriptor::new("id", IdKind::Long)
        );
    }

    #[test]
    fn type_without_identifier_is_a_mapping_error() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::FullChain);
        let err = resolver.resolve(NO_ID).unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::MissingIdentifierType);
    }

    #[test]
    fn failures_are_not_cached() {
        let resolver = IdentifierResolver::new(model(), SupertypeWalk::SingleHop);
        assert!(resolver.resolve(NO_ID).is_err());
        assert_eq!(resolver.cached(), 0);
    }

    struct CountingMetamodel {
        inner: StaticMetamodel,
        calls: AtomicUsize,
    }

    impl Metamodel for CountingMetamodel {
        fn identifier_type(&self, entity: EntityType) -> Option<IdKind> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.identifier_type(entity)
        }

        fn declared_identifier(
            &self,
            entity: EntityType,
            kind: IdKind,
        ) -> Option<IdentifierDescriptor> {
            self.inner.declared_identifier(entity, kind)
        }

        fn supertype_of(&self, entity: EntityType) -> Option<EntityType> {
            self.inner.supertype_of(entity)
        }
    }

    #[test]
    fn descriptor_is_computed_once_per_type() {
        let counting = Arc::new(CountingMetamodel {
            inner: StaticMetamodel::builder()
                .entity(ENTITY)
                .declares_id("id", IdKind::Long)
                .build(),
            calls: AtomicUsize::new(0),
        });
        let resolver = IdentifierResolver::new(counting.clone(), SupertypeWalk::SingleHop);

        for _ in 0..5 {
            resolver.resolve(ENTITY).unwrap();
        }

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached(), 1);
    }
}
