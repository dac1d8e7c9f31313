use std::sync::Arc;

use crate::context::RequestContext;
use crate::convert::Converters;
use crate::entity::EntityHandle;
use crate::error::{Error, MappingError, MappingErrorKind};
use crate::handler::{ArgValue, HandlerMethod, ParamType, Parameter};
use crate::identifier::{IdentifierResolver, SupertypeWalk};
use crate::metadata::{EntityType, Metamodel};
use crate::pipeline::{Interceptor, Next};

/// Loads load-directed handler parameters by identifier.
///
/// For each such parameter the identifier is read from the request field
/// `"{parameter}.{id attribute}"`, converted with the converter registered
/// for the id type, and looked up in the request's unit of work. The
/// entity is bound to the parameter's argument slot, or published as a
/// request attribute under the parameter name when there are no slots.
///
/// A missing field, an unparsable id or a missing row all answer
/// not-found and stop the chain. Metadata defects fail loudly with a
/// [`MappingError`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use request_unit::convert::Converters;
/// use request_unit::handler::{HandlerMethod, Parameter};
/// use request_unit::identifier::SupertypeWalk;
/// use request_unit::interceptor::ParameterLoader;
/// use request_unit::metadata::{EntityType, IdKind, StaticMetamodel};
///
/// const ORDER: EntityType = EntityType::named("Order");
///
/// let model = StaticMetamodel::builder()
///     .entity(ORDER)
///     .declares_id("orderId", IdKind::Long)
///     .build();
/// let loader = ParameterLoader::new(Arc::new(model), Converters::defaults(), SupertypeWalk::SingleHop);
///
/// assert!(loader.applies_to(&HandlerMethod::new("show").param(Parameter::load_entity("order", ORDER))));
/// assert!(!loader.applies_to(&HandlerMethod::new("list")));
/// ```
#[derive(Debug)]
pub struct ParameterLoader {
    identifiers: IdentifierResolver,
    converters: Converters,
}

impl ParameterLoader {
    /// Creates a loader over `metamodel`.
    pub fn new(metamodel: Arc<dyn Metamodel>, converters: Converters, walk: SupertypeWalk) -> Self {
        Self {
            identifiers: IdentifierResolver::new(metamodel, walk),
            converters,
        }
    }

    /// Returns true if `handler` has at least one load-directed parameter.
    pub fn applies_to(&self, handler: &HandlerMethod) -> bool {
        handler.has_load_directives()
    }

    /// Returns the identifier resolver, with its descriptor cache.
    pub fn identifiers(&self) -> &IdentifierResolver {
        &self.identifiers
    }

    /// Loads one parameter. `Ok(None)` means not-found.
    fn load(&self, ctx: &RequestContext, parameter: &Parameter) -> Result<Option<EntityHandle>, Error> {
        let entity_type = match parameter.ty() {
            ParamType::Entity(entity_type) => entity_type,
            ParamType::Value => {
                return Err(MappingError::new(
                    MappingErrorKind::NotAnEntity,
                    EntityType::named("<value>"),
                    format!("parameter '{}' is not an entity", parameter.name()),
                )
                .into())
            }
        };

        let descriptor = self.identifiers.resolve(entity_type)?;
        let field = format!("{}.{}", parameter.name(), descriptor.name);

        let Some(raw) = ctx.input().field(&field) else {
            ctx.log()
                .debug(format_args!("no '{}' in request for {}", field, entity_type));
            return Ok(None);
        };

        let converter = self.converters.converter_for(descriptor.kind).ok_or_else(|| {
            MappingError::new(
                MappingErrorKind::MissingConverter,
                entity_type,
                format!("no converter registered for {} ids", descriptor.kind),
            )
        })?;

        let id = match converter.convert(raw, entity_type) {
            Ok(id) => id,
            Err(err) => {
                ctx.log().debug(format_args!("{}: {}", field, err));
                return Ok(None);
            }
        };

        let found = ctx.unit_of_work().find(entity_type, &id)?;
        if found.is_some() {
            ctx.log()
                .debug(format_args!("loaded {} {} for '{}'", entity_type, id, parameter.name()));
        }
        Ok(found)
    }
}

impl Interceptor for ParameterLoader {
    fn name(&self) -> &'static str {
        "parameter_loader"
    }

    fn accepts(&self, handler: &HandlerMethod) -> bool {
        self.applies_to(handler)
    }

    fn intercept(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<(), Error> {
        let handler = ctx.handler().clone();

        for (index, parameter) in handler.parameters().iter().enumerate() {
            if !parameter.is_load_directed() {
                continue;
            }

            let Some(entity) = self.load(ctx, parameter)? else {
                ctx.log()
                    .warn(format_args!("'{}' not found, answering 404", parameter.name()));
                ctx.response_mut().mark_not_found();
                return Ok(());
            };

            match ctx.arguments_mut() {
                Some(arguments) => arguments.set(index, ArgValue::Entity(entity)),
                None => ctx.attributes_mut().set(parameter.name(), entity),
            }
        }

        next.proceed(ctx)
    }
}
