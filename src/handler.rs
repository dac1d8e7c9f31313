//! Handler descriptions and per-request argument slots.

use std::fmt;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::entity::{Entity, EntityHandle};
use crate::error::Error;
use crate::metadata::EntityType;

/// Marks a parameter to be loaded from storage by its identifier.
///
/// Carries no data: the parameter's entity type says what to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LoadDirective;

/// Declared type of a handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A persisted entity
    Entity(EntityType),
    /// Any other value, bound from raw input by earlier stages
    Value,
}

/// A formal parameter of a handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    ty: ParamType,
    load: Option<LoadDirective>,
}

impl Parameter {
    /// A parameter that is not an entity.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Value,
            load: None,
        }
    }

    /// An entity parameter bound by earlier stages, not loaded.
    pub fn entity(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Entity(entity_type),
            load: None,
        }
    }

    /// An entity parameter of type `E` loaded by id.
    pub fn load<E: Entity>(name: impl Into<String>) -> Self {
        Self::load_entity(name, E::ENTITY_TYPE)
    }

    /// An entity parameter of `entity_type` loaded by id.
    pub fn load_entity(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self::entity(name, entity_type).with_load()
    }

    /// Attaches a [`LoadDirective`].
    pub fn with_load(mut self) -> Self {
        self.load = Some(LoadDirective);
        self
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    pub fn ty(&self) -> ParamType {
        self.ty
    }

    /// Returns the load directive, if present.
    pub fn load_directive(&self) -> Option<LoadDirective> {
        self.load
    }

    /// Returns true if this parameter must be loaded by id.
    pub fn is_load_directed(&self) -> bool {
        self.load.is_some()
    }
}

/// Static description of a request handler.
///
/// The whole description is the handler signature: pipeline acceptance is
/// cached under it, so two handlers sharing a name but differing in
/// parameters are decided separately.
///
/// # Examples
///
/// ```
/// use request_unit::handler::{HandlerMethod, Parameter};
/// use request_unit::metadata::EntityType;
///
/// let method = HandlerMethod::new("OrderController::show")
///     .param(Parameter::load_entity("order", EntityType::named("Order")))
///     .param(Parameter::plain("format"))
///     .transactional();
///
/// assert!(method.has_load_directives());
/// assert_eq!(method.parameters().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerMethod {
    name: String,
    parameters: Vec<Parameter>,
    transactional: bool,
}

impl HandlerMethod {
    /// Creates a handler description with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            transactional: false,
        }
    }

    /// Appends a formal parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Marks the handler as transactional.
    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }

    /// Returns the handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formal parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns true if the handler is marked transactional.
    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// Returns true if any parameter carries a [`LoadDirective`].
    pub fn has_load_directives(&self) -> bool {
        self.parameters.iter().any(Parameter::is_load_directed)
    }
}

/// A value bound to an argument slot.
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// Raw string input
    Raw(String),
    /// A resolved entity
    Entity(EntityHandle),
}

impl ArgValue {
    /// Returns the entity, if this is one.
    pub fn as_entity(&self) -> Option<&EntityHandle> {
        match self {
            ArgValue::Entity(handle) => Some(handle),
            ArgValue::Raw(_) => None,
        }
    }
}

/// Positional argument slots of one handler invocation.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    slots: Vec<Option<ArgValue>>,
}

impl Arguments {
    /// Creates one empty slot per parameter of `method`.
    pub fn for_handler(method: &HandlerMethod) -> Self {
        Self::with_slots(method.parameters().len())
    }

    /// Creates `len` empty slots.
    pub fn with_slots(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Binds `value` to slot `index`, growing the slots if needed.
    pub fn set(&mut self, index: usize, value: ArgValue) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(value);
    }

    /// Returns the value of slot `index`.
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Returns the entity bound to slot `index`.
    pub fn entity(&self, index: usize) -> Option<&EntityHandle> {
        self.get(index).and_then(ArgValue::as_entity)
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The body of a request handler.
///
/// Implemented for closures taking the request context.
pub trait Handler: Send + Sync {
    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Any error is propagated unchanged through the pipeline.
    fn handle(&self, ctx: &mut RequestContext) -> Result<(), Error>;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) -> Result<(), Error> + Send + Sync,
{
    fn handle(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        self(ctx)
    }
}

/// A handler description paired with its body.
#[derive(Clone)]
pub struct Route {
    method: Arc<HandlerMethod>,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// Creates a route.
    pub fn new(method: HandlerMethod, handler: impl Handler + 'static) -> Self {
        Self {
            method: Arc::new(method),
            handler: Arc::new(handler),
        }
    }

    /// Creates a route from a closure.
    pub fn from_fn<F>(method: HandlerMethod, f: F) -> Self
    where
        F: Fn(&mut RequestContext) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self::new(method, f)
    }

    /// Returns the handler description.
    pub fn method(&self) -> &Arc<HandlerMethod> {
        &self.method
    }

    /// Returns the handler body.
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method.name())
            .finish_non_exhaustive()
    }
}
