//! Request-scoped pipeline state.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Arguments, HandlerMethod};
use crate::logging::RequestLog;
use crate::request::{Attributes, RequestInput};
use crate::store::UnitOfWork;
use crate::validation::Validator;
use crate::web::Response;

/// Request-scoped state passed explicitly through the pipeline.
///
/// One context exists per request. It is created by the
/// [`Dispatcher`](crate::dispatch::Dispatcher) at request start and
/// dropped at request end; nothing in it is shared with other requests.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use request_unit::context::RequestContext;
/// use request_unit::handler::HandlerMethod;
/// use request_unit::memory::MemoryDatabase;
/// use request_unit::request::RequestInput;
/// use request_unit::store::UnitOfWorkFactory;
///
/// let uow = MemoryDatabase::new().open().unwrap();
/// let ctx = RequestContext::new(
///     "req-1",
///     Arc::new(HandlerMethod::new("index")),
///     RequestInput::default(),
///     uow,
/// );
///
/// assert_eq!(ctx.request_id(), "req-1");
/// assert!(ctx.arguments().is_none());
/// ```
pub struct RequestContext {
    request_id: String,
    handler: Arc<HandlerMethod>,
    input: RequestInput,
    attributes: Attributes,
    arguments: Option<Arguments>,
    validator: Validator,
    response: Response,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl RequestContext {
    /// Creates a context with no argument slots, an empty validator and an
    /// `Ok` response.
    pub fn new(
        request_id: impl Into<String>,
        handler: Arc<HandlerMethod>,
        input: RequestInput,
        unit_of_work: Arc<dyn UnitOfWork>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            handler,
            input,
            attributes: Attributes::default(),
            arguments: None,
            validator: Validator::new(),
            response: Response::new(),
            unit_of_work,
        }
    }

    /// Sets the positional argument slots.
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns a logger bound to this request.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id)
    }

    /// Returns the handler about to run.
    pub fn handler(&self) -> &Arc<HandlerMethod> {
        &self.handler
    }

    /// Returns the posted input.
    pub fn input(&self) -> &RequestInput {
        &self.input
    }

    /// Returns the request attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the request attributes for modification.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Returns the positional argument slots, if this stage has them.
    pub fn arguments(&self) -> Option<&Arguments> {
        self.arguments.as_ref()
    }

    /// Returns the positional argument slots for modification.
    pub fn arguments_mut(&mut self) -> Option<&mut Arguments> {
        self.arguments.as_mut()
    }

    /// Returns the request's validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Returns the response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns the response for modification.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Returns the request's unit of work.
    pub fn unit_of_work(&self) -> &Arc<dyn UnitOfWork> {
        &self.unit_of_work
    }

    /// Consumes the context, returning the response.
    pub fn into_response(self) -> Response {
        self.response
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("handler", &self.handler.name())
            .field("attributes", &self.attributes.len())
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}
