//! Per-request entry point.

use std::fmt;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::context::RequestContext;
use crate::convert::Converters;
use crate::error::Error;
use crate::events::EventSink;
use crate::handler::{Arguments, Route};
use crate::interceptor::{ParameterLoader, TransactionInterceptor};
use crate::metadata::Metamodel;
use crate::pipeline::Pipeline;
use crate::store::UnitOfWorkFactory;
use crate::web::{ExtractInput, Response};

/// Runs requests through a [`Pipeline`] inside a request-scoped unit of work.
///
/// Each dispatch:
/// 1. opens a unit of work
/// 2. builds the [`RequestContext`], seeding argument slots from flashed
///    arguments when the request carries them
/// 3. runs the pipeline and the route's handler
/// 4. closes the unit of work, whatever the outcome
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use request_unit::config::PipelineConfig;
/// use request_unit::context::RequestContext;
/// use request_unit::convert::Converters;
/// use request_unit::dispatch::Dispatcher;
/// use request_unit::events::EventTrail;
/// use request_unit::handler::{HandlerMethod, Route};
/// use request_unit::memory::MemoryDatabase;
/// use request_unit::metadata::StaticMetamodel;
/// use request_unit::web::RequestAdapter;
/// use request_unit::Error;
///
/// let trail = Arc::new(EventTrail::new());
/// let dispatcher = Dispatcher::from_config(
///     &PipelineConfig::default(),
///     Arc::new(MemoryDatabase::new()),
///     Arc::new(StaticMetamodel::builder().build()),
///     Converters::defaults(),
///     trail.clone(),
/// );
/// let route = Route::from_fn(HandlerMethod::new("ping"), |_: &mut RequestContext| -> Result<(), Error> {
///     Ok(())
/// });
///
/// let response = dispatcher.dispatch(&route, &RequestAdapter::new("req-1".into())).unwrap();
///
/// assert_eq!(response.status_code(), 200);
/// assert_eq!(trail.len(), 2);
/// ```
pub struct Dispatcher {
    pipeline: Pipeline,
    units: Arc<dyn UnitOfWorkFactory>,
    positional_arguments: bool,
}

impl Dispatcher {
    /// Creates a dispatcher with positional argument slots enabled.
    pub fn new(pipeline: Pipeline, units: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            pipeline,
            units,
            positional_arguments: true,
        }
    }

    /// Builds the default pipeline: parameter loading, then the
    /// transaction boundary.
    pub fn from_config(
        config: &PipelineConfig,
        units: Arc<dyn UnitOfWorkFactory>,
        metamodel: Arc<dyn Metamodel>,
        converters: Converters,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let pipeline = Pipeline::new()
            .stage(ParameterLoader::new(
                metamodel,
                converters,
                config.identifier_lookup,
            ))
            .stage(TransactionInterceptor::new(events, config.transaction_scope));

        Self::new(pipeline, units).positional_arguments(config.positional_arguments)
    }

    /// Enables or disables positional argument slots for requests that do
    /// not carry flashed arguments.
    pub fn positional_arguments(mut self, enabled: bool) -> Self {
        self.positional_arguments = enabled;
        self
    }

    /// Returns the pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Dispatches `request` to `route`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit of work cannot be opened, or whatever
    /// error the pipeline or handler produced. The unit of work is closed
    /// in every case once opened.
    pub fn dispatch<R>(&self, route: &Route, request: &R) -> Result<Response, Error>
    where
        R: ExtractInput + ?Sized,
    {
        let unit = self.units.open()?;
        let mut ctx = RequestContext::new(
            request.request_id(),
            route.method().clone(),
            request.extract_input(),
            unit.clone(),
        );

        let arguments = request.flashed_arguments().or_else(|| {
            self.positional_arguments
                .then(|| Arguments::for_handler(route.method()))
        });
        if let Some(arguments) = arguments {
            ctx = ctx.with_arguments(arguments);
        }

        ctx.log()
            .debug(format_args!("dispatching to {}", route.method().name()));
        let outcome = self.pipeline.run(&mut ctx, route.handler());

        if unit.is_open() {
            unit.close();
        }

        match outcome {
            Ok(()) => {
                ctx.log().debug(format_args!(
                    "request finished with status {}",
                    ctx.response().status_code()
                ));
                Ok(ctx.into_response())
            }
            Err(err) => {
                ctx.log().warn(format_args!("request failed: {}", err));
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pipeline", &self.pipeline)
            .field("positional_arguments", &self.positional_arguments)
            .finish_non_exhaustive()
    }
}
