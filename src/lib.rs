//! Request-scoped transaction boundary and entity loading for request pipelines.
//!
//! This crate provides two pipeline stages that ride on a request's unit of work:
//! - **Parameter loading**: handler parameters marked with a load directive are
//!   looked up by the identifier posted in the request, or the request answers
//!   not-found before the handler runs
//! - **Transaction boundary**: the rest of the chain runs inside one transaction,
//!   committed only when validation recorded no errors, and committed early when
//!   the handler redirects
//!
//! # Core Types
//!
//! - [`Dispatcher`]: Opens the unit of work, runs the pipeline, closes the unit of work
//! - [`Pipeline`]: Ordered [`Interceptor`] stages around a [`Handler`]
//! - [`TransactionInterceptor`]: Begin / commit / rollback around the chain
//! - [`ParameterLoader`]: Binds entities loaded by id to handler arguments
//! - [`RequestContext`]: Explicit request-scoped state handed through the chain
//! - [`MemoryDatabase`]: In-process store whose writes become visible on commit
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use request_unit::{
//!     Converters, Dispatcher, Entity, EntityType, Error, EventTrail, HandlerMethod, IdKind,
//!     IdValue, MemoryDatabase, Parameter, PipelineConfig, RequestAdapter, RequestContext,
//!     Route, StaticMetamodel,
//! };
//!
//! struct Order {
//!     order_id: i64,
//! }
//!
//! impl Entity for Order {
//!     const ENTITY_TYPE: EntityType = EntityType::named("Order");
//!
//!     fn id(&self) -> IdValue {
//!         IdValue::Long(self.order_id)
//!     }
//! }
//!
//! let db = Arc::new(MemoryDatabase::new());
//! db.seed(Order { order_id: 42 });
//!
//! let model = StaticMetamodel::builder()
//!     .entity(Order::ENTITY_TYPE)
//!     .declares_id("orderId", IdKind::Long)
//!     .build();
//! let trail = Arc::new(EventTrail::new());
//! let dispatcher = Dispatcher::from_config(
//!     &PipelineConfig::default(),
//!     db,
//!     Arc::new(model),
//!     Converters::defaults(),
//!     trail.clone(),
//! );
//!
//! let route = Route::from_fn(
//!     HandlerMethod::new("OrderController::show").param(Parameter::load::<Order>("order")),
//!     |ctx: &mut RequestContext| -> Result<(), Error> {
//!         let order = ctx.arguments().and_then(|args| args.entity(0));
//!         assert_eq!(order.and_then(|o| o.downcast_ref::<Order>()).map(|o| o.order_id), Some(42));
//!         Ok(())
//!     },
//! );
//!
//! let mut request = RequestAdapter::new("req-1".to_string());
//! request.add_form_field("order.orderId".to_string(), "42".to_string());
//! assert_eq!(dispatcher.dispatch(&route, &request).unwrap().status_code(), 200);
//!
//! let mut missing = RequestAdapter::new("req-2".to_string());
//! missing.add_form_field("order.orderId".to_string(), "7".to_string());
//! assert_eq!(dispatcher.dispatch(&route, &missing).unwrap().status_code(), 404);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod convert;
pub mod dispatch;
pub mod entity;
mod error;
pub mod events;
pub mod handler;
pub mod identifier;
pub mod interceptor;
pub mod logging;
pub mod memory;
pub mod metadata;
pub mod pipeline;
pub mod request;
pub mod store;
pub mod validation;
pub mod web;

pub use config::PipelineConfig;
pub use context::RequestContext;
pub use convert::{Converter, Converters};
pub use dispatch::Dispatcher;
pub use entity::{Entity, EntityHandle, IdValue};
pub use error::{
    Error, HandlerError, MappingError, MappingErrorKind, StorageError, TransactionError,
    TransactionErrorKind,
};
pub use events::{EventBus, EventSink, EventTrail, TransactionEvent, TransactionEventKind};
pub use handler::{ArgValue, Arguments, Handler, HandlerMethod, Parameter, Route};
pub use identifier::{IdentifierResolver, SupertypeWalk};
pub use interceptor::{ParameterLoader, TransactionInterceptor, TransactionScope};
pub use memory::MemoryDatabase;
pub use metadata::{EntityType, IdKind, IdentifierDescriptor, Metamodel, StaticMetamodel};
pub use pipeline::{Interceptor, Next, Pipeline};
pub use store::{EntityStore, Transaction, TransactionState, UnitOfWork, UnitOfWorkFactory};
pub use validation::{ValidationMessage, Validator};
pub use web::{ExtractInput, Outcome, RequestAdapter, Response};
