//! Around-call pipeline of interceptors.
//!
//! Stages compose by nesting: each stage receives a [`Next`] continuation
//! and decides whether, and around what, to call [`Next::proceed`]. The
//! last continuation runs the handler.
//!
//! ```text
//! Pipeline::run
//!   ↓
//! stage 1 ── next.proceed() ──→ stage 2 ── next.proceed() ──→ handler
//!   ↑                              ↑                              │
//!   └──────── returns ─────────────┴────────── returns ───────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::context::RequestContext;
use crate::error::Error;
use crate::handler::{Handler, HandlerMethod};

/// A pipeline stage wrapping the rest of the chain.
pub trait Interceptor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns true if this stage applies to `handler`.
    ///
    /// Must depend only on the handler description: the pipeline asks
    /// once per handler and caches the answer.
    fn accepts(&self, _handler: &HandlerMethod) -> bool {
        true
    }

    /// Runs this stage around `next`.
    ///
    /// # Errors
    ///
    /// Failures of the remainder of the chain must be propagated unchanged.
    fn intercept(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<(), Error>;
}

/// Continuation running the remainder of the pipeline.
///
/// `proceed` consumes the continuation, so a stage can run the remainder
/// at most once.
pub struct Next<'a> {
    stages: &'a [Arc<dyn Interceptor>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Creates a continuation over `stages` ending in `handler`.
    pub fn new(stages: &'a [Arc<dyn Interceptor>], handler: &'a dyn Handler) -> Self {
        Self { stages, handler }
    }

    /// Runs the remaining stages and the handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the remainder of the chain returns.
    pub fn proceed(self, ctx: &mut RequestContext) -> Result<(), Error> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.intercept(ctx, Next::new(rest, self.handler)),
            None => self.handler.handle(ctx),
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

type Accepted = Arc<[Arc<dyn Interceptor>]>;

/// Ordered list of interceptors.
///
/// The stages accepted by each handler are computed on first use and
/// cached by handler signature.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Interceptor>>,
    accepted: RwLock<HashMap<HandlerMethod, Accepted>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage; stages run in the order they are added.
    pub fn stage(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.stages.push(Arc::new(interceptor));
        self
    }

    /// Returns the stage names in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Returns the stages that apply to `handler`.
    pub fn accepted_by(&self, handler: &HandlerMethod) -> Accepted {
        if let Some(found) = self
            .accepted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handler)
        {
            return found.clone();
        }

        let accepted: Accepted = self
            .stages
            .iter()
            .filter(|stage| stage.accepts(handler))
            .cloned()
            .collect();
        tracing::debug!(
            handler = %handler.name(),
            stages = ?accepted.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "pipeline acceptance computed"
        );

        self.accepted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(handler.clone())
            .or_insert(accepted)
            .clone()
    }

    /// Runs the accepted stages and then `handler`.
    ///
    /// # Errors
    ///
    /// Returns the first failure raised by a stage or the handler.
    pub fn run(&self, ctx: &mut RequestContext, handler: &dyn Handler) -> Result<(), Error> {
        let accepted = self.accepted_by(ctx.handler());
        Next::new(&accepted, handler).proceed(ctx)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
