use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use crate::context::RequestContext;
use crate::error::{Error, TransactionError};
use crate::events::{EventSink, TransactionEvent, TransactionEventKind};
use crate::handler::HandlerMethod;
use crate::logging::RequestLog;
use crate::pipeline::{Interceptor, Next};
use crate::store::Transaction;
use crate::validation::Validator;

/// Which handlers get a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionScope {
    /// Every request runs inside a transaction.
    #[default]
    EveryRequest,
    /// Only handlers marked transactional do; the rest skip this stage.
    AnnotatedOnly,
}

/// Brackets the remainder of the chain in one transaction.
///
/// Per request:
/// 1. registers a redirect hook that runs the commit decision, so a
///    redirect is only sent once the work is committed
/// 2. begins the transaction
/// 3. runs the remainder of the chain
/// 4. commit decision: announces `before_commit` if still active, then
///    commits and announces `after_commit` if validation recorded no errors
/// 5. rolls back and announces `after_rollback` if still active, whether
///    or not the chain failed
///
/// A failure of the chain or of the commit is returned unchanged after
/// the rollback in step 5.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use request_unit::events::EventTrail;
/// use request_unit::interceptor::{TransactionInterceptor, TransactionScope};
/// use request_unit::pipeline::Pipeline;
///
/// let trail = Arc::new(EventTrail::new());
/// let pipeline = Pipeline::new()
///     .stage(TransactionInterceptor::new(trail, TransactionScope::EveryRequest));
///
/// assert_eq!(pipeline.stage_names(), vec!["transaction"]);
/// ```
pub struct TransactionInterceptor {
    events: Arc<dyn EventSink>,
    scope: TransactionScope,
}

impl TransactionInterceptor {
    /// Creates the stage, publishing lifecycle events to `events`.
    pub fn new(events: Arc<dyn EventSink>, scope: TransactionScope) -> Self {
        Self { events, scope }
    }

    /// Returns the configured scope.
    pub fn scope(&self) -> TransactionScope {
        self.scope
    }
}

impl std::fmt::Debug for TransactionInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionInterceptor")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl Interceptor for TransactionInterceptor {
    fn name(&self) -> &'static str {
        "transaction"
    }

    fn accepts(&self, handler: &HandlerMethod) -> bool {
        match self.scope {
            TransactionScope::EveryRequest => true,
            TransactionScope::AnnotatedOnly => handler.is_transactional(),
        }
    }

    fn intercept(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<(), Error> {
        let decision = Arc::new(CommitDecision {
            transaction: ctx.unit_of_work().current_transaction(),
            validator: ctx.validator().clone(),
            events: self.events.clone(),
            request_id: ctx.request_id().to_string(),
            announced: AtomicBool::new(false),
        });

        let hook = decision.clone();
        ctx.response_mut()
            .add_redirect_listener(Box::new(move || hook.commit().map_err(Error::from)));

        decision.transaction.begin()?;
        ctx.log().debug(format_args!("transaction begun"));

        let outcome = next
            .proceed(ctx)
            .and_then(|()| decision.commit().map_err(Error::from));

        match (outcome, decision.rollback_if_active()) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(rollback)) => Err(rollback.into()),
            (Err(original), Ok(())) => Err(original),
            (Err(original), Err(rollback)) => {
                ctx.log().error(format_args!(
                    "rollback failed after earlier error ({}): {}",
                    original, rollback
                ));
                Err(original)
            }
        }
    }
}

/// Commit/rollback logic shared by the stage and its redirect hook.
struct CommitDecision {
    transaction: Arc<dyn Transaction>,
    validator: Validator,
    events: Arc<dyn EventSink>,
    request_id: String,
    announced: AtomicBool,
}

impl CommitDecision {
    fn commit(&self) -> Result<(), TransactionError> {
        if self.transaction.is_active() && !self.announced.swap(true, Ordering::SeqCst) {
            self.notify(TransactionEventKind::BeforeCommit);
        }

        if !self.validator.has_errors() && self.transaction.is_active() {
            self.transaction.commit()?;
            self.log().info(format_args!("transaction committed"));
            self.notify(TransactionEventKind::AfterCommit);
        }
        Ok(())
    }

    fn rollback_if_active(&self) -> Result<(), TransactionError> {
        if self.transaction.is_active() {
            self.transaction.rollback()?;
            self.log().warn(format_args!("transaction rolled back"));
            self.notify(TransactionEventKind::AfterRollback);
        }
        Ok(())
    }

    fn notify(&self, kind: TransactionEventKind) {
        self.events
            .notify(&TransactionEvent::new(self.request_id.as_str(), kind));
    }

    fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id)
    }
}
