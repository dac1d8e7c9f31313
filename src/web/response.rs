//! Response outcome and redirect hooks.

use std::fmt;

use crate::error::Error;

/// Callback run immediately before a redirect is recorded.
///
/// A hook that fails aborts the redirect.
pub type RedirectHook = Box<dyn FnOnce() -> Result<(), Error> + Send>;

/// What the response will tell the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Handler ran normally
    Ok,
    /// A requested resource does not exist
    NotFound,
    /// Client is redirected to the location
    Redirect(String),
}

/// Mutable response of one request.
///
/// # Examples
///
/// ```
/// use request_unit::web::{Outcome, Response};
///
/// let mut response = Response::new();
/// response.add_redirect_listener(Box::new(|| Ok(())));
/// response.redirect_to("/orders").unwrap();
///
/// assert_eq!(response.outcome(), &Outcome::Redirect("/orders".to_string()));
/// assert_eq!(response.status_code(), 302);
/// ```
#[derive(Default)]
pub struct Response {
    outcome: Option<Outcome>,
    hooks: Vec<RedirectHook>,
}

impl Response {
    /// Creates a response with an `Ok` outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> &Outcome {
        self.outcome.as_ref().unwrap_or(&Outcome::Ok)
    }

    /// Marks the response as not found.
    pub fn mark_not_found(&mut self) {
        self.outcome = Some(Outcome::NotFound);
    }

    /// Returns true if the response was marked not found.
    pub fn is_not_found(&self) -> bool {
        self.outcome() == &Outcome::NotFound
    }

    /// Registers a hook to run before the next redirect.
    pub fn add_redirect_listener(&mut self, hook: RedirectHook) {
        self.hooks.push(hook);
    }

    /// Returns the number of hooks not yet run.
    pub fn pending_hooks(&self) -> usize {
        self.hooks.len()
    }

    /// Redirects the client to `location`.
    ///
    /// Registered hooks run first, once each, in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first hook failure; the redirect is then not recorded
    /// and the remaining hooks are discarded.
    pub fn redirect_to(&mut self, location: impl Into<String>) -> Result<(), Error> {
        let location = location.into();
        for hook in std::mem::take(&mut self.hooks) {
            hook()?;
        }
        tracing::debug!(location = %location, "redirecting");
        self.outcome = Some(Outcome::Redirect(location));
        Ok(())
    }

    /// Maps the outcome to an HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self.outcome() {
            Outcome::Ok => 200,
            Outcome::NotFound => 404,
            Outcome::Redirect(_) => 302,
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("outcome", self.outcome())
            .field("pending_hooks", &self.hooks.len())
            .finish()
    }
}
