//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the pipeline:
//! - `RequestAdapter` maps a framework request to request id, posted
//!   fields and flashed arguments
//! - `Response` collects the outcome (ok, not found, redirect) and runs
//!   redirect hooks before a redirect is recorded
//!
//! # Integration Model
//!
//! Framework-specific code should:
//! 1. Build a `RequestAdapter` from the framework request
//! 2. Hand it to [`Dispatcher::dispatch`](crate::dispatch::Dispatcher::dispatch)
//!    together with the matched [`Route`](crate::handler::Route)
//! 3. Map the returned `Response` outcome to a framework response
//!
//! No framework types appear here.

mod adapter;
mod extract;
mod response;

pub use adapter::RequestAdapter;
pub use extract::ExtractInput;
pub use response::{Outcome, RedirectHook, Response};
