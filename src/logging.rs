//! Request-id-bound logging.

use std::fmt;

/// Request-bound logging handle.
///
/// Obtained from [`RequestContext::log`](crate::context::RequestContext::log).
/// Every line carries the request id so one request can be followed
/// through the pipeline stages.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for `request_id`.
    pub fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &'a str {
        self.request_id
    }

    /// Logs an info-level message with request ID.
    ///
    /// ```
    /// # use request_unit::logging::RequestLog;
    /// let log = RequestLog::new("req-1");
    /// log.info(format_args!("loaded {}", "order"));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs an error-level message with request ID.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}
