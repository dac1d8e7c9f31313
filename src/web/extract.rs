//! Extraction boundary trait for web integration.

use crate::handler::Arguments;
use crate::request::RequestInput;

/// Extracts pipeline inputs from a framework-specific request.
///
/// Framework integrations implement this to provide the request id, the
/// posted fields, and any arguments flashed from a previous request.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use request_unit::request::RequestInput;
/// use request_unit::web::ExtractInput;
///
/// struct MyFrameworkRequest {
///     id: String,
///     form: HashMap<String, String>,
/// }
///
/// impl ExtractInput for MyFrameworkRequest {
///     fn request_id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn extract_input(&self) -> RequestInput {
///         RequestInput::new(self.form.clone(), HashMap::new())
///     }
/// }
///
/// let req = MyFrameworkRequest { id: "req-1".into(), form: HashMap::new() };
/// assert!(req.extract_input().is_empty());
/// assert!(req.flashed_arguments().is_none());
/// ```
pub trait ExtractInput {
    /// Returns the request identifier used in logs and events.
    fn request_id(&self) -> String;

    /// Returns all posted fields.
    fn extract_input(&self) -> RequestInput;

    /// Returns arguments preserved from a previous request, if any.
    fn flashed_arguments(&self) -> Option<Arguments> {
        None
    }
}
