//! Request adapter for mapping HTTP requests to pipeline inputs.

use std::collections::HashMap;

use uuid::Uuid;

use crate::handler::Arguments;
use crate::request::RequestInput;

use super::ExtractInput;

/// Adapter for converting framework-specific HTTP requests into pipeline inputs.
///
/// Holds simple owned data so it does not couple to any framework's
/// request type. Framework code should implement
/// `From<FrameworkRequest>` for `RequestAdapter`.
///
/// # Examples
///
/// ```
/// use request_unit::web::{ExtractInput, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-12345".to_string());
/// adapter.add_form_field("order.orderId".to_string(), "42".to_string());
///
/// let input = adapter.extract_input();
/// assert_eq!(input.field("order.orderId"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    form_fields: HashMap<String, String>,
    query_params: HashMap<String, String>,
    flashed: Option<Arguments>,
}

impl RequestAdapter {
    /// Creates a new request adapter with the given request ID.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            form_fields: HashMap::new(),
            query_params: HashMap::new(),
            flashed: None,
        }
    }

    /// Creates a request adapter with a random request ID.
    pub fn generated() -> Self {
        Self::new(format!("req-{}", Uuid::new_v4()))
    }

    /// Adds a posted form field.
    pub fn add_form_field(&mut self, key: String, value: String) {
        self.form_fields.insert(key, value);
    }

    /// Adds a query parameter.
    pub fn add_query_param(&mut self, key: String, value: String) {
        self.query_params.insert(key, value);
    }

    /// Sets arguments preserved from a previous request.
    pub fn set_flashed_arguments(&mut self, arguments: Arguments) {
        self.flashed = Some(arguments);
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl ExtractInput for RequestAdapter {
    fn request_id(&self) -> String {
        self.request_id.clone()
    }

    fn extract_input(&self) -> RequestInput {
        RequestInput::new(self.form_fields.clone(), self.query_params.clone())
    }

    fn flashed_arguments(&self) -> Option<Arguments> {
        self.flashed.clone()
    }
}
