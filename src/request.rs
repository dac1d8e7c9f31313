//! Raw request input and request attributes.

use std::collections::HashMap;

use crate::entity::EntityHandle;

/// Untyped request parameters, as posted.
///
/// Form fields shadow query parameters of the same name.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    form_fields: HashMap<String, String>,
    query_params: HashMap<String, String>,
}

impl RequestInput {
    /// Creates input from form fields and query parameters.
    pub fn new(
        form_fields: HashMap<String, String>,
        query_params: HashMap<String, String>,
    ) -> Self {
        Self {
            form_fields,
            query_params,
        }
    }

    /// Returns the raw value of `name`, if posted.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form_fields
            .get(name)
            .or_else(|| self.query_params.get(name))
            .map(String::as_str)
    }

    /// Returns the number of distinct field names.
    pub fn len(&self) -> usize {
        self.form_fields.len()
            + self
                .query_params
                .keys()
                .filter(|k| !self.form_fields.contains_key(*k))
                .count()
    }

    /// Returns true if nothing was posted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named request attributes read by later pipeline stages and views.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    values: HashMap<String, EntityHandle>,
}

impl Attributes {
    /// Sets `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: EntityHandle) {
        self.values.insert(name.into(), value);
    }

    /// Returns the value of `name`.
    pub fn get(&self, name: &str) -> Option<&EntityHandle> {
        self.values.get(name)
    }

    /// Returns true if `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
