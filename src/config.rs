//! Pipeline configuration.

use serde::Deserialize;

use crate::error::Error;
use crate::identifier::SupertypeWalk;
use crate::interceptor::TransactionScope;

/// Settings for the default pipeline built by
/// [`Dispatcher::from_config`](crate::dispatch::Dispatcher::from_config).
///
/// Every field is optional in serialized form.
///
/// # Examples
///
/// ```
/// use request_unit::config::PipelineConfig;
/// use request_unit::identifier::SupertypeWalk;
/// use request_unit::interceptor::TransactionScope;
///
/// let config = PipelineConfig::from_json_str(
///     r#"{ "transaction_scope": "annotated_only", "identifier_lookup": "full_chain" }"#,
/// ).unwrap();
///
/// assert_eq!(config.transaction_scope, TransactionScope::AnnotatedOnly);
/// assert_eq!(config.identifier_lookup, SupertypeWalk::FullChain);
/// assert!(config.positional_arguments);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Which handlers get a transaction
    pub transaction_scope: TransactionScope,
    /// How far up the supertype chain identifier lookup goes
    pub identifier_lookup: SupertypeWalk,
    /// Whether requests get positional argument slots; when off, loaded
    /// entities are published as request attributes
    pub positional_arguments: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            transaction_scope: TransactionScope::EveryRequest,
            identifier_lookup: SupertypeWalk::SingleHop,
            positional_arguments: true,
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed JSON or unknown enum values.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(PipelineConfig::from_json_str("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn reads_every_field() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "transaction_scope": "every_request",
                "identifier_lookup": "single_hop",
                "positional_arguments": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.transaction_scope, TransactionScope::EveryRequest);
        assert_eq!(config.identifier_lookup, SupertypeWalk::SingleHop);
        assert!(!config.positional_arguments);
    }

    #[test]
    fn rejects_unknown_scope() {
        let err = PipelineConfig::from_json_str(r#"{ "transaction_scope": "sometimes" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("configuration error"));
    }
}
