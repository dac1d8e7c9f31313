//! Converters from raw request strings to identifier values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::entity::IdValue;
use crate::metadata::{EntityType, IdKind};

/// A raw string that could not be converted.
///
/// Conversion failures are input problems: the loader answers them with
/// not-found rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("'{raw}' is not a valid {kind} id")]
pub struct ConversionError {
    /// Target identifier type
    pub kind: IdKind,
    /// The rejected input
    pub raw: String,
}

/// Converts a raw request string into an identifier of one [`IdKind`].
pub trait Converter: Send + Sync {
    /// Converts `raw` into an id for an entity of type `target`.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if `raw` is not a valid value.
    fn convert(&self, raw: &str, target: EntityType) -> Result<IdValue, ConversionError>;
}

impl<F> Converter for F
where
    F: Fn(&str, EntityType) -> Result<IdValue, ConversionError> + Send + Sync,
{
    fn convert(&self, raw: &str, target: EntityType) -> Result<IdValue, ConversionError> {
        self(raw, target)
    }
}

/// Parses `i64` ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongConverter;

impl Converter for LongConverter {
    fn convert(&self, raw: &str, _target: EntityType) -> Result<IdValue, ConversionError> {
        raw.trim()
            .parse::<i64>()
            .map(IdValue::Long)
            .map_err(|_| rejected(IdKind::Long, raw))
    }
}

/// Parses `i32` ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl Converter for IntegerConverter {
    fn convert(&self, raw: &str, _target: EntityType) -> Result<IdValue, ConversionError> {
        raw.trim()
            .parse::<i32>()
            .map(IdValue::Integer)
            .map_err(|_| rejected(IdKind::Integer, raw))
    }
}

/// Passes string ids through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn convert(&self, raw: &str, _target: EntityType) -> Result<IdValue, ConversionError> {
        Ok(IdValue::Text(raw.to_string()))
    }
}

/// Parses hyphenated or simple UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidConverter;

impl Converter for UuidConverter {
    fn convert(&self, raw: &str, _target: EntityType) -> Result<IdValue, ConversionError> {
        Uuid::parse_str(raw.trim())
            .map(IdValue::Uuid)
            .map_err(|_| rejected(IdKind::Uuid, raw))
    }
}

fn rejected(kind: IdKind, raw: &str) -> ConversionError {
    ConversionError {
        kind,
        raw: raw.to_string(),
    }
}

/// Registry of converters keyed by identifier type.
///
/// # Examples
///
/// ```
/// use request_unit::convert::Converters;
/// use request_unit::entity::IdValue;
/// use request_unit::metadata::{EntityType, IdKind};
///
/// let converters = Converters::defaults();
/// let long = converters.converter_for(IdKind::Long).unwrap();
/// assert_eq!(
///     long.convert("42", EntityType::named("Order")).unwrap(),
///     IdValue::Long(42)
/// );
/// ```
#[derive(Clone, Default)]
pub struct Converters {
    by_kind: HashMap<IdKind, Arc<dyn Converter>>,
}

impl Converters {
    /// Creates a registry with no converters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with a converter for every [`IdKind`].
    pub fn defaults() -> Self {
        Self::empty()
            .register(IdKind::Long, LongConverter)
            .register(IdKind::Integer, IntegerConverter)
            .register(IdKind::Text, TextConverter)
            .register(IdKind::Uuid, UuidConverter)
    }

    /// Registers (or replaces) the converter for `kind`.
    pub fn register(mut self, kind: IdKind, converter: impl Converter + 'static) -> Self {
        self.by_kind.insert(kind, Arc::new(converter));
        self
    }

    /// Removes the converter for `kind`.
    pub fn without(mut self, kind: IdKind) -> Self {
        self.by_kind.remove(&kind);
        self
    }

    /// Returns the converter registered for `kind`.
    pub fn converter_for(&self, kind: IdKind) -> Option<&dyn Converter> {
        self.by_kind.get(&kind).map(|c| c.as_ref())
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converters")
            .field("kinds", &self.by_kind.keys().collect::<Vec<_>>())
            .finish()
    }
}
