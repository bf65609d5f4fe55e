//! Record values, resolution outcomes, and the record-access capability.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw field value as it appears in a source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Character data, already decoded.
    Text(String),
    /// Numeric data. Rendered without a trailing `.0` for whole numbers.
    Number(f64),
}

impl Value {
    /// The value as lookup-key text.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// The outcome of resolving one variable against one record.
///
/// `NoMatch` is a deliberate outcome, not an error: the extracted value is
/// absent from the conversion file. It is distinct from the blank/empty
/// path, which resolves through the file's designated empty category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolved {
    /// A category description from a conversion file.
    Label(String),
    /// The raw value, passed through unchanged (increment variables).
    Raw(Value),
    /// No category matched the extracted value.
    NoMatch,
}

impl Resolved {
    /// The label, when this outcome carries one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Label(s) => Some(s),
            _ => None,
        }
    }
}

/// Errors raised by record-access implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The named field is not part of the record or its schema.
    #[error("field not found: {0}")]
    FieldNotFound(String),
}

/// Result type for record-access operations.
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Abstract access to records, so the same extraction and resolution logic
/// runs over different containers (single records, columnar batches).
///
/// Conversion metadata names only the first physical field, a starting
/// position, and a value length; when the value length extends beyond that
/// field, the remaining characters come from the following fields in schema
/// order. Implementations own that spanning logic.
pub trait RecordAccess {
    /// The record container this implementation reads from.
    type Record: ?Sized;
    /// Extracted lookup key(s): one string, or one per batch element.
    type Keys;
    /// Resolution output(s): one outcome, or one per batch element, in input
    /// order.
    type Output;

    /// Extract `length` characters starting at `record[field][start]`,
    /// reading into the following schema fields when `field` is too short.
    fn extract_range(
        &self,
        record: &Self::Record,
        field: &str,
        start: usize,
        length: usize,
    ) -> AccessResult<Self::Keys>;

    /// The full decoded content of a field, as lookup-key text.
    fn extract_key(&self, record: &Self::Record, field: &str) -> AccessResult<Self::Keys>;

    /// The raw value of a field, passed through as an output.
    fn extract_raw(&self, record: &Self::Record, field: &str) -> AccessResult<Self::Output>;

    /// Apply a resolution function to extracted keys, element-wise for
    /// batched implementations, preserving order and length.
    fn map<F>(&self, keys: Self::Keys, resolve: F) -> Self::Output
    where
        F: Fn(&str) -> Resolved;
}
