//! Error types for conversion file parsing.

use thiserror::Error;

/// Errors from parsing a conversion file.
///
/// Header and body-line shape failures are fatal for the file being parsed;
/// a file that fails structurally is never cached. Missing category slots
/// and description mismatches are logged instead, matching the tolerant
/// behavior of the legacy tooling.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The header line does not match `FORMAT? count length TYPE?`.
    #[error("invalid header at line {line}: {content}")]
    MalformedHeader { line: usize, content: String },

    /// A body line does not match the fixed-column layout.
    #[error("invalid line {line}: {content}")]
    MalformedBodyLine { line: usize, content: String },

    /// A table-backed conversion source could not be read.
    #[error("invalid conversion table {name}: {message}")]
    Table { name: String, message: String },
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
