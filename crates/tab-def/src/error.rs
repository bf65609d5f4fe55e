//! Error types for definition parsing and resolution.

use thiserror::Error;

/// Errors from definition handling and end-to-end resolution.
///
/// Unlike conversion files, definition files degrade per line: a malformed
/// line is logged and skipped unless the parser is configured to propagate.
#[derive(Debug, Error)]
pub enum DefError {
    /// No variable with this display name exists in the definition.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// Category listings are only defined for dimension variables.
    #[error("not a dimension variable: {0}")]
    NotDimension(String),

    /// A malformed definition line, surfaced when propagation is enabled.
    #[error("definition line {line}: {message}")]
    Line { line: usize, message: String },

    /// The referenced conversion path has no known grammar.
    #[error("unsupported conversion file: {path}")]
    UnsupportedConversion { path: String },

    /// The referenced file is absent from the source.
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Convert(#[from] tab_convert::ConvertError),

    #[error(transparent)]
    Access(#[from] tab_model::AccessError),
}

/// Result type for definition operations.
pub type Result<T> = std::result::Result<T, DefError>;
