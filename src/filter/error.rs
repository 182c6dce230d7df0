//! Filter and query compiler error types

use thiserror::Error;

/// Errors raised while building filters
///
/// Malformed query text is never an error: unclosed link delimiters simply
/// stay in the free-text part of the query.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Link delimiters must be non-empty
    #[error("Invalid link delimiter: {0:?}")]
    InvalidDelimiter(String),

    /// Column name not known to the index
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Token regex could not be built
    #[error("Failed to build token pattern: {0}")]
    PatternError(#[from] regex::Error),
}
