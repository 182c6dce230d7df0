//! Index error types
//!
//! # Error Types
//!
//! - **`Unavailable`**: the index has not been built, its tables are missing,
//!   or SQLite stayed busy past the configured timeout
//! - **`Sqlite`**: any other failure reported by SQLite
//! - **`NotFound`**: no note with the requested id
//! - **`InvalidInput`**: a request the index refuses (duplicate id, bad projection)
//!
//! Callers that render results treat `Unavailable` as recoverable: they show
//! an empty list plus a status line instead of aborting.

use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Index-specific errors
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index cannot serve lookups right now
    #[error("Index unavailable: {0}")]
    Unavailable(String),

    /// An index file already exists where one was about to be created
    #[error("Index already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Represents a SQLite error
    #[error("Index error: {0}")]
    Sqlite(rusqlite::Error),

    /// No note with this id
    #[error("Note not found: {0}")]
    NotFound(String),

    /// A stored value could not be decoded
    #[error("Corrupt record for {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Invalid input provided (e.g., a projection without `id`)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Represents an I/O error while preparing the index location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Whether the error means "no index" rather than "lookup failed"
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<rusqlite::Error> for IndexError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err
            && matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::NotADatabase
            )
        {
            return Self::Unavailable(err.to_string());
        }
        // Tables dropped behind our back surface at prepare time
        if err.to_string().contains("no such table") {
            return Self::Unavailable(err.to_string());
        }
        Self::Sqlite(err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
