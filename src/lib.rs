//! Zettel - incremental note finder for a plain-text Zettelkasten
//!
//! Notes live in a vault directory next to a small SQLite index of their
//! titles, authors, dates, tags and links. The finder compiles a live query
//! (free text with inline `#tag` and `[[link]]` tokens) into a filter, looks
//! it up in the index on every keystroke and lets the user pick one note.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod finder;
pub mod index;
pub mod ui;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum ZettelError {
    /// Index lookup or maintenance failed
    #[error("{0}")]
    Index(#[from] index::IndexError),
    /// Terminal failure
    #[error("Terminal error: {0}")]
    Ui(#[from] ui::UiError),
    /// Query compiler setup failed
    #[error("Query error: {0}")]
    Filter(#[from] filter::FilterError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ZettelError>;
