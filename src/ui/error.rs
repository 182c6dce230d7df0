//! UI error types

use thiserror::Error;

/// Errors that can occur in UI operations
///
/// All of them end the finder: the terminal is restored and the error is
/// handed to the caller.
#[derive(Debug, Error)]
pub enum UiError {
    /// The terminal could not be sized, drawn to or read from
    #[error("Terminal error: {0}")]
    TerminalError(String),

    /// Invalid configuration
    #[error("Invalid UI configuration: {0}")]
    InvalidConfig(String),

    /// IO error during UI operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for UI operations
pub type Result<T> = std::result::Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = UiError::TerminalError("size unavailable".to_string());
        assert_eq!(error.to_string(), "Terminal error: size unavailable");

        let error = UiError::InvalidConfig("empty pointer".to_string());
        assert_eq!(error.to_string(), "Invalid UI configuration: empty pointer");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let error: UiError = io.into();
        assert!(matches!(error, UiError::IoError(_)));
    }
}
