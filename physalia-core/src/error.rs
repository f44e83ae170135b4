//! Structured error types for the Physalia toolkit.

use thiserror::Error;

/// Unified error type for all Physalia operations.
#[derive(Debug, Error)]
pub enum PhysaliaError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed input data)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the Physalia toolkit.
pub type Result<T> = std::result::Result<T, PhysaliaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = PhysaliaError::InvalidInput("node id 7 out of range".into());
        assert_eq!(err.to_string(), "invalid input: node id 7 out of range");
    }

    #[test]
    fn io_errors_convert() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/physalia")?)
        }
        assert!(matches!(read_missing(), Err(PhysaliaError::Io(_))));
    }
}
