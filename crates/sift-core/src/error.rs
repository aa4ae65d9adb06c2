//! Error types for sift.

use thiserror::Error;

/// Result type alias for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

/// Errors shared across sift crates.
#[derive(Error, Debug)]
pub enum SiftError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SiftError {
    /// Shorthand for a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is a configuration contract violation.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
