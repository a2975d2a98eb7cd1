//! Error types shared by the anacap crates.

use thiserror::Error;

/// Main error type for the core library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Zero or negative rate, or a zero denominator.
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid rate error.
    pub fn invalid_rate(msg: impl Into<String>) -> Self {
        Self::InvalidRate(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;
