//! Error types for frame rate conversion.

use thiserror::Error;

/// Frame rate conversion error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameRateError {
    /// Zero, negative or unrepresentable frame rate.
    #[error("Invalid frame rate: {0}")]
    InvalidRate(String),

    /// Core library error.
    #[error("Core error: {0}")]
    Core(#[from] anacap_core::Error),
}

/// Result type for frame rate conversion operations.
pub type Result<T> = std::result::Result<T, FrameRateError>;

impl FrameRateError {
    /// Create an invalid frame rate error.
    pub fn invalid_rate(msg: impl Into<String>) -> Self {
        Self::InvalidRate(msg.into())
    }
}
