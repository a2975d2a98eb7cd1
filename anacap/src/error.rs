//! Error types for the capture pipeline.

use anacap_framerate::FrameRateError;
use anacap_sync::SyncError;
use thiserror::Error;

/// Capture pipeline error types.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Stream synchronization error.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Frame rate conversion error.
    #[error("Frame rate error: {0}")]
    FrameRate(#[from] FrameRateError),

    /// Core library error.
    #[error("Core error: {0}")]
    Core(#[from] anacap_core::Error),

    /// Invalid capture configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The device delivers bytes but no video signal.
    #[error("No signal: {timeouts} consecutive sync timeouts")]
    NoSignal {
        /// Consecutive timeouts observed.
        timeouts: u32,
    },
}

impl CaptureError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if capture can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CaptureError::Sync(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

/// Result type for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recoverable() {
        assert!(CaptureError::from(SyncError::SyncTimeout { scanned: 1 }).is_recoverable());
        assert!(!CaptureError::NoSignal { timeouts: 3 }.is_recoverable());
        assert!(!CaptureError::config("bad").is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = CaptureError::NoSignal { timeouts: 3 };
        assert_eq!(err.to_string(), "No signal: 3 consecutive sync timeouts");
    }
}
