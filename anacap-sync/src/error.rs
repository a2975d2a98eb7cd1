//! Error types for stream synchronization.

use thiserror::Error;

/// Synchronizer error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No row marker was found while searching for the signal.
    #[error("No signal: no row marker in {scanned} bytes")]
    SyncTimeout {
        /// Bytes scanned since the last row marker.
        scanned: usize,
    },

    /// A field carried more active lines than the frame geometry holds.
    #[error("Geometry overflow: row {row} outside a frame of {rows} rows")]
    GeometryOverflow {
        /// Frame row the line would have been woven into.
        row: usize,
        /// Rows in the configured frame.
        rows: usize,
    },

    /// Inconsistent synchronizer configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Core library error.
    #[error("Core error: {0}")]
    Core(#[from] anacap_core::Error),
}

impl SyncError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Check if the stream can keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::SyncTimeout { .. } | SyncError::GeometryOverflow { .. }
        )
    }
}

/// Result type for synchronizer operations.
pub type Result<T> = std::result::Result<T, SyncError>;
