//! Synchronizer configuration.

use crate::error::{Result, SyncError};
use crate::marker::MARKER_LEN;
use anacap_core::{FieldOrder, FrameGeometry};
use serde::{Deserialize, Serialize};

/// Default number of correctly spaced row markers needed to lock.
pub const DEFAULT_LOCK_THRESHOLD: u32 = 2;

/// Default number of silent line periods before a timeout is reported.
pub const DEFAULT_TIMEOUT_LINES: usize = 1000;

fn default_lock_threshold() -> u32 {
    DEFAULT_LOCK_THRESHOLD
}

fn default_timeout_lines() -> usize {
    DEFAULT_TIMEOUT_LINES
}

/// Configuration of a [`Synchronizer`](crate::Synchronizer).
///
/// `line_bytes` and `discard_budget` depend on the capture hardware and have
/// no defaults; everything else falls back to values that work for standard
/// definition sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Geometry of the decoded frame.
    pub geometry: FrameGeometry,
    /// Bytes from one row start to the next, markers and blanking included.
    pub line_bytes: usize,
    /// Bytes past the expected marker position tolerated before the lock is
    /// dropped.
    pub discard_budget: usize,
    /// Consecutive correctly spaced row markers required to lock.
    #[serde(default = "default_lock_threshold")]
    pub lock_threshold: u32,
    /// Deviation from `line_bytes` still counted as correctly spaced.
    #[serde(default)]
    pub line_tolerance: usize,
    /// Bytes skipped after losing the lock before searching again.
    #[serde(default)]
    pub resync_discard: usize,
    /// Silent line periods without any row marker before a timeout.
    #[serde(default = "default_timeout_lines")]
    pub timeout_lines: usize,
    /// Which transmitted field carries the top rows.
    #[serde(default)]
    pub field_order: FieldOrder,
}

impl SyncConfig {
    /// Create a configuration with default lock parameters.
    pub fn new(geometry: FrameGeometry, line_bytes: usize, discard_budget: usize) -> Self {
        Self {
            geometry,
            line_bytes,
            discard_budget,
            lock_threshold: DEFAULT_LOCK_THRESHOLD,
            line_tolerance: 0,
            resync_discard: 0,
            timeout_lines: DEFAULT_TIMEOUT_LINES,
            field_order: FieldOrder::default(),
        }
    }

    /// Set the lock threshold.
    pub fn with_lock_threshold(mut self, threshold: u32) -> Self {
        self.lock_threshold = threshold;
        self
    }

    /// Set the line spacing tolerance.
    pub fn with_line_tolerance(mut self, tolerance: usize) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the bytes skipped after a lock loss.
    pub fn with_resync_discard(mut self, bytes: usize) -> Self {
        self.resync_discard = bytes;
        self
    }

    /// Set the timeout in line periods.
    pub fn with_timeout_lines(mut self, lines: usize) -> Self {
        self.timeout_lines = lines;
        self
    }

    /// Set the field order.
    pub fn with_field_order(mut self, order: FieldOrder) -> Self {
        self.field_order = order;
        self
    }

    /// Bytes of pixel data per row.
    pub fn row_bytes(&self) -> usize {
        self.geometry.row_bytes()
    }

    /// Furthest distance from one row start to the next before the lock is
    /// lost.
    pub fn scan_limit(&self) -> usize {
        self.line_bytes.saturating_add(self.discard_budget)
    }

    /// Bytes without a row marker that make up one timeout.
    pub fn timeout_bytes(&self) -> usize {
        self.timeout_lines.saturating_mul(self.line_bytes)
    }

    /// Whether the distance between two row starts matches the line length.
    pub fn is_line_spacing(&self, spacing: usize) -> bool {
        spacing.abs_diff(self.line_bytes) <= self.line_tolerance
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;

        let min_line = self
            .row_bytes()
            .checked_add(2 * MARKER_LEN)
            .ok_or_else(|| SyncError::invalid_config("row_bytes overflows a line"))?;
        if self.line_bytes < min_line {
            return Err(SyncError::invalid_config(format!(
                "line_bytes {} cannot hold a {} byte row and two markers",
                self.line_bytes,
                self.row_bytes()
            )));
        }
        if self.discard_budget == 0 {
            return Err(SyncError::invalid_config("discard_budget must be positive"));
        }
        if self.lock_threshold < 2 {
            return Err(SyncError::invalid_config(format!(
                "lock_threshold {} cannot establish a line period",
                self.lock_threshold
            )));
        }
        if self.line_tolerance > self.discard_budget {
            return Err(SyncError::invalid_config(format!(
                "line_tolerance {} exceeds discard_budget {}",
                self.line_tolerance, self.discard_budget
            )));
        }
        if self.line_tolerance >= self.line_bytes.div_ceil(2) {
            return Err(SyncError::invalid_config(format!(
                "line_tolerance {} is too loose for {} byte lines",
                self.line_tolerance, self.line_bytes
            )));
        }
        if self.timeout_lines == 0 {
            return Err(SyncError::invalid_config("timeout_lines must be positive"));
        }
        if self.line_bytes.checked_add(self.discard_budget).is_none() {
            return Err(SyncError::invalid_config(format!(
                "discard_budget {} overflows the scan window",
                self.discard_budget
            )));
        }
        Ok(())
    }
}
