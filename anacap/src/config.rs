//! Capture session configuration.
//!
//! A session is described by a small JSON document:
//!
//! ```json
//! {
//!     "standard": "ntsc",
//!     "discard_budget": 64,
//!     "target_rate": [60, 1],
//!     "sync": { "line_tolerance": 2 },
//!     "no_signal_after": 3
//! }
//! ```
//!
//! Only `discard_budget` is mandatory. Sync values not overridden come from
//! the video standard preset, and the source rate defaults to the standard's
//! frame rate.

use crate::error::{CaptureError, Result};
use crate::presets::VideoStandard;
use anacap_core::{FieldOrder, PixelFormat, Rational};
use anacap_sync::SyncConfig;
use serde::{Deserialize, Serialize};

/// Default display rate.
pub const DEFAULT_TARGET_RATE: Rational = Rational::new_const(60, 1);

/// Default consecutive timeouts before the signal is reported lost.
pub const DEFAULT_NO_SIGNAL_AFTER: u32 = 3;

fn default_target_rate() -> Rational {
    DEFAULT_TARGET_RATE
}

fn default_no_signal_after() -> u32 {
    DEFAULT_NO_SIGNAL_AFTER
}

/// Overrides applied on top of a video standard's sync preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOverrides {
    /// Pixel format of the stream.
    pub format: Option<PixelFormat>,
    /// Bytes per line.
    pub line_bytes: Option<usize>,
    /// Markers needed to lock.
    pub lock_threshold: Option<u32>,
    /// Line spacing tolerance.
    pub line_tolerance: Option<usize>,
    /// Bytes skipped after a lock loss.
    pub resync_discard: Option<usize>,
    /// Silent line periods per timeout.
    pub timeout_lines: Option<usize>,
    /// Field order.
    pub field_order: Option<FieldOrder>,
}

/// Configuration of a capture session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Video standard of the source.
    #[serde(default)]
    pub standard: VideoStandard,
    /// Bytes past the expected row marker tolerated before the lock is lost.
    pub discard_budget: usize,
    /// Sync preset overrides.
    #[serde(default)]
    pub sync: SyncOverrides,
    /// Source frame rate, the standard's rate when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_rate: Option<Rational>,
    /// Display rate.
    #[serde(default = "default_target_rate")]
    pub target_rate: Rational,
    /// Consecutive sync timeouts before reporting no signal.
    #[serde(default = "default_no_signal_after")]
    pub no_signal_after: u32,
}

impl CaptureConfig {
    /// Create a configuration for a standard with preset defaults.
    pub fn new(standard: VideoStandard, discard_budget: usize) -> Self {
        Self {
            standard,
            discard_budget,
            sync: SyncOverrides::default(),
            source_rate: None,
            target_rate: DEFAULT_TARGET_RATE,
            no_signal_after: DEFAULT_NO_SIGNAL_AFTER,
        }
    }

    /// Set the display rate.
    pub fn with_target_rate(mut self, rate: Rational) -> Self {
        self.target_rate = rate;
        self
    }

    /// Set the source rate.
    pub fn with_source_rate(mut self, rate: Rational) -> Self {
        self.source_rate = Some(rate);
        self
    }

    /// Set the sync overrides.
    pub fn with_sync(mut self, sync: SyncOverrides) -> Self {
        self.sync = sync;
        self
    }

    /// Set the number of timeouts before reporting no signal.
    pub fn with_no_signal_after(mut self, timeouts: u32) -> Self {
        self.no_signal_after = timeouts;
        self
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Source frame rate.
    pub fn source_rate(&self) -> Rational {
        self.source_rate
            .unwrap_or_else(|| self.standard.frame_rate().to_rational())
    }

    /// Synchronizer configuration with the overrides applied.
    pub fn sync_config(&self) -> SyncConfig {
        let mut config = self.standard.sync_config(self.discard_budget);
        let sync = &self.sync;
        if let Some(format) = sync.format {
            config.geometry.format = format;
        }
        if let Some(line_bytes) = sync.line_bytes {
            config.line_bytes = line_bytes;
        }
        if let Some(threshold) = sync.lock_threshold {
            config.lock_threshold = threshold;
        }
        if let Some(tolerance) = sync.line_tolerance {
            config.line_tolerance = tolerance;
        }
        if let Some(discard) = sync.resync_discard {
            config.resync_discard = discard;
        }
        if let Some(lines) = sync.timeout_lines {
            config.timeout_lines = lines;
        }
        if let Some(order) = sync.field_order {
            config.field_order = order;
        }
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.sync_config().validate()?;
        if !self.source_rate().is_positive() {
            return Err(CaptureError::config(format!(
                "source rate {} must be positive",
                self.source_rate()
            )));
        }
        if !self.target_rate.is_positive() {
            return Err(CaptureError::config(format!(
                "target rate {} must be positive",
                self.target_rate
            )));
        }
        if self.no_signal_after == 0 {
            return Err(CaptureError::config("no_signal_after must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json() {
        let config = CaptureConfig::from_json(r#"{ "discard_budget": 64 }"#).unwrap();
        assert_eq!(config.standard, VideoStandard::Ntsc);
        assert_eq!(config.source_rate(), Rational::new_const(30000, 1001));
        assert_eq!(config.target_rate, DEFAULT_TARGET_RATE);
        assert_eq!(config.sync_config().line_bytes, 1716);
    }

    #[test]
    fn test_discard_budget_required() {
        let err = CaptureConfig::from_json(r#"{ "standard": "pal" }"#).unwrap_err();
        assert!(matches!(err, CaptureError::Json(_)));
    }

    #[test]
    fn test_overrides() {
        let json = r#"{
            "standard": "pal",
            "discard_budget": 32,
            "target_rate": [50, 1],
            "sync": { "line_tolerance": 2, "field_order": "bottom_field_first" }
        }"#;
        let config = CaptureConfig::from_json(json).unwrap();
        let sync = config.sync_config();
        assert_eq!(sync.line_bytes, 1728);
        assert_eq!(sync.line_tolerance, 2);
        assert_eq!(sync.field_order, FieldOrder::BottomFieldFirst);
        assert_eq!(config.target_rate, Rational::from_int(50));
    }

    #[test]
    fn test_rejects_invalid() {
        let config = CaptureConfig::new(VideoStandard::Ntsc, 64).with_target_rate(Rational::zero());
        assert!(matches!(config.validate(), Err(CaptureError::Config(_))));

        let config = CaptureConfig::new(VideoStandard::Ntsc, 0);
        assert!(matches!(config.validate(), Err(CaptureError::Sync(_))));

        let json = r#"{ "discard_budget": 64, "sync": { "line_bytes": 100 } }"#;
        assert!(CaptureConfig::from_json(json).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = CaptureConfig::new(VideoStandard::Pal, 48)
            .with_source_rate(Rational::from_int(25))
            .with_no_signal_after(5);
        let parsed = CaptureConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
