//! Video standard presets.

use anacap_core::{FrameGeometry, PixelFormat, Rational};
use anacap_framerate::StandardFrameRate;
use anacap_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analog video standard of the capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStandard {
    /// 525 lines, 29.97 frames per second.
    #[default]
    Ntsc,
    /// 625 lines, 25 frames per second.
    Pal,
}

impl VideoStandard {
    /// Get standard name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStandard::Ntsc => "ntsc",
            VideoStandard::Pal => "pal",
        }
    }

    /// Parse standard from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ntsc" | "525" | "480i" => Some(VideoStandard::Ntsc),
            "pal" | "625" | "576i" => Some(VideoStandard::Pal),
            _ => None,
        }
    }

    /// Active picture geometry.
    pub fn geometry(&self) -> FrameGeometry {
        match self {
            VideoStandard::Ntsc => FrameGeometry::new(720, 480, PixelFormat::Uyvy422),
            VideoStandard::Pal => FrameGeometry::new(720, 576, PixelFormat::Uyvy422),
        }
    }

    /// Bytes per line at 27 MHz 4:2:2 sampling, timing codes included.
    pub fn line_bytes(&self) -> usize {
        match self {
            VideoStandard::Ntsc => 1716,
            VideoStandard::Pal => 1728,
        }
    }

    /// Total lines per frame, blanking included.
    pub fn total_lines(&self) -> usize {
        match self {
            VideoStandard::Ntsc => 525,
            VideoStandard::Pal => 625,
        }
    }

    /// Frame rate.
    pub fn frame_rate(&self) -> StandardFrameRate {
        match self {
            VideoStandard::Ntsc => StandardFrameRate::Ntsc30,
            VideoStandard::Pal => StandardFrameRate::Pal25,
        }
    }

    /// Field rate, two fields per frame.
    pub fn field_rate(&self) -> Rational {
        match self {
            VideoStandard::Ntsc => StandardFrameRate::Ntsc60i.to_rational(),
            VideoStandard::Pal => StandardFrameRate::Pal50i.to_rational(),
        }
    }

    /// Vertical blanking lines before each field.
    pub fn blanking_lines(&self) -> usize {
        (self.total_lines() - self.geometry().height as usize) / 2
    }

    /// Synchronizer configuration for this standard.
    ///
    /// The discard budget depends on how much the capture hardware jitters
    /// and has to be supplied.
    pub fn sync_config(&self, discard_budget: usize) -> SyncConfig {
        SyncConfig::new(self.geometry(), self.line_bytes(), discard_budget)
    }
}

impl fmt::Display for VideoStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(VideoStandard::parse("NTSC"), Some(VideoStandard::Ntsc));
        assert_eq!(VideoStandard::parse("576i"), Some(VideoStandard::Pal));
        assert_eq!(VideoStandard::parse("secam"), None);
        for standard in [VideoStandard::Ntsc, VideoStandard::Pal] {
            assert_eq!(VideoStandard::parse(standard.as_str()), Some(standard));
        }
    }

    #[test]
    fn test_presets_are_valid() {
        for standard in [VideoStandard::Ntsc, VideoStandard::Pal] {
            assert!(standard.sync_config(64).validate().is_ok());
        }
        assert_eq!(VideoStandard::Ntsc.blanking_lines(), 22);
        assert_eq!(VideoStandard::Pal.blanking_lines(), 24);
        assert_eq!(VideoStandard::Pal.sync_config(32).row_bytes(), 1440);
    }

    #[test]
    fn test_rates() {
        assert_eq!(
            VideoStandard::Ntsc.frame_rate().to_rational(),
            Rational::new_const(30000, 1001)
        );
        assert_eq!(VideoStandard::Pal.field_rate(), Rational::from_int(50));
    }
}
