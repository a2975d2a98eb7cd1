//! # Anacap
//!
//! Capture pipeline for USB analog video grabbers.
//!
//! The device delivers raw BT.656-style bytes in transfers of arbitrary
//! size. This crate ties together:
//! - `anacap-sync`: recovering rows and fields from the byte stream
//! - `anacap-core`: frame geometry, buffers and exact rationals
//! - `anacap-framerate`: pacing source frames onto the display rate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anacap::{CaptureConfig, CapturePipeline, FrameBuffer, Presenter, VideoStandard};
//!
//! struct Display;
//!
//! impl Presenter for Display {
//!     fn present(&mut self, frame: &FrameBuffer, repeat_count: u64) {
//!         // show `frame` for `repeat_count` vsyncs
//!     }
//! }
//!
//! fn main() -> anacap::Result<()> {
//!     let config = CaptureConfig::new(VideoStandard::Ntsc, 64);
//!     let mut pipeline = CapturePipeline::new(&config, Display)?;
//!
//!     let transfer = vec![0u8; 16 * 1024];
//!     pipeline.push(&transfer)?;
//!     pipeline.ensure_signal()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod monitor;
pub mod pipeline;
pub mod prelude;
pub mod presets;

// Re-export core types
pub use anacap_core::{
    Field, FieldOrder, FieldSet, FrameBuffer, FrameGeometry, FrameStorage, FrameStore,
    PixelFormat, Rational,
};

// Re-export sync types
pub use anacap_sync::{
    PixelPattern, StreamSynthesizer, SyncConfig, SyncError, SyncReport, SyncState, Synchronizer,
};

// Re-export frame rate types
pub use anacap_framerate::{FrameRateConverter, FrameRepeatSchedule, StandardFrameRate};

// High-level API
pub use config::{CaptureConfig, SyncOverrides};
pub use error::{CaptureError, Result};
pub use monitor::{SignalMonitor, SignalStatus};
pub use pipeline::{CapturePipeline, PipelineStats, Presenter};
pub use presets::VideoStandard;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version.
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
