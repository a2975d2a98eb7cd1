//! Prelude module for convenient imports.
//!
//! ```rust
//! use anacap::prelude::*;
//! ```

// Error types
pub use crate::{CaptureError, Result};

// Frame types
pub use crate::{FieldOrder, FrameBuffer, FrameGeometry, PixelFormat, Rational};

// Pipeline
pub use crate::{CaptureConfig, CapturePipeline, Presenter, SignalStatus, VideoStandard};
