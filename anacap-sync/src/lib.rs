//! # anacap-sync
//!
//! Bitstream synchronizer for analog capture devices.
//!
//! USB capture hardware delivers the digitized video as one long byte stream
//! with BT.656-style timing reference codes in it, cut into transfers of
//! arbitrary size. This crate recovers the row and field structure from that
//! stream and weaves the two fields of every frame into a frame storage.
//!
//! ## Quick Start
//!
//! ```no_run
//! use anacap_core::{FrameGeometry, FrameStore, PixelFormat};
//! use anacap_sync::{SyncConfig, SyncState, Synchronizer};
//!
//! let geometry = FrameGeometry::new(720, 480, PixelFormat::Uyvy422);
//! let sync = Synchronizer::new(SyncConfig::new(geometry, 1716, 64))?;
//!
//! let mut state = SyncState::new();
//! let mut store = FrameStore::new(geometry);
//!
//! // for chunk in transfers {
//! //     let report = sync.process(&mut state, chunk, &mut store)?;
//! // }
//! # Ok::<(), anacap_sync::SyncError>(())
//! ```
//!
//! ## Lock Behavior
//!
//! | State | Entered when | Storage writes |
//! |-------|--------------|----------------|
//! | Unlocked | start, lock loss | none |
//! | Locked, searching | `lock_threshold` markers one line apart | none |
//! | Locked, woven | first field boundary after locking | every active row |
//!
//! The lock is dropped when no row marker shows up within `line_bytes +
//! discard_budget` bytes of the previous one, or after two consecutive
//! mis-spaced markers. A partially woven frame is discarded at that point.

pub mod carry;
pub mod config;
pub mod error;
pub mod marker;
pub mod state;
pub mod synchronizer;
pub mod synth;

// Re-export main types
pub use carry::{CarryScan, MarkerCarry};
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use marker::{
    find_field_start, find_row_start, timing_reference, MarkerFlags, MARKER_LEN,
};
pub use state::{FieldCursor, SyncState, VerticalState};
pub use synchronizer::{SyncReport, Synchronizer};
pub use synth::{PixelPattern, StreamSynthesizer};
