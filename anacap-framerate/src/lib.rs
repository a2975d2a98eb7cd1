//! # anacap-framerate
//!
//! Frame rate pacing for the anacap capture pipeline.
//!
//! A capture source delivers frames at its own cadence (29.97 fps for NTSC,
//! 25 fps for PAL) while the display refreshes at another. This crate
//! computes how many display intervals each source frame is shown for,
//! using exact rational arithmetic so the cumulative error stays below one
//! display interval for the whole session.
//!
//! ## Quick Start
//!
//! ```
//! use anacap_framerate::{FrameRateConverter, StandardFrameRate};
//!
//! let mut converter =
//!     FrameRateConverter::standard(StandardFrameRate::Film24, StandardFrameRate::Hfr60)?;
//!
//! // 3:2 pulldown
//! let counts: Vec<u64> = (0..4).map(|_| converter.next_frame_repeat_count()).collect();
//! assert_eq!(counts, vec![2, 3, 2, 3]);
//! # Ok::<(), anacap_framerate::FrameRateError>(())
//! ```
//!
//! ## Repeat Schedules
//!
//! [`FrameRepeatSchedule`] is the iterator behind the converter. It can be
//! inspected ahead of time, for instance to print one full cadence cycle:
//!
//! ```
//! use anacap_core::Rational;
//! use anacap_framerate::FrameRepeatSchedule;
//!
//! let schedule = FrameRepeatSchedule::new(Rational::from_int(25), Rational::from_int(60))?;
//! assert_eq!(schedule.cadence().collect::<Vec<_>>(), vec![2, 2, 3, 2, 3]);
//! # Ok::<(), anacap_framerate::FrameRateError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converter;
pub mod error;
pub mod schedule;

// Re-export main types
pub use converter::{frame_rate_with_ratio, FrameRateConverter, StandardFrameRate};
pub use error::{FrameRateError, Result};
pub use schedule::FrameRepeatSchedule;
