//! Frame rate converter.
//!
//! Decides how many display refresh intervals each decoded capture frame
//! stays on screen, so a 29.97 fps source plays smoothly on a 60 Hz display
//! without the slow drift floating-point accounting builds up over hours.

use crate::error::{FrameRateError, Result};
use crate::schedule::FrameRepeatSchedule;
use anacap_core::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Common frame rates used in video production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardFrameRate {
    /// Film: 24 fps (24/1)
    Film24,
    /// NTSC Film: 23.976 fps (24000/1001)
    NtscFilm,
    /// PAL: 25 fps (25/1)
    Pal25,
    /// NTSC: 29.97 fps (30000/1001)
    Ntsc30,
    /// Web/Games: 30 fps (30/1)
    Web30,
    /// PAL Interlaced: 50i (50/1)
    Pal50i,
    /// NTSC Interlaced: 59.94i (60000/1001)
    Ntsc60i,
    /// High Frame Rate: 48 fps (48/1)
    Hfr48,
    /// High Frame Rate: 60 fps (60/1)
    Hfr60,
    /// High Frame Rate: 120 fps (120/1)
    Hfr120,
}

impl StandardFrameRate {
    /// All standard rates, slowest first.
    pub const ALL: [StandardFrameRate; 10] = [
        Self::NtscFilm,
        Self::Film24,
        Self::Pal25,
        Self::Ntsc30,
        Self::Web30,
        Self::Hfr48,
        Self::Pal50i,
        Self::Ntsc60i,
        Self::Hfr60,
        Self::Hfr120,
    ];

    /// Convert to rational frame rate.
    pub const fn to_rational(&self) -> Rational {
        match self {
            Self::Film24 => Rational::new_const(24, 1),
            Self::NtscFilm => Rational::new_const(24000, 1001),
            Self::Pal25 => Rational::new_const(25, 1),
            Self::Ntsc30 => Rational::new_const(30000, 1001),
            Self::Web30 => Rational::new_const(30, 1),
            Self::Pal50i => Rational::new_const(50, 1),
            Self::Ntsc60i => Rational::new_const(60000, 1001),
            Self::Hfr48 => Rational::new_const(48, 1),
            Self::Hfr60 => Rational::new_const(60, 1),
            Self::Hfr120 => Rational::new_const(120, 1),
        }
    }

    /// Get standard frame rate from rational, if it matches.
    pub fn from_rational(fps: Rational) -> Option<Self> {
        match (fps.num(), fps.den()) {
            (24, 1) => Some(Self::Film24),
            (24000, 1001) => Some(Self::NtscFilm),
            (25, 1) => Some(Self::Pal25),
            (30000, 1001) => Some(Self::Ntsc30),
            (30, 1) => Some(Self::Web30),
            (50, 1) => Some(Self::Pal50i),
            (60000, 1001) => Some(Self::Ntsc60i),
            (48, 1) => Some(Self::Hfr48),
            (60, 1) => Some(Self::Hfr60),
            (120, 1) => Some(Self::Hfr120),
            _ => None,
        }
    }
}

impl fmt::Display for StandardFrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = self.to_rational();
        write!(f, "{:.3} fps ({})", rate.to_f64(), rate)
    }
}

/// Scale a frame rate by an exact ratio.
///
/// Used to derive a display rate from a capture rate, e.g. twice the field
/// rate of an NTSC source is `2 * 30000/1001`.
pub fn frame_rate_with_ratio(ratio: Rational, of_frame_rate: Rational) -> Result<Rational> {
    if !ratio.is_positive() {
        return Err(FrameRateError::invalid_rate(format!(
            "ratio {ratio} must be positive"
        )));
    }
    if !of_frame_rate.is_positive() {
        return Err(FrameRateError::invalid_rate(format!(
            "frame rate {of_frame_rate} must be positive"
        )));
    }
    ratio.checked_mul(of_frame_rate).ok_or_else(|| {
        FrameRateError::invalid_rate(format!("{ratio} x {of_frame_rate} is out of range"))
    })
}

/// Frame rate converter.
///
/// Call [`next_frame_repeat_count`](Self::next_frame_repeat_count) once per
/// decoded source frame and show the frame for that many target intervals.
/// A count of zero drops the frame, which only happens when the target rate
/// is below the source rate.
#[derive(Debug, Clone)]
pub struct FrameRateConverter {
    source: Rational,
    target: Rational,
    schedule: FrameRepeatSchedule,
    current: Option<u64>,
}

impl FrameRateConverter {
    /// Create a converter from `source` to `target` frames per second.
    pub fn new(source: Rational, target: Rational) -> Result<Self> {
        let schedule = FrameRepeatSchedule::new(source, target)?;
        debug!(
            %source,
            %target,
            ratio = %schedule.ratio(),
            cycle = schedule.cycle_len(),
            "frame rate converter created"
        );
        Ok(Self {
            source,
            target,
            schedule,
            current: None,
        })
    }

    /// Create a converter between two standard rates.
    pub fn standard(source: StandardFrameRate, target: StandardFrameRate) -> Result<Self> {
        Self::new(source.to_rational(), target.to_rational())
    }

    /// Source frame rate.
    pub fn source_frame_rate(&self) -> Rational {
        self.source
    }

    /// Target frame rate.
    pub fn target_frame_rate(&self) -> Rational {
        self.target
    }

    /// Target intervals per source frame, `target / source`.
    pub fn ratio(&self) -> Rational {
        self.schedule.ratio()
    }

    /// Check if this is an upconversion (increasing frame rate).
    pub fn is_upconversion(&self) -> bool {
        self.target > self.source
    }

    /// Check if this is a downconversion (decreasing frame rate).
    pub fn is_downconversion(&self) -> bool {
        self.target < self.source
    }

    /// Repeat count of the most recent source frame.
    ///
    /// Before the first call to
    /// [`next_frame_repeat_count`](Self::next_frame_repeat_count) this is the
    /// count the first frame will receive.
    pub fn current_frame_repeat_count(&self) -> u64 {
        self.current.unwrap_or_else(|| self.schedule.peek())
    }

    /// Advance to the next source frame and return its repeat count.
    pub fn next_frame_repeat_count(&mut self) -> u64 {
        let repeat = self.schedule.next_count();
        self.current = Some(repeat);
        trace!(
            frame = self.schedule.frames(),
            repeat,
            index = self.schedule.index(),
            "frame repeat"
        );
        repeat
    }

    /// Source frames seen so far.
    pub fn frames_in(&self) -> u64 {
        self.schedule.frames()
    }

    /// Target intervals scheduled so far.
    pub fn frames_out(&self) -> u64 {
        self.schedule.intervals()
    }

    /// Position within the repeat cycle.
    pub fn cycle_index(&self) -> u64 {
        self.schedule.index()
    }

    /// Source frames per repeat cycle.
    pub fn cycle_len(&self) -> u64 {
        self.schedule.cycle_len()
    }

    /// Scheduled minus ideal target intervals, always in `(-1, 0]`.
    pub fn drift(&self) -> Rational {
        self.schedule.drift()
    }

    /// The underlying schedule.
    pub fn schedule(&self) -> &FrameRepeatSchedule {
        &self.schedule
    }

    /// Reset the converter state.
    pub fn reset(&mut self) {
        self.schedule.reset();
        self.current = None;
    }
}
