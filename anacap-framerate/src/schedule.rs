//! Frame repeat schedule.
//!
//! Pacing a source cadence onto a display cadence means showing each source
//! frame for a whole number of display intervals. With `target / source`
//! reduced to `p / q`, every source frame adds `p` to an integer
//! accumulator, the repeat count is how many whole `q`s the accumulator
//! holds and the remainder carries over to the next frame. After `n` source
//! frames exactly `floor(n * p / q)` display intervals have been scheduled,
//! so the error never reaches one interval and never grows. The accumulator
//! returns to zero every `q` frames, which makes the counts periodic.

use crate::error::{FrameRateError, Result};
use anacap_core::Rational;

/// Periodic sequence of repeat counts for a rate ratio.
///
/// Iterating yields the repeat count of each successive source frame and
/// never ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRepeatSchedule {
    ratio: Rational,
    p: u64,
    q: u64,
    /// Accumulated fraction of an interval, in units of `1 / q`. Always `< q`.
    owed: u64,
    /// Position within the cycle.
    index: u64,
    /// Source frames scheduled so far.
    frames: u64,
    /// Display intervals scheduled so far.
    intervals: u64,
}

impl FrameRepeatSchedule {
    /// Create the schedule for showing `source` frames per second on a
    /// `target` rate display.
    pub fn new(source: Rational, target: Rational) -> Result<Self> {
        if !source.is_positive() {
            return Err(FrameRateError::invalid_rate(format!(
                "source rate {source} must be positive"
            )));
        }
        if !target.is_positive() {
            return Err(FrameRateError::invalid_rate(format!(
                "target rate {target} must be positive"
            )));
        }
        let ratio = target.checked_div(source).map_err(|e| {
            FrameRateError::invalid_rate(format!("ratio of {target} to {source}: {e}"))
        })?;
        Self::with_ratio(ratio)
    }

    /// Create the schedule for a `target / source` ratio.
    pub fn with_ratio(ratio: Rational) -> Result<Self> {
        if !ratio.is_positive() {
            return Err(FrameRateError::invalid_rate(format!(
                "rate ratio {ratio} must be positive"
            )));
        }
        Ok(Self {
            ratio,
            p: ratio.num() as u64,
            q: ratio.den() as u64,
            owed: 0,
            index: 0,
            frames: 0,
            intervals: 0,
        })
    }

    /// Ratio of display intervals per source frame.
    pub fn ratio(&self) -> Rational {
        self.ratio
    }

    /// Repeat count of the next source frame, without advancing.
    pub fn peek(&self) -> u64 {
        (self.owed + self.p) / self.q
    }

    /// Advance by one source frame and return its repeat count.
    pub fn next_count(&mut self) -> u64 {
        // owed < q and both fit in i64, so the sum fits in u64
        let owed = self.owed + self.p;
        let repeat = owed / self.q;
        self.owed = owed % self.q;
        self.index = (self.index + 1) % self.q;
        self.frames = self.frames.saturating_add(1);
        self.intervals = self.intervals.saturating_add(repeat);
        repeat
    }

    /// Position within the repeat cycle, in `0..cycle_len()`.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Source frames per repeat cycle.
    pub fn cycle_len(&self) -> u64 {
        self.q
    }

    /// Display intervals per repeat cycle.
    pub fn cycle_intervals(&self) -> u64 {
        self.p
    }

    /// One full cycle of repeat counts starting at the current position.
    pub fn cadence(&self) -> impl Iterator<Item = u64> {
        let len = self.q;
        let mut schedule = self.clone();
        (0..len).map(move |_| schedule.next_count())
    }

    /// Source frames scheduled so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Display intervals scheduled so far.
    pub fn intervals(&self) -> u64 {
        self.intervals
    }

    /// Scheduled intervals minus ideal intervals, always in `(-1, 0]`.
    pub fn drift(&self) -> Rational {
        // intervals = floor(frames * p / q), so the shortfall is exactly owed / q.
        // q is a reduced denominator and never zero.
        Rational::new(-(self.owed as i64), self.q as i64).unwrap_or_default()
    }

    /// Go back to the first frame.
    pub fn reset(&mut self) {
        self.owed = 0;
        self.index = 0;
        self.frames = 0;
        self.intervals = 0;
    }
}

impl Iterator for FrameRepeatSchedule {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_count())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
