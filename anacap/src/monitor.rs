//! Signal presence tracking.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// What the capture source currently delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    /// Locked onto the video signal.
    Locked,
    /// Looking for the signal.
    #[default]
    Searching,
    /// Too many consecutive timeouts, the source is not sending video.
    NoSignal,
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStatus::Locked => write!(f, "locked"),
            SignalStatus::Searching => write!(f, "searching"),
            SignalStatus::NoSignal => write!(f, "no signal"),
        }
    }
}

/// Turns per-chunk sync outcomes into a signal status.
///
/// A single timeout only means the synchronizer is still searching; after
/// `no_signal_after` consecutive timeouts without a lock in between the
/// signal is reported as lost.
#[derive(Debug, Clone)]
pub struct SignalMonitor {
    no_signal_after: u32,
    consecutive_timeouts: u32,
    status: SignalStatus,
}

impl SignalMonitor {
    /// Create a monitor that reports no signal after the given number of
    /// consecutive timeouts.
    pub fn new(no_signal_after: u32) -> Self {
        Self {
            no_signal_after: no_signal_after.max(1),
            consecutive_timeouts: 0,
            status: SignalStatus::Searching,
        }
    }

    /// Current status.
    pub fn status(&self) -> SignalStatus {
        self.status
    }

    /// Timeouts since the last lock.
    pub fn consecutive_timeouts(&self) -> u32 {
        self.consecutive_timeouts
    }

    /// Record the outcome of one chunk.
    pub fn observe(&mut self, locked: bool, timed_out: bool) -> SignalStatus {
        let status = if locked {
            self.consecutive_timeouts = 0;
            SignalStatus::Locked
        } else {
            if timed_out {
                self.consecutive_timeouts = self.consecutive_timeouts.saturating_add(1);
            }
            if self.consecutive_timeouts >= self.no_signal_after {
                SignalStatus::NoSignal
            } else {
                SignalStatus::Searching
            }
        };

        if status != self.status {
            match status {
                SignalStatus::NoSignal => warn!(timeouts = self.consecutive_timeouts, "no signal"),
                _ => info!(from = %self.status, to = %status, "signal status changed"),
            }
            self.status = status;
        }
        status
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.consecutive_timeouts = 0;
        self.status = SignalStatus::Searching;
    }
}
