//! Row and field recovery from an unsegmented capture stream.
//!
//! The capture device hands over bytes in chunks that have nothing to do
//! with the video structure. The [`Synchronizer`] walks those chunks with a
//! caller-owned [`SyncState`]: while unlocked it looks for row markers that
//! repeat at the configured line period, and once locked it copies the
//! payload of every active line into the frame storage at the row given by
//! the field cursor.
//!
//! Splitting a stream into chunks differently never changes what ends up in
//! the storage.

use crate::carry::CarryScan;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::marker::{self, MarkerFlags};
use crate::state::{FieldCursor, SyncState, VerticalState};
use anacap_core::{FieldSet, FrameStorage};
use serde::Serialize;
use std::ops::AddAssign;
use tracing::{debug, trace, warn};

/// Consecutive late row markers that drop the lock.
const MAX_MISSES: u32 = 2;

/// What happened during one or more [`Synchronizer::process`] calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Rows fully written to storage.
    pub rows_written: u64,
    /// Frames handed over as complete.
    pub frames_completed: u64,
    /// Times the signal lock was acquired.
    pub locks_acquired: u64,
    /// Times the signal lock was lost.
    pub locks_lost: u64,
    /// Active lines dropped because they fell outside the frame.
    pub overflowed_rows: u64,
    /// Row markers ignored because they came before the line period.
    pub stray_markers: u64,
}

impl AddAssign for SyncReport {
    fn add_assign(&mut self, rhs: Self) {
        self.rows_written += rhs.rows_written;
        self.frames_completed += rhs.frames_completed;
        self.locks_acquired += rhs.locks_acquired;
        self.locks_lost += rhs.locks_lost;
        self.overflowed_rows += rhs.overflowed_rows;
        self.stray_markers += rhs.stray_markers;
    }
}

/// Stream synchronizer.
///
/// Holds only validated configuration; all per-stream state lives in
/// [`SyncState`], so one synchronizer can serve any number of streams.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    config: SyncConfig,
}

impl Synchronizer {
    /// Create a synchronizer from a configuration.
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            geometry = %config.geometry,
            line_bytes = config.line_bytes,
            discard_budget = config.discard_budget,
            "synchronizer configured"
        );
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Consume one chunk of the stream.
    ///
    /// Rows are written to `storage` as soon as their bytes arrive; a frame is
    /// completed once both of its fields are woven. Returns
    /// [`SyncError::SyncTimeout`] when the stream is still unlocked after
    /// `timeout_lines` line periods without a row marker. The state stays
    /// valid after a timeout and the next call keeps searching.
    pub fn process<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        bytes: &[u8],
        storage: &mut S,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut timed_out = false;
        let mut pos = 0;

        while pos < bytes.len() {
            let rest = &bytes[pos..];

            if state.discard > 0 {
                let n = state.discard.min(rest.len());
                state.discard -= n;
                timed_out |= self.note_silence(state, n);
                pos += n;
                continue;
            }

            if state.in_payload() {
                pos += self.copy_payload(state, rest, storage, &mut report);
                continue;
            }

            let window = if state.signal_lock {
                let left = self.config.scan_limit().saturating_sub(state.offset);
                if left == 0 {
                    self.lose_lock(state, storage, &mut report, "row marker missing");
                    continue;
                }
                rest.len().min(left)
            } else {
                rest.len()
            };
            let window = &rest[..window];

            if !state.carry.is_empty() {
                match state.carry.scan(window) {
                    CarryScan::Found { end, flags } => {
                        self.on_marker(state, end, flags, storage, &mut report);
                        pos += end;
                        continue;
                    }
                    CarryScan::Pending => {
                        state.offset += window.len();
                        timed_out |= self.note_silence(state, window.len());
                        pos += window.len();
                        continue;
                    }
                    CarryScan::Clear => {}
                }
            }

            match marker::find_row_start(window) {
                Some((end, flags)) => {
                    self.on_marker(state, end, flags, storage, &mut report);
                    pos += end;
                }
                None => {
                    state.offset += window.len();
                    state.carry.keep_tail(window);
                    timed_out |= self.note_silence(state, window.len());
                    pos += window.len();
                }
            }
        }

        state.totals += report;

        if timed_out && !state.signal_lock {
            let err = SyncError::SyncTimeout {
                scanned: state.unsynced,
            };
            warn!(scanned = state.unsynced, "{}", err);
            return Err(err);
        }

        Ok(report)
    }

    /// Handle a row marker whose row data starts `advance` bytes into the
    /// current position.
    fn on_marker<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        advance: usize,
        flags: MarkerFlags,
        storage: &mut S,
        report: &mut SyncReport,
    ) {
        let spacing = state.offset + advance;
        let on_period = self.config.is_line_spacing(spacing);

        // A marker ahead of the line period cannot be the next row start
        // while locked. The row start is still expected further on.
        if state.signal_lock && !on_period && spacing < self.config.line_bytes {
            state.offset = spacing;
            report.stray_markers += 1;
            trace!(spacing, ?flags, "stray row marker ignored");
            return;
        }

        state.offset = 0;
        state.flags = flags;
        state.silence = 0;
        state.unsynced = 0;
        trace!(spacing, ?flags, "row marker");

        if !state.signal_lock {
            state.lock_evidence = if state.lock_evidence > 0 && on_period {
                state.lock_evidence + 1
            } else {
                1
            };
            if state.lock_evidence < self.config.lock_threshold {
                return;
            }
            state.signal_lock = true;
            state.misses = 0;
            state.v_state = VerticalState::Searching;
            state.filled = FieldSet::empty();
            state.frame_dirty = false;
            report.locks_acquired += 1;
            debug!(evidence = state.lock_evidence, "signal locked");
        } else if on_period {
            state.misses = 0;
        } else {
            state.misses += 1;
            debug!(
                spacing,
                expected = self.config.line_bytes,
                misses = state.misses,
                "late row marker"
            );
            if state.misses >= MAX_MISSES {
                self.lose_lock(state, storage, report, "row markers off period");
                // This marker anchors the next search.
                if state.discard == 0 {
                    state.lock_evidence = 1;
                }
                return;
            }
        }

        self.begin_line(state, flags, storage, report);
    }

    /// Classify a locked line by its marker and set up its payload.
    fn begin_line<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        flags: MarkerFlags,
        storage: &mut S,
        report: &mut SyncReport,
    ) {
        state.h_state = 0;
        state.payload = 0;
        state.row = None;

        if flags.is_field_start() {
            if let VerticalState::Active(cursor) = state.v_state {
                self.finish_field(state, cursor, storage, report);
            }
            state.v_state = VerticalState::Blanking;
            return;
        }

        let cursor = match state.v_state {
            // Vertical position unknown, consume the line without keeping it
            VerticalState::Searching => {
                state.payload = self.config.row_bytes();
                return;
            }
            VerticalState::Blanking => match self.start_field(state, flags, storage) {
                Some(cursor) => cursor,
                None => {
                    state.v_state = VerticalState::Searching;
                    state.payload = self.config.row_bytes();
                    return;
                }
            },
            VerticalState::Active(cursor) => cursor.next_line(),
        };
        state.v_state = VerticalState::Active(cursor);
        state.payload = self.config.row_bytes();

        let geometry = self.config.geometry;
        if cursor.line < geometry.field_rows(cursor.field) {
            state.row = Some(cursor.row());
            return;
        }

        report.overflowed_rows += 1;
        if !state.overflow_warned {
            state.overflow_warned = true;
            let err = SyncError::GeometryOverflow {
                row: cursor.row(),
                rows: geometry.height as usize,
            };
            warn!(field = ?cursor.field, "{}", err);
        }
    }

    /// Open a field, or return `None` when it cannot belong to a frame.
    ///
    /// Frames always begin with the first field in transmission order. A
    /// second field with nothing before it is skipped.
    fn start_field<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        flags: MarkerFlags,
        storage: &mut S,
    ) -> Option<FieldCursor> {
        let second = flags.is_second_field();
        let field = self.config.field_order.field(second);
        if second && state.filled.is_empty() {
            debug!(?field, "second field without a first, skipped");
            return None;
        }
        if state.filled.contains(field.mask()) {
            // Same parity twice in a row: the other field never arrived
            debug!(?field, "repeated field, dropping partial frame");
            self.drop_frame(state, storage);
        }
        state.overflow_warned = false;
        trace!(?field, "field start");
        Some(FieldCursor::new(field))
    }

    fn finish_field<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        cursor: FieldCursor,
        storage: &mut S,
        report: &mut SyncReport,
    ) {
        let lines = cursor.line + 1;
        let expected = self.config.geometry.field_rows(cursor.field);
        if lines < expected {
            debug!(field = ?cursor.field, lines, expected, "short field, dropping partial frame");
            self.drop_frame(state, storage);
            return;
        }

        state.filled |= cursor.field.mask();
        trace!(field = ?cursor.field, lines, "field complete");

        if state.filled.contains(FieldSet::BOTH) {
            storage.complete_frame();
            state.filled = FieldSet::empty();
            state.frame_dirty = false;
            report.frames_completed += 1;
            debug!(frame = state.totals.frames_completed + report.frames_completed, "frame complete");
        }
    }

    fn drop_frame<S: FrameStorage + ?Sized>(&self, state: &mut SyncState, storage: &mut S) {
        storage.discard_frame();
        state.filled = FieldSet::empty();
        state.frame_dirty = false;
    }

    /// Copy as much of the current line's payload as `rest` holds.
    fn copy_payload<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        rest: &[u8],
        storage: &mut S,
        report: &mut SyncReport,
    ) -> usize {
        let n = (state.payload - state.h_state).min(rest.len());
        if let Some(row) = state.row {
            storage.write_row(row, state.h_state, &rest[..n]);
            state.frame_dirty = true;
        }
        state.h_state += n;
        state.offset += n;

        if !state.in_payload() {
            if let Some(row) = state.row {
                report.rows_written += 1;
                trace!(row, "row written");
            }
        }
        n
    }

    fn lose_lock<S: FrameStorage + ?Sized>(
        &self,
        state: &mut SyncState,
        storage: &mut S,
        report: &mut SyncReport,
        reason: &str,
    ) {
        warn!(
            reason,
            discard = self.config.resync_discard,
            partial_frame = state.frame_dirty,
            "signal lock lost"
        );
        if state.frame_dirty || !state.filled.is_empty() {
            storage.discard_frame();
        }
        state.unlock(self.config.resync_discard);
        report.locks_lost += 1;
    }

    /// Account for bytes scanned without finding a marker. Returns true if a
    /// timeout elapsed.
    fn note_silence(&self, state: &mut SyncState, n: usize) -> bool {
        if state.signal_lock {
            return false;
        }
        state.silence += n;
        state.unsynced += n;

        let limit = self.config.timeout_bytes();
        if state.silence < limit {
            return false;
        }
        state.silence %= limit;
        true
    }
}
