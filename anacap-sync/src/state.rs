//! Per-stream synchronizer state.

use crate::carry::MarkerCarry;
use crate::marker::MarkerFlags;
use crate::synchronizer::SyncReport;
use anacap_core::{Field, FieldSet};

/// Position inside the field currently being woven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCursor {
    /// Field being filled.
    pub field: Field,
    /// Active line within the field, counted from 0.
    pub line: usize,
}

impl FieldCursor {
    /// Cursor at the first line of a field.
    pub fn new(field: Field) -> Self {
        Self { field, line: 0 }
    }

    /// Cursor at the following line of the same field.
    pub fn next_line(self) -> Self {
        Self {
            line: self.line + 1,
            ..self
        }
    }

    /// Frame row the current line is woven into.
    pub fn row(&self) -> usize {
        self.line * 2 + self.field.offset()
    }
}

/// Vertical position of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalState {
    /// Locked onto the line period but no field boundary seen yet.
    #[default]
    Searching,
    /// Inside vertical blanking.
    Blanking,
    /// Inside the active lines of a field.
    Active(FieldCursor),
}

/// Mutable state of one capture stream.
///
/// Owned by the caller and handed to every
/// [`Synchronizer::process`](crate::Synchronizer::process) call, so the
/// synchronizer itself stays immutable and a stream can be resumed with any
/// chunking of its bytes.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Bytes consumed since the last row start.
    pub(crate) offset: usize,
    pub(crate) signal_lock: bool,
    /// Bytes still to skip before trusting the stream.
    pub(crate) discard: usize,
    /// Flags of the last row marker.
    pub(crate) flags: MarkerFlags,
    /// Payload bytes of the current line already consumed.
    pub(crate) h_state: usize,
    /// Payload bytes the current line carries. Zero while scanning.
    pub(crate) payload: usize,
    /// Frame row the current payload goes to, `None` to drop it.
    pub(crate) row: Option<usize>,
    pub(crate) v_state: VerticalState,
    /// Consecutive correctly spaced markers while unlocked.
    pub(crate) lock_evidence: u32,
    /// Consecutive mis-spaced markers while locked.
    pub(crate) misses: u32,
    /// Unlocked bytes since the last marker or timeout.
    pub(crate) silence: usize,
    /// Unlocked bytes since the last marker.
    pub(crate) unsynced: usize,
    pub(crate) filled: FieldSet,
    /// Whether the frame under construction holds any written rows.
    pub(crate) frame_dirty: bool,
    pub(crate) overflow_warned: bool,
    pub(crate) carry: MarkerCarry,
    pub(crate) totals: SyncReport,
}

impl SyncState {
    /// Create the state of a fresh, unlocked stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the synchronizer has locked onto the signal.
    pub fn is_locked(&self) -> bool {
        self.signal_lock
    }

    /// Bytes consumed since the last row start.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes still to skip before the stream is scanned again.
    pub fn discard(&self) -> usize {
        self.discard
    }

    /// Flags of the last row marker.
    pub fn flags(&self) -> MarkerFlags {
        self.flags
    }

    /// Payload bytes of the current line already consumed.
    pub fn h_state(&self) -> usize {
        self.h_state
    }

    /// Vertical position.
    pub fn v_state(&self) -> VerticalState {
        self.v_state
    }

    /// Consecutive correctly spaced markers seen while unlocked.
    pub fn lock_evidence(&self) -> u32 {
        self.lock_evidence
    }

    /// Fields of the frame under construction that are complete.
    pub fn fields_filled(&self) -> FieldSet {
        self.filled
    }

    /// Bytes scanned since the last row marker while unlocked.
    pub fn unsynced_bytes(&self) -> usize {
        self.unsynced
    }

    /// Counters accumulated over every call.
    pub fn totals(&self) -> &SyncReport {
        &self.totals
    }

    /// Return to the state of a fresh stream, keeping the totals.
    pub fn reset(&mut self) {
        let totals = self.totals;
        *self = Self {
            totals,
            ..Self::default()
        };
    }

    /// True while the payload of an active line is being consumed.
    pub(crate) fn in_payload(&self) -> bool {
        self.h_state < self.payload
    }

    /// Forget everything learned about the signal.
    pub(crate) fn unlock(&mut self, discard: usize) {
        self.signal_lock = false;
        self.discard = discard;
        self.offset = 0;
        self.h_state = 0;
        self.payload = 0;
        self.row = None;
        self.v_state = VerticalState::Searching;
        self.lock_evidence = 0;
        self.misses = 0;
        self.silence = 0;
        self.unsynced = 0;
        self.filled = FieldSet::empty();
        self.frame_dirty = false;
        self.overflow_warned = false;
        self.carry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_weave() {
        let top = FieldCursor::new(Field::Top);
        assert_eq!(top.row(), 0);
        assert_eq!(top.next_line().row(), 2);

        let bottom = FieldCursor::new(Field::Bottom).next_line().next_line();
        assert_eq!(bottom.line, 2);
        assert_eq!(bottom.row(), 5);
    }

    #[test]
    fn test_new_state_is_unlocked() {
        let state = SyncState::new();
        assert!(!state.is_locked());
        assert_eq!(state.v_state(), VerticalState::Searching);
        assert!(state.fields_filled().is_empty());
        assert!(!state.in_payload());
    }

    #[test]
    fn test_reset_keeps_totals() {
        let mut state = SyncState::new();
        state.signal_lock = true;
        state.totals.frames_completed = 3;
        state.reset();
        assert!(!state.is_locked());
        assert_eq!(state.totals().frames_completed, 3);
    }
}
