//! Frame storage collaborator.
//!
//! The synchronizer never owns the frame it decodes into. It writes rows into
//! a [`FrameStorage`] and tells it when a frame is complete or must be thrown
//! away. [`FrameStore`] is the in-memory implementation used by the pipeline:
//! a pending buffer being filled and a ready buffer holding the last complete
//! frame, swapped on completion so no frame is ever copied.

use crate::frame::{FrameBuffer, FrameGeometry};
use tracing::trace;

/// Destination for decoded rows.
pub trait FrameStorage {
    /// Geometry of the frames this storage holds.
    fn geometry(&self) -> FrameGeometry;

    /// Write `bytes` into row `row` starting at byte `offset` within the row.
    ///
    /// Data that would land outside the row or the frame is dropped. Returns
    /// the number of bytes actually stored.
    fn write_row(&mut self, row: usize, offset: usize, bytes: &[u8]) -> usize;

    /// Both fields of the pending frame have been written.
    fn complete_frame(&mut self);

    /// The pending frame is corrupt and must not be exposed.
    fn discard_frame(&mut self);
}

impl<S: FrameStorage + ?Sized> FrameStorage for &mut S {
    fn geometry(&self) -> FrameGeometry {
        (**self).geometry()
    }

    fn write_row(&mut self, row: usize, offset: usize, bytes: &[u8]) -> usize {
        (**self).write_row(row, offset, bytes)
    }

    fn complete_frame(&mut self) {
        (**self).complete_frame()
    }

    fn discard_frame(&mut self) {
        (**self).discard_frame()
    }
}

/// Double-buffered in-memory frame storage.
#[derive(Debug, Clone)]
pub struct FrameStore {
    pending: FrameBuffer,
    ready: FrameBuffer,
    has_ready: bool,
    frames_completed: u64,
    frames_discarded: u64,
    bytes_written: u64,
}

impl FrameStore {
    /// Create a store for frames of the given geometry.
    pub fn new(geometry: FrameGeometry) -> Self {
        Self {
            pending: FrameBuffer::new(geometry),
            ready: FrameBuffer::new(geometry),
            has_ready: false,
            frames_completed: 0,
            frames_discarded: 0,
            bytes_written: 0,
        }
    }

    /// The most recent complete frame, if any.
    pub fn latest(&self) -> Option<&FrameBuffer> {
        self.has_ready.then_some(&self.ready)
    }

    /// The frame currently being filled.
    pub fn pending(&self) -> &FrameBuffer {
        &self.pending
    }

    /// Number of frames completed so far.
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Number of partial frames thrown away.
    pub fn frames_discarded(&self) -> u64 {
        self.frames_discarded
    }

    /// Total pixel bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl FrameStorage for FrameStore {
    fn geometry(&self) -> FrameGeometry {
        self.pending.geometry()
    }

    fn write_row(&mut self, row: usize, offset: usize, bytes: &[u8]) -> usize {
        let Some(dst) = self.pending.row_mut(row) else {
            return 0;
        };
        if offset >= dst.len() {
            return 0;
        }
        let n = bytes.len().min(dst.len() - offset);
        dst[offset..offset + n].copy_from_slice(&bytes[..n]);
        self.bytes_written += n as u64;
        n
    }

    fn complete_frame(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.ready);
        // Rows of an older frame must not leak into the next one
        self.pending.fill(0);
        self.has_ready = true;
        self.frames_completed += 1;
        trace!(frame = self.frames_completed, "frame stored");
    }

    fn discard_frame(&mut self) {
        self.pending.fill(0);
        self.frames_discarded += 1;
    }
}
