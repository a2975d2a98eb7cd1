//! Scratch space for markers that straddle chunk boundaries.
//!
//! A scan over one chunk cannot test the last `MARKER_LEN - 1` positions
//! because the code would run past the end of the data. Those bytes are kept
//! in a [`MarkerCarry`] and tested again once the next chunk arrives, so a
//! split marker is found at exactly the position a single-chunk scan would
//! find it.

use crate::marker::{self, MarkerFlags, MARKER_LEN};

const CARRY_LEN: usize = MARKER_LEN - 1;

/// Outcome of rescanning the carried bytes against the head of a new chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryScan {
    /// A row start that began in the carried bytes.
    ///
    /// `end` is the index in the new chunk just past the marker.
    Found { end: usize, flags: MarkerFlags },
    /// The chunk was too short to settle the carried bytes; they have been
    /// extended with the whole chunk and are still pending.
    Pending,
    /// No marker starts in the carried bytes. The carry is now empty.
    Clear,
}

/// Tail bytes of the previously scanned chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerCarry {
    buf: [u8; CARRY_LEN],
    len: usize,
}

impl MarkerCarry {
    /// Create an empty carry.
    pub const fn new() -> Self {
        Self {
            buf: [0; CARRY_LEN],
            len: 0,
        }
    }

    /// True if there is nothing carried.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of carried bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The carried bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Drop the carried bytes.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Keep the untested tail of a scanned region.
    pub fn keep_tail(&mut self, scanned: &[u8]) {
        let n = scanned.len().min(CARRY_LEN);
        self.buf[..n].copy_from_slice(&scanned[scanned.len() - n..]);
        self.len = n;
    }

    /// Look for a row start beginning inside the carried bytes and ending in
    /// `head`, the start of the next chunk.
    ///
    /// Only markers that begin in the carry are reported: anything starting
    /// inside `head` is left to the regular scan of the chunk.
    pub fn scan(&mut self, head: &[u8]) -> CarryScan {
        let carried = self.len;
        let take = head.len().min(CARRY_LEN);

        let mut scratch = [0u8; 2 * CARRY_LEN];
        scratch[..carried].copy_from_slice(&self.buf[..carried]);
        scratch[carried..carried + take].copy_from_slice(&head[..take]);
        let total = carried + take;

        for start in 0..carried {
            if start + MARKER_LEN > total {
                break;
            }
            if let Some(flags) = marker::decode_code(&scratch[start..start + MARKER_LEN]) {
                if flags.is_row_start() {
                    self.clear();
                    return CarryScan::Found {
                        end: start + MARKER_LEN - carried,
                        flags,
                    };
                }
            }
        }

        if head.len() < CARRY_LEN {
            self.keep_tail(&scratch[..total]);
            return CarryScan::Pending;
        }

        self.clear();
        CarryScan::Clear
    }
}
