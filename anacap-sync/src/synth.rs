//! Synthetic capture stream generator.
//!
//! Produces the byte stream a capture device would deliver for a known
//! picture: every line starts with a SAV code, carries one row of pixels (or
//! blanking), ends with an EAV code and is padded with horizontal blanking
//! up to the line length. Each field is preceded by a few vertical blanking
//! lines.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::marker::{timing_reference, MarkerFlags, MARKER_LEN};
use anacap_core::{FieldOrder, FrameBuffer, FrameGeometry};
use serde::{Deserialize, Serialize};

/// Default vertical blanking lines before each field.
pub const DEFAULT_BLANKING_LINES: usize = 20;

/// Blanking level bytes, Cb/Cr then Y.
const BLANK: [u8; 2] = [0x80, 0x10];

/// Pixel content of synthesized frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelPattern {
    /// Diagonal ramp that shifts with the frame number.
    #[default]
    Ramp,
    /// Every byte has the same value.
    Solid(u8),
    /// Vertical bars, one shade per eighth of the row.
    Bars,
}

/// Generator of valid interlaced capture streams.
#[derive(Debug, Clone)]
pub struct StreamSynthesizer {
    geometry: FrameGeometry,
    line_bytes: usize,
    blanking_lines: usize,
    field_order: FieldOrder,
    pattern: PixelPattern,
    frame_index: u64,
}

impl StreamSynthesizer {
    /// Create a generator for frames of `geometry` with `line_bytes` per line.
    pub fn new(geometry: FrameGeometry, line_bytes: usize) -> Result<Self> {
        geometry.validate()?;
        if line_bytes < geometry.row_bytes() + 2 * MARKER_LEN {
            return Err(SyncError::invalid_config(format!(
                "line_bytes {} cannot hold a {} byte row and two markers",
                line_bytes,
                geometry.row_bytes()
            )));
        }
        Ok(Self {
            geometry,
            line_bytes,
            blanking_lines: DEFAULT_BLANKING_LINES,
            field_order: FieldOrder::default(),
            pattern: PixelPattern::default(),
            frame_index: 0,
        })
    }

    /// Create a generator matching a synchronizer configuration.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Ok(Self::new(config.geometry, config.line_bytes)?.with_field_order(config.field_order))
    }

    /// Set the vertical blanking lines before each field.
    pub fn with_blanking_lines(mut self, lines: usize) -> Self {
        self.blanking_lines = lines;
        self
    }

    /// Set the pixel pattern.
    pub fn with_pattern(mut self, pattern: PixelPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Set which transmitted field carries the top rows.
    pub fn with_field_order(mut self, order: FieldOrder) -> Self {
        self.field_order = order;
        self
    }

    /// Frame geometry.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Bytes per line.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Number of the next frame to be generated.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Lines in one frame, blanking included.
    pub fn lines_per_frame(&self) -> usize {
        2 * self.blanking_lines + self.geometry.height as usize
    }

    /// Bytes in one frame.
    pub fn frame_len(&self) -> usize {
        self.lines_per_frame() * self.line_bytes
    }

    /// Pixel byte at `col` of frame row `row` in frame number `frame`.
    pub fn pixel(&self, frame: u64, row: usize, col: usize) -> u8 {
        match self.pattern {
            // Stays within 0x10..=0xEB so payload never mimics a marker
            PixelPattern::Ramp => {
                let shift = (frame % 220) as usize * 7;
                0x10 + ((shift + row * 3 + col) % 220) as u8
            }
            PixelPattern::Solid(value) => value,
            PixelPattern::Bars => {
                let bar = col * 8 / self.geometry.row_bytes().max(1);
                0x10 + (bar as u8) * 0x1D
            }
        }
    }

    /// The frame a synchronizer should reconstruct for frame number `frame`.
    pub fn expected_frame(&self, frame: u64) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(self.geometry);
        for row in 0..self.geometry.height as usize {
            if let Some(dst) = buffer.row_mut(row) {
                for (col, byte) in dst.iter_mut().enumerate() {
                    *byte = self.pixel(frame, row, col);
                }
            }
        }
        buffer
    }

    /// Append one vertical blanking line.
    pub fn write_blanking_line(&self, out: &mut Vec<u8>, second_field: bool) {
        let mut flags = MarkerFlags::VBLANK;
        flags.set(MarkerFlags::FIELD, second_field);
        self.write_line(out, flags, None);
    }

    /// Append the next frame: both fields, each preceded by vertical blanking.
    pub fn write_frame(&mut self, out: &mut Vec<u8>) {
        let frame = self.frame_index;
        out.reserve(self.frame_len());

        for second_field in [false, true] {
            for _ in 0..self.blanking_lines {
                self.write_blanking_line(out, second_field);
            }

            let field = self.field_order.field(second_field);
            let mut flags = MarkerFlags::empty();
            flags.set(MarkerFlags::FIELD, second_field);
            for line in 0..self.geometry.field_rows(field) {
                let row = line * 2 + field.offset();
                self.write_line(out, flags, Some((frame, row)));
            }
        }

        self.frame_index += 1;
    }

    /// Generate `frames` frames followed by the blanking line that closes the
    /// last one.
    pub fn stream(&mut self, frames: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(frames * self.frame_len() + self.line_bytes);
        for _ in 0..frames {
            self.write_frame(&mut out);
        }
        self.write_blanking_line(&mut out, false);
        out
    }

    fn write_line(&self, out: &mut Vec<u8>, flags: MarkerFlags, pixels: Option<(u64, usize)>) {
        let start = out.len();
        let row_bytes = self.geometry.row_bytes();

        out.extend_from_slice(&timing_reference(flags));
        match pixels {
            Some((frame, row)) => out.extend((0..row_bytes).map(|col| self.pixel(frame, row, col))),
            None => out.extend((0..row_bytes).map(|i| BLANK[i % 2])),
        }
        out.extend_from_slice(&timing_reference(flags | MarkerFlags::EAV));

        let padding = self.line_bytes - (out.len() - start);
        out.extend((0..padding).map(|i| BLANK[i % 2]));
    }
}
