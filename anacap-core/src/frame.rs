//! Video frame buffer abstractions.
//!
//! Decoded capture frames are packed, single-plane buffers with a fixed
//! geometry chosen when the capture session starts. Interlaced sources fill
//! them one field at a time: the top field owns the even rows and the bottom
//! field the odd rows.

use crate::error::{Error, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel format for captured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum PixelFormat {
    /// Packed YUV 4:2:2, Cb Y0 Cr Y1 byte order, 16bpp.
    #[default]
    Uyvy422,
    /// Packed YUV 4:2:2, Y0 Cb Y1 Cr byte order, 16bpp.
    Yuyv422,
    /// Grayscale, 8bpp.
    Gray8,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Uyvy422 | Self::Yuyv422 => 2,
            Self::Gray8 => 1,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uyvy422 => write!(f, "uyvy422"),
            Self::Yuyv422 => write!(f, "yuyv422"),
            Self::Gray8 => write!(f, "gray8"),
        }
    }
}

/// One half of an interlaced frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Even rows: 0, 2, 4, ...
    Top,
    /// Odd rows: 1, 3, 5, ...
    Bottom,
}

impl Field {
    /// Row offset of this field inside the woven frame.
    pub fn offset(&self) -> usize {
        match self {
            Field::Top => 0,
            Field::Bottom => 1,
        }
    }

    /// The set containing only this field.
    pub fn mask(&self) -> FieldSet {
        match self {
            Field::Top => FieldSet::TOP,
            Field::Bottom => FieldSet::BOTTOM,
        }
    }
}

bitflags! {
    /// Set of fields that have been filled in the frame under construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldSet: u8 {
        /// Top (even) field.
        const TOP = 0b01;
        /// Bottom (odd) field.
        const BOTTOM = 0b10;
        /// Both fields, i.e. a complete frame.
        const BOTH = Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Which field arrives first in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrder {
    /// The first transmitted field carries the even rows.
    #[default]
    TopFieldFirst,
    /// The first transmitted field carries the odd rows.
    BottomFieldFirst,
}

impl FieldOrder {
    /// Map a transmitted field number to its position in the frame.
    ///
    /// `second` is the field identification bit of the signal: false for the
    /// first field of a frame, true for the second.
    pub fn field(&self, second: bool) -> Field {
        match (self, second) {
            (FieldOrder::TopFieldFirst, false) | (FieldOrder::BottomFieldFirst, true) => Field::Top,
            _ => Field::Bottom,
        }
    }
}

/// Fixed frame geometry for a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in rows, both fields together.
    pub height: u32,
    /// Pixel format.
    #[serde(default)]
    pub format: PixelFormat,
}

impl FrameGeometry {
    /// Create a new geometry.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Bytes of pixel data in one row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Number of rows that belong to a field.
    pub fn field_rows(&self, field: Field) -> usize {
        let height = self.height as usize;
        match field {
            Field::Top => height.div_ceil(2),
            Field::Bottom => height / 2,
        }
    }

    /// Check that the geometry can hold an interlaced frame.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(Error::config("frame width must be positive"));
        }
        if self.height < 2 {
            return Err(Error::config(format!(
                "frame height {} cannot hold two fields",
                self.height
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.format)
    }
}

/// A buffer for storing frame pixel data.
#[derive(Clone)]
pub struct FrameBuffer {
    geometry: FrameGeometry,
    stride: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a new zeroed frame buffer.
    pub fn new(geometry: FrameGeometry) -> Self {
        // Stride is a multiple of 32 bytes
        let stride = (geometry.row_bytes() + 31) & !31;
        Self {
            geometry,
            stride,
            data: vec![0u8; stride * geometry.height as usize],
        }
    }

    /// Get the frame geometry.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Get the frame width.
    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    /// Get the frame height.
    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    /// Get the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.geometry.format
    }

    /// Get the stride (bytes between the starts of two rows).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Get the raw buffer, including stride padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a row's pixel data, without padding.
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        if index >= self.geometry.height as usize {
            return None;
        }
        let start = index * self.stride;
        self.data.get(start..start + self.geometry.row_bytes())
    }

    /// Get a mutable reference to a row's pixel data.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.geometry.height as usize {
            return None;
        }
        let start = index * self.stride;
        let end = start + self.geometry.row_bytes();
        self.data.get_mut(start..end)
    }

    /// Fill the buffer with a value.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.geometry.width)
            .field("height", &self.geometry.height)
            .field("format", &self.geometry.format)
            .field("stride", &self.stride)
            .finish()
    }
}
