//! Timing reference code detection.
//!
//! The capture device interleaves BT.656-style timing reference codes with
//! the pixel data. Each code is four bytes, `FF 00 00 XY`, where `XY`
//! carries the field, vertical blanking and start/end of active video bits
//! followed by four Hamming protection bits:
//!
//! ```text
//! bit:  7   6   5   4   3      2      1      0
//!       1   F   V   H   V^H    F^H    F^V    F^V^H
//! ```
//!
//! A code with `H` clear (SAV) marks the start of a row; the row data
//! follows immediately after it.

use bitflags::bitflags;

/// Length of a timing reference code in bytes.
pub const MARKER_LEN: usize = 4;

/// Preamble shared by every timing reference code.
pub const PREAMBLE: [u8; 3] = [0xFF, 0x00, 0x00];

bitflags! {
    /// Flag bits of a timing reference code's `XY` byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MarkerFlags: u8 {
        /// Second field of the frame.
        const FIELD = 0x40;
        /// Vertical blanking interval.
        const VBLANK = 0x20;
        /// End of active video. Clear for start of active video.
        const EAV = 0x10;
    }
}

impl Default for MarkerFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl MarkerFlags {
    /// True for a start-of-active-video code, i.e. a row start.
    pub fn is_row_start(&self) -> bool {
        !self.contains(Self::EAV)
    }

    /// True for a row start inside vertical blanking.
    pub fn is_field_start(&self) -> bool {
        self.is_row_start() && self.contains(Self::VBLANK)
    }

    /// True when the code belongs to the second field of a frame.
    pub fn is_second_field(&self) -> bool {
        self.contains(Self::FIELD)
    }
}

fn protection(flags: MarkerFlags) -> u8 {
    let f = flags.contains(MarkerFlags::FIELD) as u8;
    let v = flags.contains(MarkerFlags::VBLANK) as u8;
    let h = flags.contains(MarkerFlags::EAV) as u8;
    ((v ^ h) << 3) | ((f ^ h) << 2) | ((f ^ v) << 1) | (f ^ v ^ h)
}

/// Encode the `XY` byte for a set of flags.
pub fn encode_xy(flags: MarkerFlags) -> u8 {
    0x80 | flags.bits() | protection(flags)
}

/// Decode an `XY` byte, rejecting codes whose protection bits do not match.
pub fn decode_xy(xy: u8) -> Option<MarkerFlags> {
    if xy & 0x80 == 0 {
        return None;
    }
    let flags = MarkerFlags::from_bits_truncate(xy & 0x70);
    (xy & 0x0F == protection(flags)).then_some(flags)
}

/// Decode a full four byte code.
pub fn decode_code(code: &[u8]) -> Option<MarkerFlags> {
    match code {
        [0xFF, 0x00, 0x00, xy] => decode_xy(*xy),
        _ => None,
    }
}

/// Build a valid timing reference code.
pub fn timing_reference(flags: MarkerFlags) -> [u8; MARKER_LEN] {
    [PREAMBLE[0], PREAMBLE[1], PREAMBLE[2], encode_xy(flags)]
}

/// Find the first valid code accepted by `accept`.
///
/// Returns the index just past the code and its flags.
fn find_code(data: &[u8], accept: impl Fn(MarkerFlags) -> bool) -> Option<(usize, MarkerFlags)> {
    if data.len() < MARKER_LEN {
        return None;
    }

    for i in 0..=data.len() - MARKER_LEN {
        if data[i] != 0xFF {
            continue;
        }
        if let Some(flags) = decode_code(&data[i..i + MARKER_LEN]) {
            if accept(flags) {
                return Some((i + MARKER_LEN, flags));
            }
        }
    }

    None
}

/// Find the first row start (SAV) marker.
///
/// Returns the offset where the row data begins and the marker flags.
pub fn find_row_start(data: &[u8]) -> Option<(usize, MarkerFlags)> {
    find_code(data, |flags| flags.is_row_start())
}

/// Find the first row start inside vertical blanking, the marker that
/// separates one field from the next.
pub fn find_field_start(data: &[u8]) -> Option<(usize, MarkerFlags)> {
    find_code(data, |flags| flags.is_field_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        // Standard BT.656 XY values
        assert_eq!(encode_xy(MarkerFlags::empty()), 0x80);
        assert_eq!(encode_xy(MarkerFlags::EAV), 0x9D);
        assert_eq!(encode_xy(MarkerFlags::VBLANK), 0xAB);
        assert_eq!(encode_xy(MarkerFlags::VBLANK | MarkerFlags::EAV), 0xB6);
        assert_eq!(encode_xy(MarkerFlags::FIELD), 0xC7);
        assert_eq!(encode_xy(MarkerFlags::FIELD | MarkerFlags::EAV), 0xDA);
        assert_eq!(encode_xy(MarkerFlags::FIELD | MarkerFlags::VBLANK), 0xEC);
        assert_eq!(encode_xy(MarkerFlags::all()), 0xF1);
    }

    #[test]
    fn test_decode_rejects_bad_protection() {
        for bits in 0..8u8 {
            let flags = MarkerFlags::from_bits_truncate(bits << 4);
            let xy = encode_xy(flags);
            assert_eq!(decode_xy(xy), Some(flags));
            for bit in 0..4 {
                assert_eq!(decode_xy(xy ^ (1 << bit)), None);
            }
        }
        assert_eq!(decode_xy(0x00), None);
        assert_eq!(decode_xy(0xFF), None);
    }

    #[test]
    fn test_find_row_start() {
        let mut data = vec![0x80, 0x10, 0x80];
        data.extend_from_slice(&timing_reference(MarkerFlags::EAV));
        data.extend_from_slice(&[0x80, 0x10]);
        data.extend_from_slice(&timing_reference(MarkerFlags::FIELD));
        data.extend_from_slice(&[0x55, 0x66]);

        let (offset, flags) = find_row_start(&data).unwrap();
        assert_eq!(offset, 13);
        assert_eq!(flags, MarkerFlags::FIELD);
        assert_eq!(data[offset], 0x55);
    }

    #[test]
    fn test_find_row_start_ignores_spurious_preamble() {
        let data = [0xFF, 0x00, 0x00, 0x81, 0xFF, 0x00, 0x00];
        assert_eq!(find_row_start(&data), None);
        assert_eq!(find_row_start(&[0xFF, 0x00]), None);
        assert_eq!(find_row_start(&[]), None);
    }

    #[test]
    fn test_find_field_start() {
        let mut data = Vec::new();
        data.extend_from_slice(&timing_reference(MarkerFlags::empty()));
        data.extend_from_slice(&[0x80; 8]);
        data.extend_from_slice(&timing_reference(MarkerFlags::VBLANK | MarkerFlags::EAV));
        data.extend_from_slice(&timing_reference(MarkerFlags::VBLANK | MarkerFlags::FIELD));

        let (offset, flags) = find_field_start(&data).unwrap();
        assert_eq!(offset, data.len());
        assert!(flags.is_second_field());
        assert!(flags.is_field_start());
    }

    #[test]
    fn test_marker_at_end_of_buffer() {
        let data = timing_reference(MarkerFlags::VBLANK);
        assert_eq!(find_row_start(&data), Some((4, MarkerFlags::VBLANK)));
        assert_eq!(find_row_start(&data[..3]), None);
    }
}
