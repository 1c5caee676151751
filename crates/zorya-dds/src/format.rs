//! Pixel format detection and format metadata.
//!
//! Detection collapses the header's FourCC and uncompressed bitmask fields
//! into a single closed [`DdsFormat`] tag, so the supported set stays
//! exhaustively checkable in the decoder's `match`.

use std::fmt;

use crate::header::DdsPixelFormat;

/// Detected DDS pixel format.
///
/// Only `Bgra`, `Bgr`, `Dxt1`, `Dxt3` and `Dxt5` are decodable. The
/// remaining tags are recognized so callers can report *what* a file
/// contains even when it cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdsFormat {
    /// BC1 block compression.
    Dxt1,
    /// BC2 block compression (explicit 4-bit alpha).
    Dxt3,
    /// BC3 block compression (interpolated alpha).
    Dxt5,
    /// BC4 single-channel compression (ATI1/BC4U).
    Bc4,
    /// BC5 two-channel compression (ATI2/BC5U).
    Bc5,
    /// DX10 extended header follows.
    Dx10,
    /// Uncompressed 32-bit BGRA.
    Bgra,
    /// Uncompressed 24-bit BGR (or 32-bit with unused alpha).
    Bgr,
    /// Anything else.
    Unknown,
}

/// Detect the format from a pixel format sub-structure.
///
/// FourCC wins over the uncompressed bitmask fields; the RGB path is only
/// consulted when no known code matches. Total: every input maps to a tag.
pub fn detect_format(pf: DdsPixelFormat) -> DdsFormat {
    let four_cc = pf.four_cc;
    let flags = pf.flags;
    let rgb_bit_count = pf.rgb_bit_count;
    let a_bit_mask = pf.a_bit_mask;

    match four_cc.as_str() {
        Some("DXT1") => return DdsFormat::Dxt1,
        Some("DXT3") => return DdsFormat::Dxt3,
        Some("DXT5") => return DdsFormat::Dxt5,
        Some("ATI1") | Some("BC4U") => return DdsFormat::Bc4,
        Some("ATI2") | Some("BC5U") => return DdsFormat::Bc5,
        Some("DX10") => return DdsFormat::Dx10,
        _ => {}
    }

    if flags & DdsPixelFormat::FLAG_RGB != 0 {
        if rgb_bit_count == 32 {
            return if a_bit_mask != 0 {
                DdsFormat::Bgra
            } else {
                DdsFormat::Bgr
            };
        }
        if rgb_bit_count == 24 {
            return DdsFormat::Bgr;
        }
    }

    DdsFormat::Unknown
}

impl DdsFormat {
    /// Check whether a decoder exists for this format.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Bgra | Self::Bgr | Self::Dxt1 | Self::Dxt3 | Self::Dxt5
        )
    }

    /// Check whether this is a block-compressed format.
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            Self::Dxt1 | Self::Dxt3 | Self::Dxt5 | Self::Bc4 | Self::Bc5
        )
    }

    /// Bytes per 4x4 block for compressed formats.
    pub fn block_size(self) -> Option<usize> {
        match self {
            Self::Dxt1 | Self::Bc4 => Some(8),
            Self::Dxt3 | Self::Dxt5 | Self::Bc5 => Some(16),
            _ => None,
        }
    }

    /// Bytes per pixel for uncompressed formats.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Bgra => Some(4),
            Self::Bgr => Some(3),
            _ => None,
        }
    }

    /// Expected size in bytes of the level-0 pixel payload.
    ///
    /// Compressed formats round dimensions up to whole 4x4 blocks, with at
    /// least one block per axis. Returns `None` for formats whose layout
    /// is not known (DX10, Unknown).
    pub fn data_size(self, width: u32, height: u32) -> Option<usize> {
        if let Some(block_size) = self.block_size() {
            let blocks_x = ((width as usize) + 3) / 4;
            let blocks_y = ((height as usize) + 3) / 4;
            return Some(blocks_x.max(1) * blocks_y.max(1) * block_size);
        }
        self.bytes_per_pixel()
            .map(|bpp| width as usize * height as usize * bpp)
    }

    /// Short format code, matching the FourCC where one exists.
    pub fn code(self) -> &'static str {
        match self {
            Self::Dxt1 => "DXT1",
            Self::Dxt3 => "DXT3",
            Self::Dxt5 => "DXT5",
            Self::Bc4 => "BC4",
            Self::Bc5 => "BC5",
            Self::Dx10 => "DX10",
            Self::Bgra => "BGRA",
            Self::Bgr => "BGR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable format description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Dxt1 => "BC1 / DXT1 compression",
            Self::Dxt3 => "BC2 / DXT3 compression",
            Self::Dxt5 => "BC3 / DXT5 compression",
            Self::Bc4 => "BC4 compression (ATI1)",
            Self::Bc5 => "BC5 compression (ATI2)",
            Self::Dx10 => "DX10 extended format",
            Self::Bgra => "32-bit BGRA (uncompressed)",
            Self::Bgr => "24-bit BGR (uncompressed)",
            Self::Unknown => "unknown format",
        }
    }
}

impl fmt::Display for DdsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FourCC;
    use zerocopy::FromZeros;

    fn pf_with_four_cc(four_cc: FourCC) -> DdsPixelFormat {
        let mut pf = DdsPixelFormat::new_zeroed();
        pf.size = 32;
        pf.flags = DdsPixelFormat::FLAG_FOURCC;
        pf.four_cc = four_cc;
        pf
    }

    fn pf_uncompressed(bit_count: u32, a_bit_mask: u32) -> DdsPixelFormat {
        let mut pf = DdsPixelFormat::new_zeroed();
        pf.size = 32;
        pf.flags = DdsPixelFormat::FLAG_RGB;
        pf.rgb_bit_count = bit_count;
        pf.a_bit_mask = a_bit_mask;
        pf
    }

    #[test]
    fn test_detect_compressed_codes() {
        assert_eq!(detect_format(pf_with_four_cc(FourCC::DXT1)), DdsFormat::Dxt1);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::DXT3)), DdsFormat::Dxt3);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::DXT5)), DdsFormat::Dxt5);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::ATI1)), DdsFormat::Bc4);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::BC4U)), DdsFormat::Bc4);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::ATI2)), DdsFormat::Bc5);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::BC5U)), DdsFormat::Bc5);
        assert_eq!(detect_format(pf_with_four_cc(FourCC::DX10)), DdsFormat::Dx10);
    }

    #[test]
    fn test_detect_uncompressed() {
        assert_eq!(detect_format(pf_uncompressed(32, 0xFF00_0000)), DdsFormat::Bgra);
        assert_eq!(detect_format(pf_uncompressed(32, 0)), DdsFormat::Bgr);
        assert_eq!(detect_format(pf_uncompressed(24, 0)), DdsFormat::Bgr);
        assert_eq!(detect_format(pf_uncompressed(16, 0)), DdsFormat::Unknown);
    }

    #[test]
    fn test_detect_is_total() {
        // All-zero input must map to a tag, not fail.
        assert_eq!(detect_format(DdsPixelFormat::new_zeroed()), DdsFormat::Unknown);

        // FourCC wins over RGB flags.
        let mut pf = pf_uncompressed(32, 0xFF00_0000);
        pf.four_cc = FourCC::DXT1;
        assert_eq!(detect_format(pf), DdsFormat::Dxt1);

        // Garbage FourCC without RGB flags is unknown.
        let mut pf = DdsPixelFormat::new_zeroed();
        pf.four_cc = FourCC(*b"\xFF\xFE\xFD\xFC");
        assert_eq!(detect_format(pf), DdsFormat::Unknown);
    }

    #[test]
    fn test_supported_set() {
        let supported = [
            DdsFormat::Bgra,
            DdsFormat::Bgr,
            DdsFormat::Dxt1,
            DdsFormat::Dxt3,
            DdsFormat::Dxt5,
        ];
        for format in supported {
            assert!(format.is_supported(), "{} should be supported", format);
        }
        for format in [DdsFormat::Bc4, DdsFormat::Bc5, DdsFormat::Dx10, DdsFormat::Unknown] {
            assert!(!format.is_supported(), "{} should be unsupported", format);
        }
    }

    #[test]
    fn test_data_size() {
        // Compressed sizes round up to whole blocks.
        assert_eq!(DdsFormat::Dxt1.data_size(4, 4), Some(8));
        assert_eq!(DdsFormat::Dxt1.data_size(5, 5), Some(32));
        assert_eq!(DdsFormat::Dxt5.data_size(1, 1), Some(16));
        assert_eq!(DdsFormat::Dxt3.data_size(8, 4), Some(32));

        // Uncompressed sizes are exact.
        assert_eq!(DdsFormat::Bgra.data_size(5, 5), Some(100));
        assert_eq!(DdsFormat::Bgr.data_size(5, 5), Some(75));

        assert_eq!(DdsFormat::Unknown.data_size(4, 4), None);
        assert_eq!(DdsFormat::Dx10.data_size(4, 4), None);
    }
}
