//! DDS header structures and parsing.
//!
//! A DDS file starts with the 4-byte magic `"DDS "` followed by a 124-byte
//! header with an embedded 32-byte pixel format, all fields little-endian.
//! Pixel data begins at byte offset 128.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use zorya_common::BinaryReader;

use crate::format::{detect_format, DdsFormat};
use crate::{Error, Result, DDS_MAGIC, PIXEL_DATA_OFFSET};

/// DDS file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Cubemap bit in `caps2`.
    pub const CAPS2_CUBEMAP: u32 = 0x200;
    /// Volume texture bit in `caps2`.
    pub const CAPS2_VOLUME: u32 = 0x20_0000;

    /// Parse a header from the start of a DDS file buffer.
    ///
    /// The buffer must hold at least the magic plus the full header
    /// (128 bytes). Zero width or height is accepted; decoding such a
    /// header yields an empty image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PIXEL_DATA_OFFSET {
            return Err(Error::TooSmall(data.len()));
        }

        let magic: [u8; 4] = data[..4].try_into().unwrap();
        if &magic != DDS_MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let mut reader = BinaryReader::new_at(data, 4);
        Ok(reader.read_struct()?)
    }

    /// Detect the pixel format stored in this header.
    pub fn format(&self) -> DdsFormat {
        detect_format(self.pixel_format)
    }

    /// Check if this texture is a cubemap.
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & Self::CAPS2_CUBEMAP != 0
    }

    /// Check if this texture is a volume (3D) texture.
    pub fn is_volume(&self) -> bool {
        self.caps2 & Self::CAPS2_VOLUME != 0
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// FourCC compression flag.
    pub const FLAG_FOURCC: u32 = 0x4;
    /// Uncompressed RGB flag.
    pub const FLAG_RGB: u32 = 0x40;
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 (BC1) compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT3 (BC2) compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT5 (BC3) compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// ATI1 (BC4) compression.
    pub const ATI1: Self = Self(*b"ATI1");
    /// ATI2 (BC5) compression.
    pub const ATI2: Self = Self(*b"ATI2");
    /// BC4 unsigned compression.
    pub const BC4U: Self = Self(*b"BC4U");
    /// BC5 unsigned compression.
    pub const BC5U: Self = Self(*b"BC5U");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");

    /// Interpret the code as ASCII, with trailing padding trimmed.
    ///
    /// Files pad short codes with spaces or NUL bytes; comparisons must
    /// always be done on the trimmed form.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0)
            .ok()
            .map(|s| s.trim_end_matches(['\0', ' ']))
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_graphic()) => f.write_str(s),
            _ => write!(
                f,
                "0x{:02X}{:02X}{:02X}{:02X}",
                self.0[0], self.0[1], self.0[2], self.0[3]
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::FromZeros;

    fn dds_buffer(header: &DdsHeader) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PIXEL_DATA_OFFSET);
        buf.extend_from_slice(DDS_MAGIC);
        buf.extend_from_slice(header.as_bytes());
        buf
    }

    #[test]
    fn test_parse_rejects_short_buffer() {
        let data = vec![0u8; 127];
        match DdsHeader::parse(&data) {
            Err(Error::TooSmall(len)) => assert_eq!(len, 127),
            other => panic!("expected TooSmall, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut data = vec![0u8; 128];
        data[..4].copy_from_slice(b"PNG\0");
        match DdsHeader::parse(&data) {
            Err(Error::BadMagic(magic)) => assert_eq!(&magic, b"PNG\0"),
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_extracts_fields() {
        let mut header = DdsHeader::new_zeroed();
        header.size = DdsHeader::SIZE;
        header.width = 256;
        header.height = 128;
        header.mipmap_count = 9;
        header.pixel_format.size = 32;
        header.pixel_format.flags = DdsPixelFormat::FLAG_FOURCC;
        header.pixel_format.four_cc = FourCC::DXT5;

        let parsed = DdsHeader::parse(&dds_buffer(&header)).unwrap();
        assert_eq!({ parsed.size }, 124);
        assert_eq!({ parsed.width }, 256);
        assert_eq!({ parsed.height }, 128);
        assert_eq!({ parsed.mipmap_count }, 9);
        assert_eq!({ parsed.pixel_format.four_cc }, FourCC::DXT5);
        assert_eq!(parsed.format(), DdsFormat::Dxt5);
    }

    #[test]
    fn test_header_layout_is_128_bytes_with_magic() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), 124);
        assert_eq!(std::mem::size_of::<DdsPixelFormat>(), 32);
    }

    #[test]
    fn test_caps2_flags() {
        let mut header = DdsHeader::new_zeroed();
        header.caps2 = DdsHeader::CAPS2_CUBEMAP;
        assert!(header.is_cubemap());
        assert!(!header.is_volume());

        header.caps2 = DdsHeader::CAPS2_VOLUME;
        assert!(header.is_volume());
    }

    #[test]
    fn test_fourcc_trims_padding() {
        assert_eq!(FourCC(*b"DXT1").as_str(), Some("DXT1"));
        assert_eq!(FourCC(*b"AB  ").as_str(), Some("AB"));
        assert_eq!(FourCC(*b"AB\0\0").as_str(), Some("AB"));
        assert_eq!(FourCC([0; 4]).as_str(), Some(""));
    }
}
