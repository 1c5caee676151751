//! DDS texture container parsing and decoding.
//!
//! A DDS file carries GPU texture data: a fixed 128-byte header (4-byte
//! magic plus a 124-byte header with an embedded pixel format) followed by
//! the pixel payload. This crate validates the header, detects the stored
//! format and decodes the level-0 image to a flat RGBA8 raster.
//!
//! Decodable formats are uncompressed BGRA/BGR and the BC1/BC2/BC3
//! (DXT1/DXT3/DXT5) block compressions. BC4, BC5 and DX10-extended files
//! are recognized and reported via [`Error::UnsupportedFormat`] so callers
//! can still display their metadata.
//!
//! Decoding is a pure function of the input buffer: no I/O, no shared
//! state, each call allocates its own output.
//!
//! # Example
//!
//! ```no_run
//! use zorya_dds::decode_dds;
//!
//! let data = std::fs::read("texture.dds")?;
//! let image = decode_dds(&data)?;
//! println!("{}x{}, {} bytes of RGBA", image.width, image.height, image.pixels.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod color;
mod decode;
mod error;
mod format;
mod header;

pub use color::{expand565, lerp_rgb};
pub use decode::{decode, decode_dds, DecodedImage};
pub use error::{Error, Result};
pub use format::{detect_format, DdsFormat};
pub use header::{DdsHeader, DdsPixelFormat, FourCC};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// Byte offset of the pixel payload: magic plus the 124-byte header.
pub const PIXEL_DATA_OFFSET: usize = 128;
