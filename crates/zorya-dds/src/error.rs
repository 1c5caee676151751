//! Error types for DDS handling.

use thiserror::Error;

use crate::format::DdsFormat;

/// Errors that can occur when parsing or decoding DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] zorya_common::Error),

    /// Buffer too small to hold a DDS header.
    #[error("file too small to be a DDS file: need at least 128 bytes, got {0}")]
    TooSmall(usize),

    /// Invalid DDS magic.
    #[error("not a DDS file: expected magic 'DDS ', got {0:?}")]
    BadMagic([u8; 4]),

    /// The format was recognized but has no decoder.
    #[error("unsupported format {0}: decodable formats are BGRA, BGR, DXT1, DXT3, DXT5")]
    UnsupportedFormat(DdsFormat),

    /// The header claims more pixel data than the buffer contains.
    #[error(
        "truncated pixel data for {format} {width}x{height}: need {needed} bytes, got {available}"
    )]
    TruncatedData {
        format: DdsFormat,
        width: u32,
        height: u32,
        needed: usize,
        available: usize,
    },
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
