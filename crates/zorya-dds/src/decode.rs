//! Decoding of DDS pixel payloads into RGBA8 rasters.
//!
//! One routine per supported format: uncompressed BGRA/BGR channel
//! swizzling, and the BC1/BC2/BC3 block formats (4x4 pixel blocks holding
//! two RGB565 reference colors plus per-pixel palette indices).

use zorya_common::BinaryReader;

use crate::color::{expand565, lerp_rgb};
use crate::format::DdsFormat;
use crate::header::DdsHeader;
use crate::{Error, Result, PIXEL_DATA_OFFSET};

/// A decoded RGBA8 image.
///
/// `pixels` holds `width * height * 4` bytes in R, G, B, A order,
/// row-major with the top row first. Freshly allocated per decode call.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA8 pixel data.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Allocate a fully transparent black image.
    ///
    /// Block decoders skip truncated blocks and out-of-range pixels, so
    /// anything left unwritten must already be defined.
    fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }
}

/// Decode a complete DDS file buffer.
///
/// Parses the header, detects the format and decodes the level-0 payload
/// starting at byte offset 128.
pub fn decode_dds(data: &[u8]) -> Result<DecodedImage> {
    let header = DdsHeader::parse(data)?;
    let width = header.width;
    let height = header.height;
    decode(data, header.format(), width, height, PIXEL_DATA_OFFSET)
}

/// Decode a pixel payload of a known format.
///
/// `data_offset` is the byte position of the payload within `data`
/// (128 for a standard DDS file). The output is always exactly
/// `width * height * 4` bytes; zero width or height yields an empty
/// raster. Formats outside {BGRA, BGR, DXT1, DXT3, DXT5} fail with
/// [`Error::UnsupportedFormat`].
pub fn decode(
    data: &[u8],
    format: DdsFormat,
    width: u32,
    height: u32,
    data_offset: usize,
) -> Result<DecodedImage> {
    match format {
        DdsFormat::Bgra | DdsFormat::Bgr => {
            decode_uncompressed(data, format, width, height, data_offset)
        }
        DdsFormat::Dxt1 => decode_bc1(data, width, height, data_offset),
        DdsFormat::Dxt3 => decode_bc2(data, width, height, data_offset),
        DdsFormat::Dxt5 => decode_bc3(data, width, height, data_offset),
        other => Err(Error::UnsupportedFormat(other)),
    }
}

/// Decode uncompressed BGRA (4 bytes/pixel) or BGR (3 bytes/pixel) data.
///
/// BGR has no source alpha channel; the output alpha is fixed at 255.
fn decode_uncompressed(
    data: &[u8],
    format: DdsFormat,
    width: u32,
    height: u32,
    data_offset: usize,
) -> Result<DecodedImage> {
    let bytes_per_pixel = if format == DdsFormat::Bgra { 4 } else { 3 };
    let w = width as usize;
    let h = height as usize;

    let needed = w * h * bytes_per_pixel;
    let available = data.len().saturating_sub(data_offset);
    if available < needed {
        return Err(Error::TruncatedData {
            format,
            width,
            height,
            needed,
            available,
        });
    }

    let mut image = DecodedImage::zeroed(width, height);
    for y in 0..h {
        for x in 0..w {
            let src = data_offset + (y * w + x) * bytes_per_pixel;
            let dst = (y * w + x) * 4;
            image.pixels[dst] = data[src + 2];
            image.pixels[dst + 1] = data[src + 1];
            image.pixels[dst + 2] = data[src];
            image.pixels[dst + 3] = if bytes_per_pixel == 4 {
                data[src + 3]
            } else {
                255
            };
        }
    }
    Ok(image)
}

/// Decode BC1 (DXT1): 8-byte blocks of two RGB565 colors and 2-bit codes.
fn decode_bc1(data: &[u8], width: u32, height: u32, data_offset: usize) -> Result<DecodedImage> {
    let w = width as usize;
    let h = height as usize;
    let blocks_x = (w + 3) / 4;
    let blocks_y = (h + 3) / 4;

    let mut image = DecodedImage::zeroed(width, height);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let offset = data_offset + (by * blocks_x + bx) * 8;
            if offset + 8 > data.len() {
                // Truncated block: pixels stay transparent black.
                continue;
            }

            let mut reader = BinaryReader::new_at(data, offset);
            let color0 = reader.read_u16()?;
            let color1 = reader.read_u16()?;
            let indices = reader.read_u32()?;

            let palette = color_palette(color0, color1, color0 > color1);
            write_block(&mut image.pixels, w, h, bx, by, |index| {
                let code = (indices >> (index * 2)) & 0x3;
                palette[code as usize]
            });
        }
    }
    Ok(image)
}

/// Decode BC2 (DXT3): 16-byte blocks of explicit 4-bit alpha followed by a
/// BC1-style color block.
///
/// The color block keeps BC1's `color0 > color1` mode selection even
/// though transparency comes from the explicit alpha nibbles.
fn decode_bc2(data: &[u8], width: u32, height: u32, data_offset: usize) -> Result<DecodedImage> {
    let w = width as usize;
    let h = height as usize;
    let blocks_x = (w + 3) / 4;
    let blocks_y = (h + 3) / 4;

    let mut image = DecodedImage::zeroed(width, height);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let offset = data_offset + (by * blocks_x + bx) * 16;
            if offset + 16 > data.len() {
                continue;
            }

            let mut reader = BinaryReader::new_at(data, offset);
            let alpha_bytes = reader.read_bytes(8)?;
            let color0 = reader.read_u16()?;
            let color1 = reader.read_u16()?;
            let indices = reader.read_u32()?;

            let palette = color_palette(color0, color1, color0 > color1);
            write_block(&mut image.pixels, w, h, bx, by, |index| {
                // One nibble per pixel, low nibble first; 0..15 scales to
                // 0..255 exactly via * 17.
                let byte = alpha_bytes[index / 2];
                let nibble = if index % 2 == 0 { byte & 0x0F } else { byte >> 4 };
                let code = (indices >> (index * 2)) & 0x3;
                let mut rgba = palette[code as usize];
                rgba[3] = nibble * 17;
                rgba
            });
        }
    }
    Ok(image)
}

/// Decode BC3 (DXT5): 16-byte blocks of two alpha endpoints, 48 bits of
/// 3-bit alpha indices, and a BC1-style color block.
///
/// Unlike BC1, the color palette is always the four-color interpolated
/// form; transparency is carried entirely by the alpha channel.
fn decode_bc3(data: &[u8], width: u32, height: u32, data_offset: usize) -> Result<DecodedImage> {
    let w = width as usize;
    let h = height as usize;
    let blocks_x = (w + 3) / 4;
    let blocks_y = (h + 3) / 4;

    let mut image = DecodedImage::zeroed(width, height);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let offset = data_offset + (by * blocks_x + bx) * 16;
            if offset + 16 > data.len() {
                continue;
            }

            let mut reader = BinaryReader::new_at(data, offset);
            let alpha0 = reader.read_u8()?;
            let alpha1 = reader.read_u8()?;
            // The 48-bit index value is assembled most-significant byte
            // first and consumed 3 bits per pixel from the low end.
            let alpha_bits = reader
                .read_bytes(6)?
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
            let color0 = reader.read_u16()?;
            let color1 = reader.read_u16()?;
            let indices = reader.read_u32()?;

            let palette = color_palette(color0, color1, true);
            let alphas = alpha_palette(alpha0, alpha1);
            write_block(&mut image.pixels, w, h, bx, by, |index| {
                let alpha_index = (alpha_bits >> (index * 3)) & 0x7;
                let code = (indices >> (index * 2)) & 0x3;
                let mut rgba = palette[code as usize];
                rgba[3] = alphas[alpha_index as usize];
                rgba
            });
        }
    }
    Ok(image)
}

/// Write one 4x4 block into the output raster.
///
/// `pixel` maps the row-major index within the block (0..16, low index =
/// top-left) to an RGBA value. Pixels falling outside the image, as
/// happens in edge blocks of non-multiple-of-4 images, are skipped.
fn write_block(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    bx: usize,
    by: usize,
    pixel: impl Fn(usize) -> [u8; 4],
) {
    for py in 0..4 {
        for px in 0..4 {
            let x = bx * 4 + px;
            let y = by * 4 + py;
            if x >= width || y >= height {
                continue;
            }
            let rgba = pixel(py * 4 + px);
            let dst = (y * width + x) * 4;
            pixels[dst..dst + 4].copy_from_slice(&rgba);
        }
    }
}

/// Build the four-entry palette for a BC color block.
///
/// In four-color mode entries 2 and 3 interpolate at 1/3 and 2/3;
/// otherwise entry 2 is the midpoint and entry 3 transparent black.
/// BC1/BC2 select the mode from the raw `color0 > color1` comparison,
/// BC3 always uses four-color mode.
fn color_palette(color0: u16, color1: u16, four_color: bool) -> [[u8; 4]; 4] {
    let c0 = expand565(color0);
    let c1 = expand565(color1);

    let mut palette = [[0u8; 4]; 4];
    palette[0] = [c0[0], c0[1], c0[2], 255];
    palette[1] = [c1[0], c1[1], c1[2], 255];
    if four_color {
        let p2 = lerp_rgb(c0, c1, 1, 3);
        let p3 = lerp_rgb(c0, c1, 2, 3);
        palette[2] = [p2[0], p2[1], p2[2], 255];
        palette[3] = [p3[0], p3[1], p3[2], 255];
    } else {
        let p2 = lerp_rgb(c0, c1, 1, 2);
        palette[2] = [p2[0], p2[1], p2[2], 255];
        palette[3] = [0, 0, 0, 0];
    }
    palette
}

/// Build the eight-entry alpha palette for a BC3 alpha block.
///
/// `alpha0 > alpha1` selects six interpolated steps; otherwise four
/// steps plus hard transparent and opaque endpoints.
fn alpha_palette(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let a0 = u32::from(alpha0);
    let a1 = u32::from(alpha1);

    let mut av = [0u8; 8];
    av[0] = alpha0;
    av[1] = alpha1;
    if alpha0 > alpha1 {
        for i in 0..6u32 {
            av[i as usize + 2] = (((6 - i) * a0 + (i + 1) * a1) / 7) as u8;
        }
    } else {
        for i in 0..4u32 {
            av[i as usize + 2] = (((4 - i) * a0 + (i + 1) * a1) / 5) as u8;
        }
        av[6] = 0;
        av[7] = 255;
    }
    av
}
