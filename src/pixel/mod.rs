//! Pixel format decoding
//!
//! This module turns an inflated canvas payload into an RGBA8888 buffer for
//! each of the seven WZ pixel formats. Decoders read past the end of a short
//! payload as zero bytes and never fail, so a truncated canvas still yields a
//! full-size image.

mod dxt;
mod packed;

pub use dxt::{alpha_ramp, palette, DXT_BLOCK_SIZE};
pub use packed::rgb565_to_rgba;

use crate::common::{check_pixel_count, PixelFormat, Result};

/// Row-major RGBA8888 pixels, 4 bytes per pixel
pub type RgbaBuffer = Vec<u8>;

/// Decode `raw` as `format` into a `width * height * 4` byte RGBA buffer
///
/// Fails only when the canvas exceeds [`MAX_IMAGE_PIXELS`](crate::MAX_IMAGE_PIXELS).
pub fn decode_pixels(
    raw: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<RgbaBuffer> {
    let pixels = check_pixel_count(width, height)?;
    let w = width as usize;
    let h = height as usize;
    let mut rgba = vec![0u8; pixels * 4];

    match format {
        PixelFormat::Bgra4444 => packed::decode_bgra4444(raw, &mut rgba),
        PixelFormat::Bgra8888 => packed::decode_bgra8888(raw, &mut rgba),
        PixelFormat::Argb1555 => packed::decode_argb1555(raw, &mut rgba),
        PixelFormat::Rgb565 => packed::decode_rgb565(raw, &mut rgba),
        PixelFormat::Rgb565Block => packed::decode_rgb565_block(raw, w, h, &mut rgba),
        PixelFormat::Dxt3 => dxt::decode_dxt3(raw, w, h, &mut rgba),
        PixelFormat::Dxt5 => dxt::decode_dxt5(raw, w, h, &mut rgba),
    }

    Ok(rgba)
}

/// Byte at `index`, or 0 past the end
#[inline]
fn byte_at(raw: &[u8], index: usize) -> u8 {
    raw.get(index).copied().unwrap_or(0)
}

/// Little-endian `u16` at `offset`, zero-extended past the end
#[inline]
fn u16_at(raw: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([byte_at(raw, offset), byte_at(raw, offset + 1)])
}
