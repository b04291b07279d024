//! Uncompressed 16- and 32-bit pixel formats

use super::{byte_at, u16_at};

/// Scale a 5-bit channel to 8 bits
#[inline]
fn expand5(value: u16) -> u8 {
    (u32::from(value & 0x1F) * 255 / 31) as u8
}

/// Scale a 6-bit channel to 8 bits
#[inline]
fn expand6(value: u16) -> u8 {
    (u32::from(value & 0x3F) * 255 / 63) as u8
}

/// Scale a 4-bit channel to 8 bits
#[inline]
fn expand4(value: u8) -> u8 {
    let v = value & 0x0F;
    v | (v << 4)
}

/// Convert an RGB565 value to an opaque RGBA pixel
pub fn rgb565_to_rgba(value: u16) -> [u8; 4] {
    [
        expand5(value >> 11),
        expand6(value >> 5),
        expand5(value),
        255,
    ]
}

pub(super) fn decode_bgra4444(raw: &[u8], rgba: &mut [u8]) {
    for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
        let lo = byte_at(raw, i * 2);
        let hi = byte_at(raw, i * 2 + 1);
        pixel.copy_from_slice(&[
            expand4(hi),
            expand4(lo >> 4),
            expand4(lo),
            expand4(hi >> 4),
        ]);
    }
}

pub(super) fn decode_bgra8888(raw: &[u8], rgba: &mut [u8]) {
    for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
        let offset = i * 4;
        pixel.copy_from_slice(&[
            byte_at(raw, offset + 2),
            byte_at(raw, offset + 1),
            byte_at(raw, offset),
            byte_at(raw, offset + 3),
        ]);
    }
}

pub(super) fn decode_argb1555(raw: &[u8], rgba: &mut [u8]) {
    for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
        let value = u16_at(raw, i * 2);
        let alpha = if value & 0x8000 != 0 { 255 } else { 0 };
        pixel.copy_from_slice(&[
            expand5(value >> 10),
            expand5(value >> 5),
            expand5(value),
            alpha,
        ]);
    }
}

pub(super) fn decode_rgb565(raw: &[u8], rgba: &mut [u8]) {
    for (i, pixel) in rgba.chunks_exact_mut(4).enumerate() {
        pixel.copy_from_slice(&rgb565_to_rgba(u16_at(raw, i * 2)));
    }
}

/// One RGB565 value covers a 16x16 tile; tiles are row-major
pub(super) fn decode_rgb565_block(raw: &[u8], width: usize, height: usize, rgba: &mut [u8]) {
    let tiles_per_row = width.div_ceil(16);
    for y in 0..height {
        let tile_row = (y / 16) * tiles_per_row;
        for x in 0..width {
            let tile = tile_row + x / 16;
            let offset = (y * width + x) * 4;
            rgba[offset..offset + 4].copy_from_slice(&rgb565_to_rgba(u16_at(raw, tile * 2)));
        }
    }
}
