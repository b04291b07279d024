//! DXT3 and DXT5 (BC2/BC3) block decompression
//!
//! Both formats store 4x4 pixel blocks in 16 bytes: an 8-byte alpha block
//! followed by an 8-byte colour block. Blocks are laid out row-major over
//! `ceil(width / 4)` by `ceil(height / 4)`, and pixels of edge blocks that
//! fall outside the image are dropped.

use super::packed::rgb565_to_rgba;
use super::{byte_at, u16_at};

/// Bytes per 4x4 block
pub const DXT_BLOCK_SIZE: usize = 16;

/// Pixels per block
const BLOCK_PIXELS: usize = 16;

/// Four-entry colour palette for a pair of RGB565 endpoints
///
/// With `c0 > c1` the two extra entries sit at thirds between the endpoints;
/// otherwise entry 2 is the midpoint and entry 3 is black. Every entry is
/// opaque.
pub fn palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let a = rgb565_to_rgba(c0);
    let b = rgb565_to_rgba(c1);
    let mut colors = [a, b, [0, 0, 0, 255], [0, 0, 0, 255]];

    for ch in 0..3 {
        let (x, y) = (u16::from(a[ch]), u16::from(b[ch]));
        if c0 > c1 {
            colors[2][ch] = ((2 * x + y) / 3) as u8;
            colors[3][ch] = ((x + 2 * y) / 3) as u8;
        } else {
            colors[2][ch] = ((x + y) / 2) as u8;
        }
    }
    colors
}

/// Eight-entry alpha ramp for a pair of DXT5 endpoints
///
/// With `a0 > a1` entries 2..8 interpolate in sevenths; otherwise entries 2..6
/// interpolate in fifths and entries 6 and 7 are 0 and 255.
pub fn alpha_ramp(a0: u8, a1: u8) -> [u8; 8] {
    let mut ramp = [a0, a1, 0, 0, 0, 0, 0, 0];
    let (x, y) = (u32::from(a0), u32::from(a1));

    if a0 > a1 {
        for i in 1..7u32 {
            ramp[i as usize + 1] = (((7 - i) * x + i * y) / 7) as u8;
        }
    } else {
        for i in 1..5u32 {
            ramp[i as usize + 1] = (((5 - i) * x + i * y) / 5) as u8;
        }
        ramp[6] = 0;
        ramp[7] = 255;
    }
    ramp
}

/// Decode the 8-byte colour half of a block starting at `offset`
fn color_block(raw: &[u8], offset: usize) -> [[u8; 4]; BLOCK_PIXELS] {
    let colors = palette(u16_at(raw, offset), u16_at(raw, offset + 2));
    let indices = u32::from_le_bytes([
        byte_at(raw, offset + 4),
        byte_at(raw, offset + 5),
        byte_at(raw, offset + 6),
        byte_at(raw, offset + 7),
    ]);

    let mut pixels = [[0u8; 4]; BLOCK_PIXELS];
    for (p, pixel) in pixels.iter_mut().enumerate() {
        *pixel = colors[((indices >> (2 * p)) & 0b11) as usize];
    }
    pixels
}

/// Little-endian integer of `len` bytes starting at `offset`
fn le_bits(raw: &[u8], offset: usize, len: usize) -> u64 {
    (0..len).fold(0u64, |acc, i| {
        acc | (u64::from(byte_at(raw, offset + i)) << (8 * i))
    })
}

fn dxt3_block(raw: &[u8], offset: usize) -> [[u8; 4]; BLOCK_PIXELS] {
    let alpha = le_bits(raw, offset, 8);
    let mut pixels = color_block(raw, offset + 8);
    for (p, pixel) in pixels.iter_mut().enumerate() {
        pixel[3] = ((alpha >> (4 * p)) & 0x0F) as u8 * 17;
    }
    pixels
}

fn dxt5_block(raw: &[u8], offset: usize) -> [[u8; 4]; BLOCK_PIXELS] {
    let ramp = alpha_ramp(byte_at(raw, offset), byte_at(raw, offset + 1));
    let indices = le_bits(raw, offset + 2, 6);
    let mut pixels = color_block(raw, offset + 8);
    for (p, pixel) in pixels.iter_mut().enumerate() {
        pixel[3] = ramp[((indices >> (3 * p)) & 0b111) as usize];
    }
    pixels
}

fn decode_blocks(
    raw: &[u8],
    width: usize,
    height: usize,
    rgba: &mut [u8],
    block: fn(&[u8], usize) -> [[u8; 4]; BLOCK_PIXELS],
) {
    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let pixels = block(raw, (by * blocks_x + bx) * DXT_BLOCK_SIZE);
            for (p, pixel) in pixels.iter().enumerate() {
                let x = bx * 4 + p % 4;
                let y = by * 4 + p / 4;
                if x < width && y < height {
                    let offset = (y * width + x) * 4;
                    rgba[offset..offset + 4].copy_from_slice(pixel);
                }
            }
        }
    }
}

pub(super) fn decode_dxt3(raw: &[u8], width: usize, height: usize, rgba: &mut [u8]) {
    decode_blocks(raw, width, height, rgba, dxt3_block);
}

pub(super) fn decode_dxt5(raw: &[u8], width: usize, height: usize, rgba: &mut [u8]) {
    decode_blocks(raw, width, height, rgba, dxt5_block);
}
