//! LSB-first bit reader for DEFLATE streams

use super::huffman::{HuffmanTree, Node};

/// Bit cursor over a DEFLATE stream
///
/// Bits are consumed least-significant first within each byte. Every read
/// returns `None` once the input is exhausted instead of failing, so a
/// truncated stream simply ends decoding.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Current position in bits
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Number of bits left to read
    pub const fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// Reads a single bit
    pub fn read_bit(&mut self) -> Option<u32> {
        let byte = *self.data.get(self.bit_pos / 8)?;
        let bit = (byte >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Some(u32::from(bit))
    }

    /// Reads `n` bits (at most 32) as a little-endian value
    pub fn read_bits(&mut self, n: u32) -> Option<u32> {
        debug_assert!(n <= 32);
        if n as usize > self.bits_remaining() {
            self.bit_pos = self.data.len() * 8;
            return None;
        }

        let mut value = 0u32;
        for i in 0..n {
            value |= self.read_bit()? << i;
        }
        Some(value)
    }

    /// Skips to the next byte boundary
    pub fn align_to_byte(&mut self) {
        self.bit_pos = self.bit_pos.next_multiple_of(8);
    }

    /// Reads one byte-aligned byte
    pub fn read_aligned_u8(&mut self) -> Option<u8> {
        debug_assert_eq!(self.bit_pos % 8, 0);
        let byte = *self.data.get(self.bit_pos / 8)?;
        self.bit_pos += 8;
        Some(byte)
    }

    /// Reads a byte-aligned little-endian `u16`
    pub fn read_aligned_u16(&mut self) -> Option<u16> {
        let lo = self.read_aligned_u8()?;
        let hi = self.read_aligned_u8()?;
        Some(u16::from_le_bytes([lo, hi]))
    }

    /// Byte-aligned bytes from the cursor to the end of input
    pub fn remaining_aligned_bytes(&self) -> &'a [u8] {
        self.data.get(self.bit_pos / 8..).unwrap_or(&[])
    }

    /// Skips `count` byte-aligned bytes
    pub fn skip_bytes(&mut self, count: usize) {
        self.bit_pos = (self.bit_pos + count * 8).min(self.data.len() * 8);
    }

    /// Decodes one symbol by walking `tree` a bit at a time
    ///
    /// Returns `None` on exhausted input or on a code the tree does not hold.
    pub fn read_symbol(&mut self, tree: &HuffmanTree) -> Option<u16> {
        let mut node = tree.root();
        loop {
            match node {
                Node::Leaf(symbol) => return Some(*symbol),
                Node::Branch(zero, one) => {
                    node = if self.read_bit()? == 0 { &**zero } else { &**one };
                }
                Node::Empty => return None,
            }
        }
    }
}
