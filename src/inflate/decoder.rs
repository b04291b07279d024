//! DEFLATE block decoding
//!
//! This module implements the stored, fixed-Huffman and dynamic-Huffman block
//! decoders on top of [`InflateState`]. Every decoder returns `None` when the
//! stream cannot continue (exhausted input or an invalid code); the caller
//! keeps whatever has been written so far.

use super::huffman::HuffmanTree;
use super::reader::BitReader;
use super::state::InflateState;
use crate::tables::{CODE_LENGTH_ORDER, DIST_BASE, DIST_EXTRA, LEN_BASE, LEN_EXTRA};

/// End-of-block symbol
const END_OF_BLOCK: u16 = 256;

impl InflateState {
    /// Decode blocks until the final block ends, the output is full, or the
    /// stream gives out
    pub fn run(&mut self, reader: &mut BitReader<'_>) {
        while !self.is_full() {
            let Some(header) = reader.read_bits(3) else {
                break;
            };
            let is_final = header & 1 == 1;
            let block_type = header >> 1;
            self.blocks += 1;
            log::trace!(
                "inflate block {}: type {block_type}, final {is_final}, output at {}",
                self.blocks,
                self.pos
            );

            let completed = match block_type {
                0 => self.stored_block(reader),
                1 => self.huffman_block(
                    reader,
                    HuffmanTree::fixed_literal(),
                    HuffmanTree::fixed_distance(),
                ),
                2 => match read_dynamic_trees(reader) {
                    Some((literal, distance)) => self.huffman_block(reader, &literal, &distance),
                    None => None,
                },
                _ => None,
            };

            if completed.is_none() {
                log::debug!(
                    "inflate stream ended inside block {} (type {block_type}) after {} of {} bytes",
                    self.blocks,
                    self.pos,
                    self.output.len()
                );
                break;
            }
            if is_final {
                self.finished = true;
                break;
            }
        }
    }

    /// Block type 0: LEN, NLEN, then LEN raw bytes
    fn stored_block(&mut self, reader: &mut BitReader<'_>) -> Option<()> {
        reader.align_to_byte();
        let len = reader.read_aligned_u16()?;
        let nlen = reader.read_aligned_u16()?;
        if len != !nlen {
            log::debug!("stored block length {len:#06x} does not match complement {nlen:#06x}");
        }

        let available = reader.remaining_aligned_bytes();
        let take = (len as usize).min(available.len());
        self.extend(&available[..take]);
        reader.skip_bytes(take);

        if take < len as usize {
            return None;
        }
        Some(())
    }

    /// Block types 1 and 2: literal/length symbols with LZ77 back-references
    fn huffman_block(
        &mut self,
        reader: &mut BitReader<'_>,
        literal: &HuffmanTree,
        distance: &HuffmanTree,
    ) -> Option<()> {
        loop {
            if self.is_full() {
                return Some(());
            }

            let symbol = reader.read_symbol(literal)?;
            match symbol {
                0..=255 => self.push(symbol as u8),
                END_OF_BLOCK => return Some(()),
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    let length = LEN_BASE[index] as usize
                        + reader.read_bits(u32::from(LEN_EXTRA[index]))? as usize;

                    let dist_symbol = reader.read_symbol(distance)? as usize;
                    if dist_symbol >= DIST_BASE.len() {
                        return None;
                    }
                    let dist = DIST_BASE[dist_symbol] as usize
                        + reader.read_bits(u32::from(DIST_EXTRA[dist_symbol]))? as usize;

                    if !self.copy_back(dist, length) {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

/// Read a dynamic block header and build its literal/length and distance trees
pub(crate) fn read_dynamic_trees(reader: &mut BitReader<'_>) -> Option<(HuffmanTree, HuffmanTree)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut code_length_lengths = [0u8; 19];
    for &slot in &CODE_LENGTH_ORDER[..hclen] {
        code_length_lengths[slot] = reader.read_bits(3)? as u8;
    }
    let code_length_tree = HuffmanTree::from_lengths(&code_length_lengths);

    let total = hlit + hdist;
    let mut lengths: Vec<u8> = Vec::with_capacity(total);
    while lengths.len() < total {
        match reader.read_symbol(&code_length_tree)? {
            symbol @ 0..=15 => lengths.push(symbol as u8),
            16 => {
                let previous = *lengths.last()?;
                let repeat = 3 + reader.read_bits(2)? as usize;
                lengths.resize(lengths.len() + repeat, previous);
            }
            17 => {
                let repeat = 3 + reader.read_bits(3)? as usize;
                lengths.resize(lengths.len() + repeat, 0);
            }
            18 => {
                let repeat = 11 + reader.read_bits(7)? as usize;
                lengths.resize(lengths.len() + repeat, 0);
            }
            _ => return None,
        }
    }
    lengths.truncate(total);

    let literal = HuffmanTree::from_lengths(&lengths[..hlit]);
    let distance = HuffmanTree::from_lengths(&lengths[hlit..]);
    Some((literal, distance))
}
