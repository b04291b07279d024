//! DEFLATE (RFC 1951) decompression
//!
//! This module provides a best-effort inflater for canvas payloads. Output is
//! always exactly the expected size: decoding stops once that many bytes are
//! produced or the stream is exhausted, and the rest stays zero. Checksums are
//! not verified.

mod decoder;
mod huffman;
mod reader;
mod state;

pub use huffman::{HuffmanTree, Node};
pub use reader::BitReader;
pub use state::InflateState;

/// Size of the zlib header that precedes the DEFLATE stream
pub const ZLIB_HEADER_SIZE: usize = 2;

/// Result of an inflate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflateOutcome {
    /// Inflated bytes, zero-padded to the expected size
    pub data: Vec<u8>,
    /// Number of bytes actually produced by the stream
    pub written: usize,
    /// Whether the final block was reached
    pub finished: bool,
    /// Number of DEFLATE blocks started
    pub blocks: usize,
}

impl InflateOutcome {
    /// Whether the stream filled the whole output buffer
    pub fn is_complete(&self) -> bool {
        self.written == self.data.len()
    }
}

/// Inflate a raw DEFLATE stream into `expected_size` bytes
pub fn inflate(compressed: &[u8], expected_size: usize) -> Vec<u8> {
    inflate_with_outcome(compressed, expected_size).data
}

/// Inflate a zlib stream, skipping its 2-byte header
pub fn inflate_zlib(data: &[u8], expected_size: usize) -> Vec<u8> {
    inflate(data.get(ZLIB_HEADER_SIZE..).unwrap_or(&[]), expected_size)
}

/// Inflate a raw DEFLATE stream and report how far decoding got
pub fn inflate_with_outcome(compressed: &[u8], expected_size: usize) -> InflateOutcome {
    let mut reader = BitReader::new(compressed);
    let mut state = InflateState::new(expected_size);
    state.run(&mut reader);

    InflateOutcome {
        written: state.pos,
        finished: state.finished,
        blocks: state.blocks,
        data: state.output,
    }
}
