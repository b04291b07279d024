//! Block container decryption
//!
//! Encrypted canvas payloads are a sequence of length-prefixed blocks. Each
//! block is a little-endian `i32` byte count followed by that many bytes XORed
//! against the keystream, restarting at keystream index 0 for every block.

use super::keystream::Keystream;

/// Second bytes that follow `0x78` in the zlib headers archives use
pub const ZLIB_LEVEL_MARKERS: [u8; 4] = [0x9C, 0xDA, 0x01, 0x5E];

/// Whether `data` starts with a zlib header
pub fn is_zlib_header(data: &[u8]) -> bool {
    matches!(data, [0x78, level, ..] if ZLIB_LEVEL_MARKERS.contains(level))
}

/// Decrypt a block container, or return plain zlib streams unchanged
///
/// Walks blocks until the input is consumed or a length prefix is
/// non-positive or runs past the end of the buffer; whatever was decrypted
/// up to that point is returned. Never fails.
pub fn decrypt_if_needed(raw: &[u8], keystream: &Keystream) -> Vec<u8> {
    if is_zlib_header(raw) {
        return raw.to_vec();
    }

    let mut output = Vec::with_capacity(raw.len());
    let mut blocks = blocks(raw);
    for block in blocks.by_ref() {
        let start = output.len();
        output.extend_from_slice(block);
        keystream.apply(&mut output[start..]);
    }

    if let Some(stop) = blocks.stop_reason() {
        log::debug!(
            "block decryption stopped at offset {}: {stop} ({} bytes recovered)",
            blocks.offset(),
            output.len()
        );
    }

    output
}

/// Build a block container from plain bytes
///
/// The inverse of [`decrypt_if_needed`]: `data` is split into blocks of at
/// most `block_size` bytes and each block is XORed from keystream index 0.
/// A `block_size` of zero produces a single block.
pub fn encrypt_blocks(data: &[u8], keystream: &Keystream, block_size: usize) -> Vec<u8> {
    let block_size = if block_size == 0 {
        data.len().max(1)
    } else {
        block_size
    };

    let mut output = Vec::with_capacity(data.len() + 4 * data.len().div_ceil(block_size));
    for chunk in data.chunks(block_size) {
        output.extend_from_slice(&(chunk.len() as i32).to_le_bytes());
        let start = output.len();
        output.extend_from_slice(chunk);
        keystream.apply(&mut output[start..]);
    }
    output
}

/// Iterate the raw (still encrypted) blocks of a container
pub fn blocks(raw: &[u8]) -> Blocks<'_> {
    Blocks {
        data: raw,
        offset: 0,
        stop: None,
    }
}

/// Why block iteration ended before the end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStop {
    /// Fewer than 4 bytes left for a length prefix
    TruncatedPrefix,
    /// Length prefix was zero or negative
    NonPositiveLength(i32),
    /// Length prefix runs past the end of input
    Overrun {
        /// Declared block length
        length: i32,
        /// Bytes actually remaining after the prefix
        available: usize,
    },
}

impl std::fmt::Display for BlockStop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockStop::TruncatedPrefix => write!(f, "truncated length prefix"),
            BlockStop::NonPositiveLength(length) => write!(f, "non-positive block length {length}"),
            BlockStop::Overrun { length, available } => write!(
                f,
                "block length {length} exceeds {available} remaining bytes"
            ),
        }
    }
}

/// Iterator over length-prefixed blocks
#[derive(Debug)]
pub struct Blocks<'a> {
    data: &'a [u8],
    offset: usize,
    stop: Option<BlockStop>,
}

impl Blocks<'_> {
    /// Byte offset of the next length prefix
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reason iteration stopped early, if it did
    pub fn stop_reason(&self) -> Option<BlockStop> {
        self.stop
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some() || self.offset >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.offset..];
        let Some(prefix) = rest.first_chunk::<4>() else {
            self.stop = Some(BlockStop::TruncatedPrefix);
            return None;
        };

        let length = i32::from_le_bytes(*prefix);
        if length <= 0 {
            self.stop = Some(BlockStop::NonPositiveLength(length));
            return None;
        }

        let available = rest.len() - 4;
        if length as usize > available {
            self.stop = Some(BlockStop::Overrun { length, available });
            return None;
        }

        let block = &rest[4..4 + length as usize];
        self.offset += 4 + length as usize;
        Some(block)
    }
}
