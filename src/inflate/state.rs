//! Inflate output state
//!
//! The output window is a fixed-size buffer sized to the expected inflated
//! length; back-references read from the bytes already written to it.

/// Decompression state for a single inflate call
#[derive(Debug)]
pub struct InflateState {
    /// Output buffer, zero-filled up to the expected size
    pub output: Vec<u8>,
    /// Number of bytes written so far
    pub pos: usize,
    /// Whether a block with BFINAL set has been fully decoded
    pub finished: bool,
    /// Number of DEFLATE blocks started
    pub blocks: usize,
}

impl InflateState {
    /// Create a state that will produce at most `expected_size` bytes
    pub fn new(expected_size: usize) -> Self {
        Self {
            output: vec![0; expected_size],
            pos: 0,
            finished: false,
            blocks: 0,
        }
    }

    /// Whether the output buffer is full
    pub fn is_full(&self) -> bool {
        self.pos >= self.output.len()
    }

    /// Append one literal byte, ignoring it once the buffer is full
    pub fn push(&mut self, byte: u8) {
        if let Some(slot) = self.output.get_mut(self.pos) {
            *slot = byte;
            self.pos += 1;
        }
    }

    /// Append as many of `bytes` as fit
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.output.len() - self.pos);
        self.output[self.pos..self.pos + count].copy_from_slice(&bytes[..count]);
        self.pos += count;
        count
    }

    /// Copy `length` bytes from `distance` bytes back, byte by byte
    ///
    /// Overlapping copies repeat the most recent bytes. Returns `false` when
    /// the distance reaches before the start of output.
    pub fn copy_back(&mut self, distance: usize, length: usize) -> bool {
        if distance == 0 || distance > self.pos {
            return false;
        }
        let end = (self.pos + length).min(self.output.len());
        for i in self.pos..end {
            self.output[i] = self.output[i - distance];
        }
        self.pos = end;
        true
    }
}
