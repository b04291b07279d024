//! Archive keystream generation
//!
//! The keystream is produced by AES-256 encrypting a 16-byte running block:
//! block 0 is the 4-byte IV repeated four times, and every ciphertext block is
//! both emitted and fed back in as the next input.

use super::aes::KeySchedule;
use crate::WZ_USER_KEY;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Generate `length` keystream bytes for `seed_iv` using the WZ user key
///
/// Builds a fresh [`KeySchedule`]; callers generating many keystreams should
/// keep a schedule around and use [`Keystream::generate`] instead.
pub fn generate_keystream(seed_iv: [u8; 4], length: usize) -> Vec<u8> {
    let schedule = KeySchedule::new(&WZ_USER_KEY);
    Keystream::generate(&schedule, seed_iv, length).into_bytes()
}

/// A memoized, deterministic keystream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystream {
    iv: [u8; 4],
    bytes: Vec<u8>,
}

impl Keystream {
    /// Generate `length` bytes from `iv` under `schedule`
    ///
    /// An all-zero IV marks unencrypted archives and yields zero bytes, so
    /// XORing against it is the identity.
    pub fn generate(schedule: &KeySchedule, iv: [u8; 4], length: usize) -> Self {
        if iv == [0; 4] {
            return Self {
                iv,
                bytes: vec![0; length],
            };
        }

        let mut bytes = Vec::with_capacity(length.next_multiple_of(BLOCK_SIZE));
        let mut block = [0u8; BLOCK_SIZE];
        for chunk in block.chunks_exact_mut(4) {
            chunk.copy_from_slice(&iv);
        }

        while bytes.len() < length {
            schedule.encrypt_block(&mut block);
            bytes.extend_from_slice(&block);
        }
        bytes.truncate(length);

        Self { iv, bytes }
    }

    /// Regenerate this keystream at a longer length
    ///
    /// Shorter or equal lengths leave the keystream untouched. Existing bytes
    /// never change since generation is prefix-stable.
    pub fn extend_to(&mut self, schedule: &KeySchedule, length: usize) {
        if length > self.bytes.len() {
            *self = Self::generate(schedule, self.iv, length);
        }
    }

    /// IV this keystream was seeded from
    pub fn iv(&self) -> [u8; 4] {
        self.iv
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are held
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// All keystream bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the keystream, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Keystream byte at `index`, wrapping around the memoized length
    pub fn byte_at(&self, index: usize) -> u8 {
        if self.bytes.is_empty() {
            return 0;
        }
        self.bytes[index % self.bytes.len()]
    }

    /// XOR `data` against the keystream starting at keystream index 0
    pub fn apply(&self, data: &mut [u8]) {
        if self.bytes.is_empty() {
            return;
        }
        for (i, b) in data.iter_mut().enumerate() {
            *b ^= self.bytes[i % self.bytes.len()];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GMS_IV, KMS_IV};

    #[test]
    fn test_gms_keystream_prefix() {
        let ks = generate_keystream(GMS_IV, 32);
        assert_eq!(
            hex::encode(&ks),
            "96ae3fa448fadd904676056197ce78682ba0448fc1567e32fce1f5b31414c522"
        );
    }

    #[test]
    fn test_kms_keystream_prefix() {
        let ks = generate_keystream(KMS_IV, 16);
        assert_eq!(hex::encode(&ks), "ab65490567cd570a987b870aec65078b");
    }

    #[test]
    fn test_first_block_is_encrypted_iv() {
        let schedule = KeySchedule::new(&WZ_USER_KEY);
        let mut block = [0u8; 16];
        for chunk in block.chunks_exact_mut(4) {
            chunk.copy_from_slice(&GMS_IV);
        }
        schedule.encrypt_block(&mut block);

        let ks = Keystream::generate(&schedule, GMS_IV, 16);
        assert_eq!(ks.as_bytes(), &block);
    }

    #[test]
    fn test_blocks_are_chained() {
        let schedule = KeySchedule::new(&WZ_USER_KEY);
        let ks = Keystream::generate(&schedule, GMS_IV, 32);

        let mut next: [u8; 16] = ks.as_bytes()[..16].try_into().unwrap();
        schedule.encrypt_block(&mut next);
        assert_eq!(&ks.as_bytes()[16..], &next);
    }

    #[test]
    fn test_odd_lengths_and_empty() {
        assert!(generate_keystream(GMS_IV, 0).is_empty());
        let ks = generate_keystream(GMS_IV, 21);
        assert_eq!(ks.len(), 21);
        assert_eq!(&ks[..], &generate_keystream(GMS_IV, 48)[..21]);
    }

    #[test]
    fn test_zero_iv_is_identity() {
        let schedule = KeySchedule::new(&WZ_USER_KEY);
        let ks = Keystream::generate(&schedule, [0; 4], 64);
        assert!(ks.as_bytes().iter().all(|&b| b == 0));

        let mut data = vec![1, 2, 3, 4];
        ks.apply(&mut data);
        assert_eq!(data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_byte_at_wraps() {
        let schedule = KeySchedule::new(&WZ_USER_KEY);
        let ks = Keystream::generate(&schedule, GMS_IV, 16);
        assert_eq!(ks.byte_at(0), 0x96);
        assert_eq!(ks.byte_at(16), 0x96);
        assert_eq!(ks.byte_at(17), 0xae);

        let empty = Keystream::generate(&schedule, GMS_IV, 0);
        assert_eq!(empty.byte_at(5), 0);
    }

    #[test]
    fn test_extend_to_keeps_prefix() {
        let schedule = KeySchedule::new(&WZ_USER_KEY);
        let mut ks = Keystream::generate(&schedule, KMS_IV, 20);
        let before = ks.as_bytes().to_vec();

        ks.extend_to(&schedule, 100);
        assert_eq!(ks.len(), 100);
        assert_eq!(&ks.as_bytes()[..20], &before[..]);
        assert_eq!(ks.iv(), KMS_IV);

        ks.extend_to(&schedule, 10);
        assert_eq!(ks.len(), 100);
    }
}
