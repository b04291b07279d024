//! AES-256 key expansion and single-block encryption
//!
//! Only the forward cipher is needed: the archive keystream is produced by
//! repeatedly encrypting a running block, never by decrypting.

use crate::tables::{RCON, SBOX};

/// Number of 32-bit words in an AES-256 key
const KEY_WORDS: usize = 8;

/// Number of rounds for AES-256
pub const ROUNDS: usize = 14;

/// Number of 32-bit words in the expanded schedule (15 round keys)
pub const SCHEDULE_WORDS: usize = 4 * (ROUNDS + 1);

/// Expanded AES-256 round-key material
///
/// Built once from a 32-byte key and read-only afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct KeySchedule {
    words: [u32; SCHEDULE_WORDS],
}

impl KeySchedule {
    /// Expand a 32-byte key (FIPS-197 section 5.2, Nk = 8)
    pub fn new(key: &[u8; 32]) -> Self {
        let mut words = [0u32; SCHEDULE_WORDS];

        for (i, chunk) in key.chunks_exact(4).enumerate() {
            words[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        for i in KEY_WORDS..SCHEDULE_WORDS {
            let mut temp = words[i - 1];
            if i % KEY_WORDS == 0 {
                temp = sub_word(temp.rotate_left(8)) ^ (u32::from(RCON[i / KEY_WORDS - 1]) << 24);
            } else if i % KEY_WORDS == 4 {
                temp = sub_word(temp);
            }
            words[i] = words[i - KEY_WORDS] ^ temp;
        }

        Self { words }
    }

    /// The 60 expanded key words
    pub fn words(&self) -> &[u32; SCHEDULE_WORDS] {
        &self.words
    }

    /// Round key `round` (0..=14) as 16 bytes in state order
    pub fn round_key(&self, round: usize) -> [u8; 16] {
        let mut key = [0u8; 16];
        for (col, word) in self.words[round * 4..round * 4 + 4].iter().enumerate() {
            key[col * 4..col * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }
        key
    }

    /// Encrypt one 16-byte block in place
    pub fn encrypt_block(&self, block: &mut [u8; 16]) {
        self.add_round_key(block, 0);

        for round in 1..ROUNDS {
            sub_bytes(block);
            shift_rows(block);
            mix_columns(block);
            self.add_round_key(block, round);
        }

        // Final round has no MixColumns
        sub_bytes(block);
        shift_rows(block);
        self.add_round_key(block, ROUNDS);
    }

    fn add_round_key(&self, state: &mut [u8; 16], round: usize) {
        let key = self.round_key(round);
        for (s, k) in state.iter_mut().zip(key.iter()) {
            *s ^= k;
        }
    }
}

// Elides the 60 key words.
impl std::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySchedule")
            .field("rounds", &ROUNDS)
            .finish_non_exhaustive()
    }
}

fn sub_word(word: u32) -> u32 {
    let b = word.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

fn sub_bytes(state: &mut [u8; 16]) {
    for b in state.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

/// State is column-major: byte `r + 4c` is row `r`, column `c`.
fn shift_rows(state: &mut [u8; 16]) {
    let old = *state;
    for row in 1..4 {
        for col in 0..4 {
            state[row + 4 * col] = old[row + 4 * ((col + row) % 4)];
        }
    }
}

fn xtime(b: u8) -> u8 {
    (b << 1) ^ if b & 0x80 != 0 { 0x1b } else { 0 }
}

fn mix_columns(state: &mut [u8; 16]) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ all ^ xtime(a0 ^ a1);
        col[1] = a1 ^ all ^ xtime(a1 ^ a2);
        col[2] = a2 ^ all ^ xtime(a2 ^ a3);
        col[3] = a3 ^ all ^ xtime(a3 ^ a0);
    }
}
