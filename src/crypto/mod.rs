//! Archive decryption
//!
//! This module provides the AES-256 key schedule, the chained keystream built
//! on top of it, and the length-prefixed block container decryption.

pub mod aes;
pub mod block;
pub mod keystream;

pub use aes::KeySchedule;
pub use block::{blocks, decrypt_if_needed, encrypt_blocks, is_zlib_header, BlockStop, Blocks};
pub use keystream::{generate_keystream, Keystream};
