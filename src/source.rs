//! Byte source decoding
//!
//! Canvas payloads arrive as base64 text. This module turns that text into
//! raw bytes and bundles them with the canvas dimensions and declared format.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::common::Result;

/// Standard alphabet; trailing `=` padding may be present or missing
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 payload text into bytes
///
/// Surrounding and embedded whitespace is ignored, and a `data:...;base64,`
/// prefix is stripped.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let body = match text.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, body)| body),
        None => text,
    };

    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(LENIENT.decode(compact)?)
}

/// A compressed canvas as handed to the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    /// Raw payload: a zlib stream or a block-encrypted container
    pub payload: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw WZ format tag, `None` when unknown
    pub declared_format: Option<i32>,
}

impl EncodedAsset {
    /// Create an asset from raw payload bytes
    pub fn new(payload: Vec<u8>, width: u32, height: u32, declared_format: Option<i32>) -> Self {
        Self {
            payload,
            width,
            height,
            declared_format,
        }
    }

    /// Create an asset from base64 payload text
    pub fn from_base64(
        text: &str,
        width: u32,
        height: u32,
        declared_format: Option<i32>,
    ) -> Result<Self> {
        Ok(Self::new(decode_base64(text)?, width, height, declared_format))
    }
}
