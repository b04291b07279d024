//! Decode pipeline
//!
//! [`WzDecoder`] strings the stages together: block decryption, inflate,
//! pixel-format decoding and PNG assembly. It owns the AES key schedule and a
//! memoized keystream, both built once in [`WzDecoder::new`] and read-only
//! afterwards, so a single decoder can be shared across threads.

use std::sync::OnceLock;

use crate::common::{
    validate_dimensions, OutputEncoding, PixelFormat, Result, WzKeyVariant,
    DEFAULT_KEYSTREAM_LEN, WZ_USER_KEY,
};
use crate::crypto::{decrypt_if_needed, is_zlib_header, KeySchedule, Keystream};
use crate::image::{assemble, EncodedImage, ImageOutput};
use crate::inflate::{inflate, inflate_zlib};
use crate::message::{DecodeRequest, DecodeResponse};
use crate::pixel::decode_pixels;
use crate::source::EncodedAsset;

/// Decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// IV that seeds the keystream
    pub key_variant: WzKeyVariant,
    /// Number of keystream bytes to precompute
    pub keystream_len: usize,
    /// Encoding returned by [`WzDecoder::decode_to_output`]
    pub output: OutputEncoding,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            key_variant: WzKeyVariant::default(),
            keystream_len: DEFAULT_KEYSTREAM_LEN,
            output: OutputEncoding::default(),
        }
    }
}

impl DecodeOptions {
    /// Default options: GMS key, 64KB keystream, data URI output
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key variant
    pub fn with_key_variant(mut self, key_variant: WzKeyVariant) -> Self {
        self.key_variant = key_variant;
        self
    }

    /// Set the precomputed keystream length
    pub fn with_keystream_len(mut self, keystream_len: usize) -> Self {
        self.keystream_len = keystream_len;
        self
    }

    /// Set the output encoding
    pub fn with_output(mut self, output: OutputEncoding) -> Self {
        self.output = output;
        self
    }
}

/// A canvas decoded to RGBA8888
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Format the payload was decoded as
    pub format: PixelFormat,
    /// Row-major RGBA pixels
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Encode as PNG
    pub fn to_png(&self) -> Result<EncodedImage> {
        assemble(&self.rgba, self.width, self.height)
    }
}

/// WZ canvas decoder
#[derive(Debug)]
pub struct WzDecoder {
    options: DecodeOptions,
    schedule: KeySchedule,
    keystream: Keystream,
}

impl Default for WzDecoder {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl WzDecoder {
    /// Create a decoder, expanding the key and generating the keystream
    pub fn new(options: DecodeOptions) -> Self {
        let schedule = KeySchedule::new(&WZ_USER_KEY);
        let keystream = Keystream::generate(
            &schedule,
            options.key_variant.iv(),
            options.keystream_len,
        );
        Self {
            options,
            schedule,
            keystream,
        }
    }

    /// Options this decoder was built with
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Expanded AES-256 key
    pub fn key_schedule(&self) -> &KeySchedule {
        &self.schedule
    }

    /// Memoized keystream
    pub fn keystream(&self) -> &Keystream {
        &self.keystream
    }

    /// Decrypt and inflate a payload into exactly `expected_size` bytes
    ///
    /// A payload that already starts with a zlib header is inflated directly.
    /// Otherwise it is treated as a block container; if the decrypted bytes
    /// do not start with a zlib header either, the original payload is
    /// inflated as raw DEFLATE.
    pub fn inflate_payload(&self, payload: &[u8], expected_size: usize) -> Vec<u8> {
        if is_zlib_header(payload) {
            return inflate_zlib(payload, expected_size);
        }

        let decrypted = decrypt_if_needed(payload, &self.keystream);
        if is_zlib_header(&decrypted) {
            inflate_zlib(&decrypted, expected_size)
        } else {
            log::debug!(
                "no zlib header after decrypting {} bytes, inflating payload as raw DEFLATE",
                payload.len()
            );
            inflate(payload, expected_size)
        }
    }

    /// Guess the format of a payload with no declared format
    ///
    /// Inflates for a 16-bit canvas first; if the stream fills that buffer up
    /// to its last byte the canvas is taken as BGRA4444, otherwise it is
    /// inflated again as BGRA8888. Returns the format and its inflated bytes.
    pub fn infer_format(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(PixelFormat, Vec<u8>)> {
        let short_size = PixelFormat::Bgra4444.raw_size(width, height)?;
        let data = self.inflate_payload(payload, short_size);
        if significant_len(&data) >= short_size {
            return Ok((PixelFormat::Bgra4444, data));
        }

        let long_size = PixelFormat::Bgra8888.raw_size(width, height)?;
        Ok((PixelFormat::Bgra8888, self.inflate_payload(payload, long_size)))
    }

    /// Decode raw payload bytes to RGBA
    pub fn decode_raw(
        &self,
        payload: &[u8],
        width: u32,
        height: u32,
        declared_format: Option<i32>,
    ) -> Result<DecodedImage> {
        validate_dimensions(width, height)?;

        let (format, raw) = match declared_format {
            Some(tag) => {
                let format = PixelFormat::from_raw(tag);
                (format, self.inflate_payload(payload, format.raw_size(width, height)?))
            }
            None => self.infer_format(payload, width, height)?,
        };

        Ok(DecodedImage {
            width,
            height,
            format,
            rgba: decode_pixels(&raw, width, height, format)?,
        })
    }

    /// Decode an asset to RGBA
    pub fn decode(&self, asset: &EncodedAsset) -> Result<DecodedImage> {
        self.decode_raw(
            &asset.payload,
            asset.width,
            asset.height,
            asset.declared_format,
        )
    }

    /// Decode an asset to PNG
    pub fn decode_to_image(&self, asset: &EncodedAsset) -> Result<EncodedImage> {
        self.decode(asset)?.to_png()
    }

    /// Decode an asset to the configured [`OutputEncoding`]
    pub fn decode_to_output(&self, asset: &EncodedAsset) -> Result<ImageOutput> {
        Ok(self.decode_to_image(asset)?.into_output(self.options.output))
    }

    /// Answer a request; failures become error responses
    pub fn handle(&self, request: DecodeRequest) -> DecodeResponse {
        let result = request
            .to_asset()
            .and_then(|asset| self.decode_to_image(&asset));
        match result {
            Ok(image) => DecodeResponse::image(request.id, image.to_data_uri()),
            Err(err) => {
                log::debug!("request {} failed: {err}", request.id);
                DecodeResponse::error(request.id, &err)
            }
        }
    }
}

/// Number of bytes up to and including the last non-zero byte
pub fn significant_len(data: &[u8]) -> usize {
    data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1)
}

/// Decode an asset with a shared default (GMS) decoder
pub fn decode_asset(asset: &EncodedAsset) -> Result<DecodedImage> {
    static DECODER: OnceLock<WzDecoder> = OnceLock::new();
    DECODER.get_or_init(WzDecoder::default).decode(asset)
}
