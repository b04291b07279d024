//! wzimage - Rust decoder for WZ canvas images
//!
//! This crate turns the compressed canvas payloads found in WZ game archives into
//! displayable RGBA images. Payloads are base64 text holding either a plain zlib
//! stream or a container of length-prefixed blocks encrypted with an AES-256
//! derived keystream. The cipher, the DEFLATE decompressor and the texture pixel
//! formats are all implemented in this crate.
//!
//! # Features
//!
//! - AES-256 key schedule and chained keystream for the GMS, KMS and classic keys
//! - Block container decryption with silent recovery from truncated containers
//! - DEFLATE decompression (stored, fixed and dynamic Huffman blocks)
//! - Pixel formats: BGRA4444, BGRA8888, ARGB1555, RGB565, RGB565 16x16 blocks,
//!   DXT3 and DXT5
//! - Format inference for canvases without a declared format
//! - PNG and data URI output
//! - Concurrent batch decoding with the `async` feature
//!
//! # Example - Decoding a request
//!
//! ```no_run
//! use wzimage::{DecodeRequest, WzDecoder};
//!
//! let request = DecodeRequest::from_json(&std::fs::read_to_string("request.json")?)?;
//! let response = WzDecoder::default().handle(request);
//! println!("{}", response.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Example - Decoding raw bytes
//!
//! ```no_run
//! use wzimage::{decode_asset, EncodedAsset, PixelFormat};
//!
//! let payload = std::fs::read("canvas.bin")?;
//! let asset = EncodedAsset::new(payload, 64, 32, Some(PixelFormat::Dxt5.raw()));
//! let image = decode_asset(&asset)?;
//! std::fs::write("canvas.png", image.to_png()?.png)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod common;
pub mod crypto;
pub mod error;
pub mod image;
pub mod inflate;
pub mod message;
pub mod pipeline;
pub mod pixel;
pub mod source;
pub mod tables;

// Async modules (only available with async feature)
#[cfg(feature = "async")]
pub mod async_batch;

// Re-export commonly used types
pub use common::{
    OutputEncoding, PixelFormat, Result, WzImageError, WzKeyVariant, DEFAULT_KEYSTREAM_LEN,
    GMS_IV, KMS_IV, MAX_IMAGE_PIXELS, WZ_USER_KEY,
};
pub use crypto::{decrypt_if_needed, generate_keystream, KeySchedule, Keystream};
pub use image::{assemble, EncodedImage, ImageOutput};
pub use inflate::{inflate, inflate_zlib};
pub use message::{parse_batch, DecodeRequest, DecodeResponse};
pub use pipeline::{decode_asset, DecodeOptions, DecodedImage, WzDecoder};
pub use pixel::decode_pixels;
pub use source::{decode_base64, EncodedAsset};

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
pub use async_batch::AsyncDecodePool;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        // Test that common types are accessible
        let _ = PixelFormat::Dxt3;
        let _ = WzKeyVariant::Kms;

        // Test that functions are accessible
        assert_eq!(generate_keystream([0; 4], 4), vec![0; 4]);
        assert_eq!(
            decode_pixels(&[], 1, 1, PixelFormat::Rgb565).unwrap(),
            vec![0, 0, 0, 255]
        );
    }

    #[test]
    fn test_decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WzDecoder>();
    }
}
