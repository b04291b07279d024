//! Common types and constants for WZ canvas decoding
//!
//! This module defines the core types, constants, and structures shared by the
//! decryption, inflate, pixel-format and image-assembly stages.

use thiserror::Error;

/// Pixel encoding of an inflated canvas payload
///
/// The discriminants are the raw format values stored in WZ canvas properties
/// (the sum of the two format fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 16 bits per pixel, 4 bits per channel, B/G/R/A nibble order
    Bgra4444 = 1,
    /// 32 bits per pixel, B/G/R/A byte order
    Bgra8888 = 2,
    /// 16 bits per pixel, 1-bit alpha and 5 bits per colour channel
    Argb1555 = 257,
    /// 16 bits per pixel, 5/6/5 colour, opaque
    Rgb565 = 513,
    /// One RGB565 value per 16x16 tile
    Rgb565Block = 517,
    /// BC2 block compression, explicit 4-bit alpha
    Dxt3 = 1026,
    /// BC3 block compression, interpolated alpha
    Dxt5 = 2050,
}

impl PixelFormat {
    /// All formats the decoder understands
    pub const ALL: [PixelFormat; 7] = [
        PixelFormat::Bgra4444,
        PixelFormat::Bgra8888,
        PixelFormat::Argb1555,
        PixelFormat::Rgb565,
        PixelFormat::Rgb565Block,
        PixelFormat::Dxt3,
        PixelFormat::Dxt5,
    ];

    /// Create a PixelFormat from a raw WZ value, if it is a known one
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(PixelFormat::Bgra4444),
            2 => Some(PixelFormat::Bgra8888),
            257 => Some(PixelFormat::Argb1555),
            513 => Some(PixelFormat::Rgb565),
            517 => Some(PixelFormat::Rgb565Block),
            1026 => Some(PixelFormat::Dxt3),
            2050 => Some(PixelFormat::Dxt5),
            _ => None,
        }
    }

    /// Create a PixelFormat from a raw WZ value, falling back to BGRA8888
    ///
    /// Unrecognized tags decode with the most permissive layout instead of
    /// being rejected.
    pub fn from_raw(value: i32) -> Self {
        Self::from_i32(value).unwrap_or_else(|| {
            log::warn!("unknown pixel format tag {value}, decoding as BGRA8888");
            PixelFormat::Bgra8888
        })
    }

    /// Raw WZ value of this format
    pub fn raw(&self) -> i32 {
        *self as i32
    }

    /// Short human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Bgra4444 => "BGRA4444",
            PixelFormat::Bgra8888 => "BGRA8888",
            PixelFormat::Argb1555 => "ARGB1555",
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Rgb565Block => "RGB565 (16x16 block)",
            PixelFormat::Dxt3 => "DXT3",
            PixelFormat::Dxt5 => "DXT5",
        }
    }

    /// Number of inflated bytes a canvas of this format and size occupies
    ///
    /// Fails with [`WzImageError::ImageTooLarge`] above [`MAX_IMAGE_PIXELS`].
    pub fn raw_size(&self, width: u32, height: u32) -> Result<usize> {
        check_pixel_count(width, height)?;
        let w = width as usize;
        let h = height as usize;
        Ok(match self {
            PixelFormat::Bgra4444 | PixelFormat::Argb1555 | PixelFormat::Rgb565 => w * h * 2,
            PixelFormat::Bgra8888 => w * h * 4,
            PixelFormat::Rgb565Block => w.div_ceil(16) * h.div_ceil(16) * 2,
            PixelFormat::Dxt3 | PixelFormat::Dxt5 => w.div_ceil(4) * h.div_ceil(4) * 16,
        })
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.raw())
    }
}

/// Which IV seeds the archive keystream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WzKeyVariant {
    /// Global releases
    #[default]
    Gms,
    /// Korean and several regional releases
    Kms,
    /// Zero IV, payloads are not encrypted
    Classic,
    /// Any other 4-byte IV
    Custom([u8; 4]),
}

impl WzKeyVariant {
    /// The 4-byte IV for this variant
    pub fn iv(&self) -> [u8; 4] {
        match self {
            WzKeyVariant::Gms => GMS_IV,
            WzKeyVariant::Kms => KMS_IV,
            WzKeyVariant::Classic => [0; 4],
            WzKeyVariant::Custom(iv) => *iv,
        }
    }
}

/// How the image assembler hands back encoded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Raw PNG bytes
    Png,
    /// `data:image/png;base64,...` string
    #[default]
    DataUri,
}

/// Error type for WZ canvas decoding
#[derive(Debug, Error)]
pub enum WzImageError {
    /// Payload text is not valid base64
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Zero width or height
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Dimensions beyond the supported pixel count
    #[error("Image too large: {width}x{height} exceeds {max} pixels", max = MAX_IMAGE_PIXELS)]
    ImageTooLarge {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// RGBA buffer does not match the declared dimensions
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize {
        /// Bytes required by the dimensions
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// PNG encoder failure
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    /// Malformed request or response JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid data format or corruption
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for WZ canvas decoding
pub type Result<T> = std::result::Result<T, WzImageError>;

/// Fixed 32-byte AES-256 user key of WZ archives
pub const WZ_USER_KEY: [u8; 32] = [
    0x13, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0xB4, 0x00, 0x00, 0x00,
    0x1B, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x33, 0x00, 0x00, 0x00, 0x52, 0x00, 0x00, 0x00,
];

/// IV of global releases
pub const GMS_IV: [u8; 4] = [0x4D, 0x23, 0xC7, 0x2B];

/// IV of Korean releases
pub const KMS_IV: [u8; 4] = [0xB9, 0x7D, 0x63, 0xE9];

/// Number of keystream bytes the decoder memoizes
pub const DEFAULT_KEYSTREAM_LEN: usize = 0x10000; // 64KB

/// Largest accepted canvas, in pixels (64MB of RGBA)
pub const MAX_IMAGE_PIXELS: u64 = 4096 * 4096;

/// Pixel count of a `width * height` canvas, at most [`MAX_IMAGE_PIXELS`]
///
/// Zero-sized canvases are allowed here. Any byte size derived from the
/// result fits in `usize`.
pub fn check_pixel_count(width: u32, height: u32) -> Result<usize> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_IMAGE_PIXELS {
        return Err(WzImageError::ImageTooLarge { width, height });
    }
    Ok(pixels as usize)
}

/// Checks that a canvas size is non-empty and within [`MAX_IMAGE_PIXELS`]
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(WzImageError::InvalidDimensions { width, height });
    }
    check_pixel_count(width, height).map(|_| ())
}
