//! RGBA image assembly
//!
//! Encodes a decoded RGBA8888 buffer as an 8-bit RGBA PNG and optionally wraps
//! it in a `data:` URI for callers that display images inline.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::common::{validate_dimensions, OutputEncoding, Result, WzImageError};

/// Prefix of a PNG data URI
pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A PNG-encoded canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// PNG file bytes
    pub png: Vec<u8>,
}

impl EncodedImage {
    /// The PNG as a `data:image/png;base64,...` string
    pub fn to_data_uri(&self) -> String {
        format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&self.png))
    }

    /// Convert into the requested output encoding
    pub fn into_output(self, encoding: OutputEncoding) -> ImageOutput {
        match encoding {
            OutputEncoding::Png => ImageOutput::Png(self.png),
            OutputEncoding::DataUri => ImageOutput::DataUri(self.to_data_uri()),
        }
    }
}

/// An encoded image in one of the [`OutputEncoding`] forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutput {
    /// Raw PNG bytes
    Png(Vec<u8>),
    /// PNG data URI
    DataUri(String),
}

/// Encode `rgba` (`width * height * 4` bytes) as a PNG
pub fn assemble(rgba: &[u8], width: u32, height: u32) -> Result<EncodedImage> {
    validate_dimensions(width, height)?;
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(WzImageError::BufferSize {
            expected,
            actual: rgba.len(),
        });
    }

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba)?;
        writer.finish()?;
    }

    Ok(EncodedImage {
        width,
        height,
        png: buffer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_png(bytes: &[u8]) -> (u32, u32, png::ColorType, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, info.color_type, buf)
    }

    #[test]
    fn test_png_round_trip() {
        let rgba: Vec<u8> = (0..2 * 3 * 4).map(|i| (i * 10) as u8).collect();
        let image = assemble(&rgba, 2, 3).unwrap();
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(&image.png[..8], b"\x89PNG\r\n\x1a\n");

        let (w, h, color, pixels) = read_png(&image.png);
        assert_eq!((w, h), (2, 3));
        assert_eq!(color, png::ColorType::Rgba);
        assert_eq!(pixels, rgba);
    }

    #[test]
    fn test_data_uri() {
        let image = assemble(&[0, 0, 0, 0], 1, 1).unwrap();
        let uri = image.to_data_uri();
        assert!(uri.starts_with(DATA_URI_PREFIX));

        let decoded = STANDARD.decode(&uri[DATA_URI_PREFIX.len()..]).unwrap();
        assert_eq!(decoded, image.png);
    }

    #[test]
    fn test_into_output() {
        let image = assemble(&[1, 2, 3, 4], 1, 1).unwrap();
        let uri = image.to_data_uri();
        assert_eq!(
            image.clone().into_output(OutputEncoding::Png),
            ImageOutput::Png(image.png.clone())
        );
        assert_eq!(
            image.into_output(OutputEncoding::DataUri),
            ImageOutput::DataUri(uri)
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            assemble(&[], 0, 1),
            Err(WzImageError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            assemble(&[0; 7], 1, 2),
            Err(WzImageError::BufferSize {
                expected: 8,
                actual: 7
            })
        ));
    }
}
