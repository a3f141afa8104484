//! Image processor - structural validation

use image::error::{LimitError, LimitErrorKind};
use image::{ImageError, ImageReader, Limits};
use std::io::Cursor;

/// Longest side accepted regardless of category.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// Widest pixel layout a decoder may produce (16-bit RGBA).
const MAX_BYTES_PER_PIXEL: u64 = 8;

/// Decoder working memory on top of the pixel buffer.
const DECODER_ALLOC_SLACK: u64 = 4 * 1024 * 1024;

/// Format and dimensions of a fully decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Check the header against `max_pixels`, then decode the whole buffer and report
    /// its format and dimensions.
    ///
    /// Header-only parsing would accept truncated files, so the pixel data is decoded
    /// as well, under allocation limits derived from the declared dimensions.
    /// CPU-bound; callers on an async runtime should use `spawn_blocking`.
    pub fn validate_and_get_info(data: &[u8], max_pixels: u64) -> Result<ImageInfo, ImageError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?;

        let pixels = u64::from(width) * u64::from(height);
        if width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE || pixels > max_pixels {
            tracing::debug!(width, height, max_pixels, "Image dimensions over limit");
            return Err(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::DimensionError,
            )));
        }

        let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string());

        let mut limits = Limits::default();
        limits.max_image_width = Some(width);
        limits.max_image_height = Some(height);
        limits.max_alloc = Some(pixels * MAX_BYTES_PER_PIXEL + DECODER_ALLOC_SLACK);
        reader.limits(limits);

        reader.decode()?;

        Ok(ImageInfo {
            width,
            height,
            format,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    const CAP: u64 = 2048 * 2048;

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in bytes {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 == 1 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
            }
        }
        !crc
    }

    /// A small, valid PNG whose IHDR is rewritten to declare `width` x `height`.
    pub(crate) fn png_declaring(width: u32, height: u32) -> Vec<u8> {
        let img = GrayImage::from_pixel(8, 8, Luma([0]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        // Signature (8), IHDR length (4), "IHDR" (4), then width and height.
        png[16..20].copy_from_slice(&width.to_be_bytes());
        png[20..24].copy_from_slice(&height.to_be_bytes());
        let crc = crc32(&png[12..29]);
        png[29..33].copy_from_slice(&crc.to_be_bytes());
        png
    }

    fn create_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(64, 32, |x, y| {
            Rgba([(x * 4) as u8, (y * 8) as u8, (x ^ y) as u8, 255])
        });
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn create_jpeg() -> Vec<u8> {
        let img = RgbImage::from_pixel(16, 16, Rgb([0, 128, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    #[test]
    fn test_valid_png() {
        let info = ImageProcessor::validate_and_get_info(&create_png(), CAP).unwrap();
        assert_eq!(info.width, 64);
        assert_eq!(info.height, 32);
        assert_eq!(info.format, "Png");
    }

    #[test]
    fn test_valid_jpeg() {
        let info = ImageProcessor::validate_and_get_info(&create_jpeg(), CAP).unwrap();
        assert_eq!((info.width, info.height), (16, 16));
        assert_eq!(info.format, "Jpeg");
    }

    #[test]
    fn test_declared_dimensions_over_cap_rejected_before_decode() {
        let png = png_declaring(12_000, 12_000);
        assert!(png.len() < 1024);

        let err = ImageProcessor::validate_and_get_info(&png, CAP).unwrap_err();
        assert!(matches!(err, ImageError::Limits(_)));
    }

    #[test]
    fn test_side_over_maximum_rejected() {
        let png = png_declaring(MAX_IMAGE_SIDE + 1, 1);
        let err = ImageProcessor::validate_and_get_info(&png, u64::MAX).unwrap_err();
        assert!(matches!(err, ImageError::Limits(_)));
    }

    #[test]
    fn test_pixel_cap_boundary() {
        let png = create_png();
        let info = ImageProcessor::validate_and_get_info(&png, 64 * 32).unwrap();
        assert_eq!((info.width, info.height), (64, 32));

        let err = ImageProcessor::validate_and_get_info(&png, 64 * 32 - 1).unwrap_err();
        assert!(matches!(err, ImageError::Limits(_)));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let png = create_png();
        let truncated = &png[..png.len() / 2];
        assert!(ImageProcessor::validate_and_get_info(truncated, CAP).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(ImageProcessor::validate_and_get_info(b"not an image", CAP).is_err());
    }
}
