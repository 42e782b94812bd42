use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;
pub const THUMBNAIL_SIZE: u32 = 200;

const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Why an uploaded file was refused or could not be processed. All variants
/// are the uploader's problem (a 400), not the server's.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("File too large. Maximum size is {MAX_FILE_SIZE} bytes")]
    TooLarge,
    #[error("Could not detect image format")]
    UnknownFormat,
    #[error("Unsupported image format: {0:?}. Allowed: JPEG, PNG, GIF, WebP")]
    UnsupportedFormat(ImageFormat),
    #[error("Failed to decode image: {0}")]
    Undecodable(String),
    #[error("Failed to encode thumbnail: {0}")]
    Thumbnail(String),
}

/// A validated upload, ready to be stored.
pub struct ProcessedPhoto {
    /// MIME type derived from the sniffed format, never from the client
    pub content_type: &'static str,
    pub thumbnail: Vec<u8>,
}

/// Validate an uploaded file and derive its thumbnail. The format comes from
/// the magic bytes; whatever content type the client claimed is ignored.
pub fn prepare_photo(data: &[u8]) -> Result<ProcessedPhoto, PhotoError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(PhotoError::TooLarge);
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PhotoError::Undecodable(e.to_string()))?;

    let format = reader.format().ok_or(PhotoError::UnknownFormat)?;
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(PhotoError::UnsupportedFormat(format));
    }

    let image = reader
        .decode()
        .map_err(|e| PhotoError::Undecodable(e.to_string()))?;

    // Thumbnails are always JPEG, which has no alpha channel, so flatten
    // before encoding or RGBA sources (PNG, WebP) fail here
    let thumbnail = image.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).into_rgb8();

    let mut encoded = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut encoded, ImageFormat::Jpeg)
        .map_err(|e| PhotoError::Thumbnail(e.to_string()))?;

    Ok(ProcessedPhoto {
        content_type: format.to_mime_type(),
        thumbnail: encoded.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(image: image::DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        assert!(matches!(
            prepare_photo(b"definitely not an image"),
            Err(PhotoError::UnknownFormat)
        ));
    }

    #[test]
    fn test_rejects_oversized_input_without_decoding() {
        let blob = vec![0u8; MAX_FILE_SIZE + 1];
        assert!(matches!(prepare_photo(&blob), Err(PhotoError::TooLarge)));
    }

    #[test]
    fn test_accepts_png() {
        let pixel = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        let bytes = encode(image::DynamicImage::ImageRgb8(pixel), ImageFormat::Png);

        let photo = prepare_photo(&bytes).unwrap();
        assert_eq!(photo.content_type, "image/png");
        assert!(!photo.thumbnail.is_empty());
    }

    #[test]
    fn test_png_with_alpha_gets_jpeg_thumbnail() {
        let pixel = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 0, 128]));
        let bytes = encode(image::DynamicImage::ImageRgba8(pixel), ImageFormat::Png);

        let photo = prepare_photo(&bytes).unwrap();
        assert_eq!(photo.content_type, "image/png");
        // The thumbnail itself must decode as JPEG
        let sniffed = ImageReader::new(Cursor::new(&photo.thumbnail))
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(sniffed, Some(ImageFormat::Jpeg));
    }
}
