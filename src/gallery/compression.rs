//! Upload sniffing and compression for gallery photos

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::common::ApiError;

/// Longest edge of a stored photo
pub const MAX_EDGE: u32 = 1920;
pub const JPEG_QUALITY: u8 = 80;
/// Largest upload accepted before decoding
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ImageProcessingError {
    #[error("empty upload")]
    Empty,

    #[error("upload exceeds {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("unsupported image type: {0}")]
    Unsupported(String),

    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}

impl From<ImageProcessingError> for ApiError {
    fn from(e: ImageProcessingError) -> Self {
        match e {
            ImageProcessingError::Encode(_) => ApiError::ProcessingError(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

/// Photo ready to be written to storage
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ProcessedImage {
    pub const EXTENSION: &'static str = "jpg";
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
}

/// MIME type of an accepted upload, judged from its magic bytes
pub fn sniff_image_type(data: &[u8]) -> Result<&'static str, ImageProcessingError> {
    match infer::get(data).map(|kind| kind.mime_type()) {
        Some(mime @ ("image/jpeg" | "image/png")) => Ok(mime),
        Some(other) => Err(ImageProcessingError::Unsupported(other.to_string())),
        None => Err(ImageProcessingError::Unsupported("unknown".to_string())),
    }
}

/// Dimensions after fitting `(width, height)` inside the `MAX_EDGE` square
pub fn fitted_dimensions(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= MAX_EDGE {
        return (width, height);
    }
    let scale = MAX_EDGE as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// Decodes an upload, shrinks it to `MAX_EDGE` and re-encodes it as JPEG.
/// CPU bound: run it on the blocking pool.
pub fn compress_image(data: &[u8]) -> Result<ProcessedImage, ImageProcessingError> {
    if data.is_empty() {
        return Err(ImageProcessingError::Empty);
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ImageProcessingError::TooLarge);
    }
    sniff_image_type(data)?;

    let decoded = image::load_from_memory(data).map_err(ImageProcessingError::Decode)?;
    let (width, height) = decoded.dimensions();
    let (target_w, target_h) = fitted_dimensions(width, height);

    let resized = if (target_w, target_h) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(ImageProcessingError::Encode)?;

    Ok(ProcessedImage {
        bytes,
        width: target_w,
        height: target_h,
    })
}
