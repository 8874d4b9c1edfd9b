//! Image preparation for upload
//!
//! Photos are decoded and re-encoded as JPEG to keep request size down, then
//! base64-encoded for embedding in a data URL.

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use super::AnalysisError;

/// JPEG quality used for uploads (0-100)
pub const JPEG_QUALITY: u8 = 60;

/// Decode any supported image format and return base64 JPEG bytes
pub fn encode_jpeg_base64(bytes: &[u8]) -> Result<String, AnalysisError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AnalysisError::InvalidImage(e.to_string()))?;

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))
        .map_err(|e| AnalysisError::InvalidImage(e.to_string()))?;

    Ok(general_purpose::STANDARD.encode(jpeg))
}

pub fn jpeg_data_url(base64_jpeg: &str) -> String {
    format!("data:image/jpeg;base64,{}", base64_jpeg)
}
