//! Lossy WebP encoding for the format conversion stage.
//!
//! The `image` crate only ships a lossless WebP encoder, so this wraps the
//! `webp` crate (libwebp bindings) to get the quality-parameterized lossy
//! encode the conversion stage needs.

use webp::Encoder;

use super::{validate_raster, EncodeError};

/// Encode RGB pixel data to lossy WebP bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - WebP quality (0.0-100.0, where 100.0 is highest quality)
///
/// # Returns
///
/// WebP-encoded bytes on success, or an error if encoding fails.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` / `EncodeError::InvalidPixelData`
/// for inconsistent input, and `EncodeError::EncodingFailed` when libwebp
/// rejects the raster.
pub fn encode_webp(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    validate_raster(pixels, width, height)?;

    let quality = quality.clamp(0.0, 100.0);

    let encoder = Encoder::from_rgb(pixels, width, height);
    let encoded = encoder
        .encode_simple(false, quality)
        .map_err(|e| EncodeError::EncodingFailed(format!("{:?}", e)))?;

    Ok(encoded.to_vec())
}
