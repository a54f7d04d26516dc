//! Image encoding for the optimization pipeline.
//!
//! This module provides functionality for:
//! - Encoding rasters to JPEG with configurable quality (resize + thumbnail
//!   stages)
//! - Encoding rasters to lossy WebP with configurable quality (format
//!   conversion stage)
//!
//! Both encoders validate dimensions and buffer length up front so that the
//! stages can map any failure to a passthrough outcome without partial
//! output.

mod jpeg;
mod webp;

use thiserror::Error;

pub use self::jpeg::encode_jpeg;
pub use self::webp::encode_webp;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the input
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Validate raster dimensions and buffer length shared by both encoders.
fn validate_raster(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    Ok(())
}
