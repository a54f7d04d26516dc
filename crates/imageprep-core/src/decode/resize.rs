//! Resampling and dimension math for the optimization stages.
//!
//! Two sizing rules live here, one per stage that needs it:
//!
//! - [`fit_even_dimensions`] - the upload-resize rule: cap the longer side,
//!   preserve aspect ratio, floor both axes to even integers for codec block
//!   alignment. Downscale only.
//! - [`scale_to_bound`] - the thumbnail rule: one uniform scale factor on
//!   both axes so the larger side fits the bound. No even rounding.
//!
//! All functions return new `DecodedImage` instances without modifying the
//! input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new `DecodedImage` with the specified dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if either dimension is zero, or
/// `DecodeError::CorruptedFile` if the source pixel buffer is inconsistent.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Calculate upload dimensions: longer side capped at `max_edge`, aspect
/// ratio preserved, both axes floored to the nearest even integer.
///
/// The even rounding applies unconditionally, so an odd-sized image that
/// already fits within `max_edge` still loses its odd row/column. Images are
/// never upscaled: if the longer side is within `max_edge`, only the even
/// rounding changes the dimensions.
///
/// Degenerate inputs (a 1-pixel-wide strip) round down to zero; callers must
/// treat a zero dimension as "cannot resize".
pub fn fit_even_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let aspect = width as f64 / height as f64;
    let (mut new_width, mut new_height) = (width as f64, height as f64);

    if width > height {
        if width > max_edge {
            new_width = max_edge as f64;
            new_height = max_edge as f64 / aspect;
        }
    } else if height > max_edge {
        new_height = max_edge as f64;
        new_width = max_edge as f64 * aspect;
    }

    // Floor to even for better downstream codec block alignment
    let even_width = (new_width as u32 / 2) * 2;
    let even_height = (new_height as u32 / 2) * 2;

    (even_width, even_height)
}

/// Calculate thumbnail dimensions: a single uniform scale factor
/// `min(bound/width, bound/height)` applied to both axes.
///
/// Unlike [`fit_even_dimensions`] this does not force even output and does
/// not guard against upscaling; a tiny source is scaled up to the bound,
/// which is the desired behavior for a fixed-size preview slot.
pub fn scale_to_bound(width: u32, height: u32, bound: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let scale = (bound as f64 / width as f64).min(bound as f64 / height as f64);
    ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
