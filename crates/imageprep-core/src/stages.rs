//! The three optimization stages: smart resize, WebP conversion, thumbnail.
//!
//! Stages are infallible by construction. A stage that cannot improve its
//! input (undecodable bytes, codec failure, or a re-encode that came out
//! larger) passes the input through unchanged and records why in its
//! [`StageStatus`], so callers and tests can tell "optimized" apart from
//! "silently degraded". Nothing in this module returns `Err` or panics on
//! arbitrary input bytes.

use serde::Serialize;
use tracing::debug;

use crate::complexity::estimate_complexity;
use crate::decode::{self, DecodedImage, FilterType};
use crate::encode;
use crate::{ImageFile, OptimizePolicy};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Why a stage passed its input through instead of transforming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PassthroughReason {
    /// The input bytes could not be decoded.
    DecodeFailed,
    /// The raster could not be re-encoded (degenerate dimensions included).
    EncodeFailed,
    /// The re-encoded output was not strictly smaller than the input.
    NotSmaller,
}

/// Outcome of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "camelCase")]
pub enum StageStatus {
    /// The stage transformed its input.
    Applied,
    /// The stage returned its input unchanged for the given reason.
    Passthrough(PassthroughReason),
}

impl StageStatus {
    /// True when the stage produced a transformed output.
    pub fn is_applied(&self) -> bool {
        matches!(self, StageStatus::Applied)
    }
}

/// A stage's image output together with its status.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// The stage result; equals the input when `status` is a passthrough.
    pub image: ImageFile,
    /// What the stage actually did.
    pub status: StageStatus,
}

impl StageOutput {
    fn passthrough(input: &ImageFile, reason: PassthroughReason) -> Self {
        Self {
            image: input.clone(),
            status: StageStatus::Passthrough(reason),
        }
    }
}

/// The thumbnail stage's output: a data URI (or empty) plus status.
#[derive(Debug, Clone)]
pub struct ThumbnailOutput {
    /// `data:image/jpeg;base64,...`, or `""` when no preview is available.
    pub data_uri: String,
    /// What the stage actually did.
    pub status: StageStatus,
}

impl ThumbnailOutput {
    fn unavailable(reason: PassthroughReason) -> Self {
        Self {
            data_uri: String::new(),
            status: StageStatus::Passthrough(reason),
        }
    }
}

/// Bound image dimensions and re-encode as JPEG at a complexity-aware
/// quality.
///
/// The longer side is capped at `max_edge` (downscale only), both axes are
/// floored to even integers, and the raster is resampled with Lanczos3.
/// Quality comes from the complexity estimate of the resized raster:
/// `policy.jpeg_quality_complex` above the threshold,
/// `policy.jpeg_quality_simple` below. The output keeps the input filename
/// and always carries `image/jpeg`, even when the dimensions were already
/// within the bound.
///
/// Undecodable or un-encodable input passes through unchanged.
pub fn smart_resize(input: &ImageFile, max_edge: u32, policy: &OptimizePolicy) -> StageOutput {
    let decoded = match decode::decode_image(&input.bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!(name = %input.name, error = %e, "resize: decode failed, passing through");
            return StageOutput::passthrough(input, PassthroughReason::DecodeFailed);
        }
    };

    let (new_width, new_height) = decode::fit_even_dimensions(decoded.width, decoded.height, max_edge);
    if new_width == 0 || new_height == 0 {
        debug!(
            name = %input.name,
            width = decoded.width,
            height = decoded.height,
            "resize: degenerate target dimensions, passing through"
        );
        return StageOutput::passthrough(input, PassthroughReason::EncodeFailed);
    }

    let resized = match decode::resize(&decoded, new_width, new_height, FilterType::Lanczos3) {
        Ok(img) => img,
        Err(_) => return StageOutput::passthrough(input, PassthroughReason::EncodeFailed),
    };

    let quality = select_jpeg_quality(&resized, policy);

    match encode::encode_jpeg(&resized.pixels, resized.width, resized.height, quality) {
        Ok(bytes) => {
            debug!(
                name = %input.name,
                from = input.size(),
                to = bytes.len(),
                width = new_width,
                height = new_height,
                quality,
                "resize: re-encoded"
            );
            StageOutput {
                image: ImageFile::new(&input.name, "image/jpeg", bytes),
                status: StageStatus::Applied,
            }
        }
        Err(e) => {
            debug!(name = %input.name, error = %e, "resize: encode failed, passing through");
            StageOutput::passthrough(input, PassthroughReason::EncodeFailed)
        }
    }
}

/// Pick the JPEG quality for a resized raster from its complexity estimate.
fn select_jpeg_quality(raster: &DecodedImage, policy: &OptimizePolicy) -> u8 {
    let complexity = estimate_complexity(raster);
    if complexity > policy.complexity_threshold {
        policy.jpeg_quality_complex
    } else {
        policy.jpeg_quality_simple
    }
}

/// Re-encode an image as lossy WebP at its original dimensions, keeping the
/// result only if it is strictly smaller than the input.
///
/// The reject-if-worse rule makes this stage size-monotonic: for any input,
/// `convert_to_webp(img).image.size() <= img.size()`. On acceptance the
/// filename extension is replaced with `.webp`.
pub fn convert_to_webp(input: &ImageFile, quality: f32) -> StageOutput {
    let decoded = match decode::decode_image(&input.bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!(name = %input.name, error = %e, "webp: decode failed, passing through");
            return StageOutput::passthrough(input, PassthroughReason::DecodeFailed);
        }
    };

    let encoded = match encode::encode_webp(&decoded.pixels, decoded.width, decoded.height, quality)
    {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(name = %input.name, error = %e, "webp: encode failed, passing through");
            return StageOutput::passthrough(input, PassthroughReason::EncodeFailed);
        }
    };

    if encoded.len() >= input.size() {
        debug!(
            name = %input.name,
            input_size = input.size(),
            webp_size = encoded.len(),
            "webp: result not smaller, keeping input"
        );
        return StageOutput::passthrough(input, PassthroughReason::NotSmaller);
    }

    debug!(
        name = %input.name,
        from = input.size(),
        to = encoded.len(),
        "webp: conversion accepted"
    );
    StageOutput {
        image: ImageFile::new(
            &replace_extension(&input.name, "webp"),
            "image/webp",
            encoded,
        ),
        status: StageStatus::Applied,
    }
}

/// Produce a small JPEG preview as a base64 data URI.
///
/// Scaling uses one uniform factor `min(bound/width, bound/height)` on both
/// axes (no even rounding, small sources are scaled up to fill the preview
/// slot). On any failure the data URI is the empty string; callers must
/// treat that as "no preview available", not as an error.
pub fn generate_thumbnail(input: &ImageFile, bound: u32, policy: &OptimizePolicy) -> ThumbnailOutput {
    let decoded = match decode::decode_image(&input.bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!(name = %input.name, error = %e, "thumbnail: decode failed");
            return ThumbnailOutput::unavailable(PassthroughReason::DecodeFailed);
        }
    };

    let (thumb_width, thumb_height) = decode::scale_to_bound(decoded.width, decoded.height, bound);
    if thumb_width == 0 || thumb_height == 0 {
        return ThumbnailOutput::unavailable(PassthroughReason::EncodeFailed);
    }

    let scaled = match decode::resize(&decoded, thumb_width, thumb_height, FilterType::Bilinear) {
        Ok(img) => img,
        Err(_) => return ThumbnailOutput::unavailable(PassthroughReason::EncodeFailed),
    };

    match encode::encode_jpeg(
        &scaled.pixels,
        scaled.width,
        scaled.height,
        policy.thumbnail_quality,
    ) {
        Ok(bytes) => ThumbnailOutput {
            data_uri: format!("data:image/jpeg;base64,{}", BASE64.encode(&bytes)),
            status: StageStatus::Applied,
        },
        Err(e) => {
            debug!(name = %input.name, error = %e, "thumbnail: encode failed");
            ThumbnailOutput::unavailable(PassthroughReason::EncodeFailed)
        }
    }
}

/// Replace the filename extension, or append one if there is none.
fn replace_extension(name: &str, ext: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() && !name[pos + 1..].contains('/') => {
            format!("{}.{}", &name[..pos], ext)
        }
        _ => format!("{}.{}", name, ext),
    }
}
