//! Pipeline WASM bindings.
//!
//! # Functions
//!
//! - [`optimize_image`] - Run the full optimization pipeline on file bytes
//! - [`optimize_image_with_policy`] - Same, with a caller-supplied policy object
//! - [`generate_thumbnail`] - Standalone preview generation
//!
//! The pipeline never throws for bad image data: undecodable input produces
//! a result whose optimized bytes equal the input and whose stats report the
//! failure. The only errors surfaced to JavaScript are malformed policy
//! objects.

use imageprep_core::{stages, ImageFile, OptimizePolicy};
use wasm_bindgen::prelude::*;

use crate::types::JsOptimizationResult;

/// Run the full optimization pipeline with the default policy.
///
/// # Arguments
///
/// * `bytes` - The raw file bytes as a `Uint8Array`
/// * `name` - The original filename (used for the converted name)
/// * `mime` - The declared MIME type (advisory; the format is sniffed)
///
/// # Returns
///
/// A `JsOptimizationResult` carrying the upload candidate, the preview data
/// URI, and the statistics. Never throws for undecodable image data.
///
/// # Example
///
/// ```typescript
/// const result = optimize_image(bytes, file.name, file.type);
/// console.log(result.stats());
/// ```
#[wasm_bindgen]
pub fn optimize_image(bytes: &[u8], name: &str, mime: &str) -> JsOptimizationResult {
    let source = ImageFile::new(name, mime, bytes.to_vec());
    JsOptimizationResult::from_report(imageprep_core::optimize(&source))
}

/// Run the optimization pipeline with a caller-supplied policy.
///
/// # Arguments
///
/// * `bytes` / `name` / `mime` - As for [`optimize_image`]
/// * `policy` - A plain object matching `OptimizePolicy` (all fields
///   required, e.g. `{ resizeBound: 800, ... }` is NOT accepted - field
///   names are the Rust snake_case ones)
///
/// # Errors
///
/// Returns an error only when the policy object cannot be deserialized.
#[wasm_bindgen]
pub fn optimize_image_with_policy(
    bytes: &[u8],
    name: &str,
    mime: &str,
    policy: JsValue,
) -> Result<JsOptimizationResult, JsValue> {
    let policy: OptimizePolicy =
        serde_wasm_bindgen::from_value(policy).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let source = ImageFile::new(name, mime, bytes.to_vec());
    Ok(JsOptimizationResult::from_report(
        imageprep_core::optimize_with_policy(&source, &policy),
    ))
}

/// Generate only the preview thumbnail.
///
/// Useful when the UI wants a preview immediately and defers the full
/// pipeline until the user actually hits send.
///
/// # Returns
///
/// A `data:image/jpeg;base64,...` string, or the empty string when the
/// bytes cannot be decoded ("no preview available", not an error).
#[wasm_bindgen]
pub fn generate_thumbnail(bytes: &[u8], name: &str, bound: u32) -> String {
    let source = ImageFile::new(name, "application/octet-stream", bytes.to_vec());
    stages::generate_thumbnail(&source, bound, &OptimizePolicy::default()).data_uri
}
