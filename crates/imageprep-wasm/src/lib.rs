//! Imageprep WASM - WebAssembly bindings for the upload optimization pipeline
//!
//! This crate exposes the imageprep-core pipeline to the chat front-end.
//! The UI hands over the bytes of a user-selected file and gets back the
//! optimized upload candidate, a preview data URI, and the optimization
//! statistics.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for the optimization result
//! - `optimize` - Pipeline bindings (full run, standalone thumbnail)
//!
//! # Usage
//!
//! ```typescript
//! import init, { optimize_image } from '@imageprep/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = optimize_image(bytes, file.name, file.type);
//! preview.src = result.thumbnail;
//! form.append("image", new Blob([result.optimized_bytes()], { type: result.optimized_mime }), result.optimized_name);
//! console.log(result.stats());
//! ```

use wasm_bindgen::prelude::*;

mod optimize;
mod types;

// Re-export public types
pub use optimize::{generate_thumbnail, optimize_image, optimize_image_with_policy};
pub use types::JsOptimizationResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
