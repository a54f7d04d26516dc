//! WASM-compatible wrapper types for the optimization result.
//!
//! The optimized bytes stay in WASM memory until JavaScript asks for them;
//! the statistics and stage statuses cross the boundary as plain objects via
//! `serde-wasm-bindgen`.

use imageprep_core::pipeline::OptimizationReport;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The serializable half of the report: everything except the image bytes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportSummary<'a> {
    stats: &'a imageprep_core::OptimizationStats,
    resize: &'a imageprep_core::StageStatus,
    webp: &'a imageprep_core::StageStatus,
    second_pass: &'a Option<imageprep_core::StageStatus>,
}

/// An optimization result wrapper for JavaScript.
///
/// # Memory Management
///
/// The optimized image bytes live in WASM memory; `optimized_bytes()` copies
/// them out as a `Uint8Array`. wasm-bindgen's finalizer releases the WASM
/// side automatically, or call `free()` to do it eagerly for large images.
#[wasm_bindgen]
pub struct JsOptimizationResult {
    report: OptimizationReport,
}

#[wasm_bindgen]
impl JsOptimizationResult {
    /// Filename of the upload candidate (extension may have changed to .webp)
    #[wasm_bindgen(getter)]
    pub fn optimized_name(&self) -> String {
        self.report.optimized.name.clone()
    }

    /// MIME type of the upload candidate
    #[wasm_bindgen(getter)]
    pub fn optimized_mime(&self) -> String {
        self.report.optimized.mime.clone()
    }

    /// Byte size of the upload candidate
    #[wasm_bindgen(getter)]
    pub fn optimized_size(&self) -> usize {
        self.report.optimized.size()
    }

    /// Preview data URI, or the empty string when no preview is available
    #[wasm_bindgen(getter)]
    pub fn thumbnail(&self) -> String {
        self.report.thumbnail.clone()
    }

    /// Returns the upload candidate's bytes as a Uint8Array (copies).
    pub fn optimized_bytes(&self) -> Vec<u8> {
        self.report.optimized.bytes.clone()
    }

    /// Statistics and per-stage outcomes as a plain JavaScript object.
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        let summary = ReportSummary {
            stats: &self.report.stats,
            resize: &self.report.resize,
            webp: &self.report.webp,
            second_pass: &self.report.second_pass,
        };
        serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically. Call this to immediately release a large image.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsOptimizationResult {
    /// Wrap a core report. Internal constructor used by the bindings.
    pub(crate) fn from_report(report: OptimizationReport) -> Self {
        Self { report }
    }

    #[cfg(test)]
    pub(crate) fn report(&self) -> &OptimizationReport {
        &self.report
    }
}
