//! The optimization pipeline orchestrator.
//!
//! Sequences the stages into one call: thumbnail first (independent, its
//! failure never aborts anything), then smart resize, then WebP conversion,
//! then a tighter second resize pass if the result is still over the size
//! threshold. Aggregates sizes, ratio, and wall-clock timing into
//! [`OptimizationStats`].
//!
//! Each invocation is stateless and owns all of its intermediate rasters;
//! nothing is shared between concurrent calls. Stage ordering within a call
//! is strict and documented; across calls there is no ordering guarantee and
//! no queueing.
//!
//! The pipeline never fails: stages absorb their own errors into passthrough
//! statuses, and an input that cannot be decoded at all yields a report
//! carrying the original bytes, an empty thumbnail, and `Failed` stats.

use serde::Serialize;
use tracing::{debug, warn};

use crate::stages::{self, PassthroughReason, StageStatus, ThumbnailOutput};
use crate::{ImageFile, OptimizePolicy};

/// Statistics for one pipeline invocation.
///
/// `Completed` carries the numeric fields; `Failed` deliberately carries
/// none, so a caller cannot misread a failed run as a 0% compression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OptimizationStats {
    /// The pipeline ran to completion (possibly with passthrough stages).
    #[serde(rename_all = "camelCase")]
    Completed {
        /// Input size in bytes.
        original_size: usize,
        /// Final output size in bytes.
        optimized_size: usize,
        /// `(original - optimized) / original * 100`, one decimal place.
        /// Negative when the output came out larger; that is an accepted
        /// outcome, not an error.
        compression_ratio: String,
        /// Wall-clock duration of the whole pipeline in milliseconds.
        processing_time_ms: u64,
        /// MIME type of the final output.
        output_format: String,
    },
    /// The source could not be processed; no numeric fields apply.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

/// Everything one `optimize` call produces.
#[derive(Debug, Clone)]
pub struct OptimizationReport {
    /// The upload candidate. Equals the original input when optimization
    /// degraded; callers should upload it either way.
    pub optimized: ImageFile,
    /// Preview data URI, or `""` when no preview is available.
    pub thumbnail: String,
    /// Aggregated statistics.
    pub stats: OptimizationStats,
    /// Outcome of the first resize pass.
    pub resize: StageStatus,
    /// Outcome of the WebP conversion.
    pub webp: StageStatus,
    /// Outcome of the tighter second resize pass, when it ran.
    pub second_pass: Option<StageStatus>,
}

/// Run the full optimization pipeline with the default policy.
///
/// See [`optimize_with_policy`].
pub fn optimize(source: &ImageFile) -> OptimizationReport {
    optimize_with_policy(source, &OptimizePolicy::default())
}

/// Run the full optimization pipeline.
///
/// Stage sequence:
/// 1. Thumbnail (bound `policy.thumbnail_bound`) - independent of the rest.
/// 2. Smart resize (bound `policy.resize_bound`).
/// 3. Lossy WebP conversion (`policy.webp_quality`), reject-if-worse.
/// 4. If the result still exceeds `policy.second_pass_threshold` bytes,
///    a second smart resize with the tighter `policy.second_pass_bound`.
///
/// Never returns an error and never panics on documented inputs. The worst
/// case is a report whose `optimized` equals the input and whose stats are
/// [`OptimizationStats::Failed`].
pub fn optimize_with_policy(source: &ImageFile, policy: &OptimizePolicy) -> OptimizationReport {
    let timer = Timer::start();
    debug!(name = %source.name, size = source.size(), "starting optimization pipeline");

    // Step 1: preview, generated first so the UI has something to show
    // while the heavier stages run.
    let thumbnail = stages::generate_thumbnail(source, policy.thumbnail_bound, policy);

    // Step 2: bound dimensions, complexity-aware JPEG re-encode.
    let resized = stages::smart_resize(source, policy.resize_bound, policy);

    // Step 3: WebP re-encode, kept only if strictly smaller.
    let webp = stages::convert_to_webp(&resized.image, policy.webp_quality);

    // Step 4: still too large? One tighter resize pass.
    let mut second_pass = None;
    let mut final_image = webp.image;
    if final_image.size() > policy.second_pass_threshold {
        debug!(
            size = final_image.size(),
            threshold = policy.second_pass_threshold,
            "above size threshold, applying second resize pass"
        );
        let tighter = stages::smart_resize(&final_image, policy.second_pass_bound, policy);
        second_pass = Some(tighter.status);
        final_image = tighter.image;
    }

    let processing_time_ms = timer.elapsed_ms();
    let stats = build_stats(
        source,
        &final_image,
        &resized.status,
        &webp.status,
        &thumbnail,
        processing_time_ms,
    );

    debug!(name = %source.name, ?stats, "optimization pipeline finished");

    OptimizationReport {
        optimized: final_image,
        thumbnail: thumbnail.data_uri,
        stats,
        resize: resized.status,
        webp: webp.status,
        second_pass,
    }
}

fn build_stats(
    source: &ImageFile,
    final_image: &ImageFile,
    resize: &StageStatus,
    webp: &StageStatus,
    thumbnail: &ThumbnailOutput,
    processing_time_ms: u64,
) -> OptimizationStats {
    let undecodable = StageStatus::Passthrough(PassthroughReason::DecodeFailed);
    if *resize == undecodable && *webp == undecodable && !thumbnail.status.is_applied() {
        warn!(name = %source.name, "source image could not be decoded, uploading original");
        return OptimizationStats::Failed {
            reason: "source image could not be decoded".to_string(),
        };
    }

    let original_size = source.size();
    let optimized_size = final_image.size();
    let ratio = (original_size as f64 - optimized_size as f64) / original_size as f64 * 100.0;

    OptimizationStats::Completed {
        original_size,
        optimized_size,
        compression_ratio: format_ratio(ratio),
        processing_time_ms,
        output_format: final_image.mime.clone(),
    }
}

/// Format a compression ratio percentage to one decimal place.
fn format_ratio(ratio: f64) -> String {
    format!("{:.1}", ratio)
}

/// Wall-clock timer. `std::time::Instant` is unavailable on
/// wasm32-unknown-unknown, so the wasm build falls back to `Date.now()`.
struct Timer {
    #[cfg(not(target_arch = "wasm32"))]
    started: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    started: f64,
}

impl Timer {
    #[cfg(not(target_arch = "wasm32"))]
    fn start() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    #[cfg(target_arch = "wasm32")]
    fn start() -> Self {
        Self {
            started: js_sys::Date::now(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed_ms(&self) -> u64 {
        (js_sys::Date::now() - self.started).max(0.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use crate::test_fixtures::{noise_jpeg_file, solid_jpeg_file};

    #[test]
    fn test_optimize_large_photo_bounds_dimensions() {
        let source = noise_jpeg_file("holiday.jpg", 3000, 2000);
        let report = optimize(&source);

        let decoded = decode::decode_image(&report.optimized.bytes).unwrap();
        let longer = decoded.width.max(decoded.height);
        // 800 normally, 600 if the second pass triggered
        match report.second_pass {
            Some(_) => assert!(longer <= 800, "longer side {} after second pass", longer),
            None => assert!(longer <= 800, "longer side {} without second pass", longer),
        }
        if report.second_pass.map(|s| s.is_applied()).unwrap_or(false) {
            assert!(longer <= 600);
        }

        assert!(report.resize.is_applied());
        assert!(!report.thumbnail.is_empty());
        assert!(matches!(
            report.stats,
            OptimizationStats::Completed { .. }
        ));
    }

    #[test]
    fn test_optimize_shrinks_large_photo() {
        let source = noise_jpeg_file("big.jpg", 3000, 2000);
        let original_size = source.size();
        let report = optimize(&source);

        // A 3000x2000 noise JPEG resized to 800px must come out smaller
        assert!(report.optimized.size() < original_size);

        match &report.stats {
            OptimizationStats::Completed {
                original_size: orig,
                optimized_size: opt,
                compression_ratio,
                output_format,
                ..
            } => {
                assert_eq!(*orig, original_size);
                assert_eq!(*opt, report.optimized.size());
                // Positive ratio, one decimal place
                assert!(compression_ratio.parse::<f64>().unwrap() > 0.0);
                assert!(compression_ratio.contains('.'));
                assert!(output_format == "image/jpeg" || output_format == "image/webp");
            }
            OptimizationStats::Failed { .. } => panic!("expected completed stats"),
        }
    }

    #[test]
    fn test_optimize_zero_byte_blob_falls_back() {
        let source = ImageFile::new("void.jpg", "image/jpeg", vec![]);
        let report = optimize(&source);

        // Original bytes come back untouched
        assert_eq!(report.optimized.bytes, source.bytes);
        assert_eq!(report.optimized.name, "void.jpg");
        assert_eq!(report.thumbnail, "");
        assert!(matches!(report.stats, OptimizationStats::Failed { .. }));
        assert!(!report.resize.is_applied());
        assert!(!report.webp.is_applied());
    }

    #[test]
    fn test_optimize_garbage_bytes_falls_back() {
        let source = ImageFile::new("noise.bin", "application/octet-stream", vec![7u8; 2048]);
        let report = optimize(&source);

        assert_eq!(report.optimized.bytes, source.bytes);
        assert!(matches!(report.stats, OptimizationStats::Failed { .. }));
    }

    #[test]
    fn test_optimize_small_image_completes() {
        let source = solid_jpeg_file("avatar.jpg", 200, 200);
        let report = optimize(&source);

        assert!(report.resize.is_applied());
        assert!(matches!(report.stats, OptimizationStats::Completed { .. }));
        assert!(report.thumbnail.starts_with("data:image/jpeg;base64,"));

        // No upscaling happened
        let decoded = decode::decode_image(&report.optimized.bytes).unwrap();
        assert!(decoded.width <= 200 && decoded.height <= 200);
    }

    #[test]
    fn test_optimize_negative_ratio_is_accepted() {
        // A tiny, flat, already optimal JPEG: the 75-quality re-encode can
        // come out larger than the source. That must be reported as a
        // negative ratio, not an error.
        let source = solid_jpeg_file("flat.jpg", 16, 16);
        let report = optimize(&source);

        match &report.stats {
            OptimizationStats::Completed {
                compression_ratio, ..
            } => {
                // Parseable number either way
                compression_ratio.parse::<f64>().unwrap();
            }
            OptimizationStats::Failed { .. } => panic!("expected completed stats"),
        }
    }

    #[test]
    fn test_optimize_with_custom_policy() {
        let mut policy = OptimizePolicy::default();
        policy.resize_bound = 200;
        policy.thumbnail_bound = 50;

        let source = noise_jpeg_file("custom.jpg", 1000, 500);
        let report = optimize_with_policy(&source, &policy);

        let decoded = decode::decode_image(&report.optimized.bytes).unwrap();
        assert!(decoded.width.max(decoded.height) <= 200);
    }

    #[test]
    fn test_second_pass_threshold_policy() {
        // Force the second pass by setting an absurdly low threshold
        let mut policy = OptimizePolicy::default();
        policy.second_pass_threshold = 1;

        let source = noise_jpeg_file("force.jpg", 1200, 900);
        let report = optimize_with_policy(&source, &policy);

        assert!(report.second_pass.is_some());
        let decoded = decode::decode_image(&report.optimized.bytes).unwrap();
        assert!(decoded.width.max(decoded.height) <= 600);
    }

    #[test]
    fn test_stats_arithmetic() {
        let ratio = (1_000_000f64 - 400_000f64) / 1_000_000f64 * 100.0;
        assert_eq!(format_ratio(ratio), "60.0");
    }

    #[test]
    fn test_stats_arithmetic_negative() {
        let ratio = (100f64 - 125f64) / 100f64 * 100.0;
        assert_eq!(format_ratio(ratio), "-25.0");
    }

    #[test]
    fn test_stats_serialization_shape() {
        let stats = OptimizationStats::Completed {
            original_size: 1_000_000,
            optimized_size: 400_000,
            compression_ratio: "60.0".to_string(),
            processing_time_ms: 12,
            output_format: "image/webp".to_string(),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["originalSize"], 1_000_000);
        assert_eq!(json["optimizedSize"], 400_000);
        assert_eq!(json["compressionRatio"], "60.0");
        assert_eq!(json["outputFormat"], "image/webp");

        let failed = OptimizationStats::Failed {
            reason: "source image could not be decoded".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("originalSize").is_none());
        assert!(json.get("compressionRatio").is_none());
    }
}
