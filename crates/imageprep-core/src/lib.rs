//! Imageprep Core - Pre-upload image optimization
//!
//! This crate shrinks user-selected images before they leave the browser:
//! given an arbitrary raster upload it produces a small preview thumbnail,
//! a size/format-optimized version of the image, and statistics about what
//! the optimization achieved.
//!
//! The pipeline is a fixed sequential chain: thumbnail, complexity-aware
//! resize, lossy WebP conversion (kept only if smaller), and a tighter
//! second resize pass when the result is still over the size threshold. It
//! never fails - every stage degrades to passing its input through and
//! records why, so the worst case is "upload the original".

pub mod complexity;
pub mod decode;
pub mod encode;
pub mod pipeline;
pub mod stages;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use complexity::estimate_complexity;
pub use pipeline::{optimize, optimize_with_policy, OptimizationReport, OptimizationStats};
pub use stages::{PassthroughReason, StageStatus};

use serde::{Deserialize, Serialize};

/// An image as a named binary blob with a declared MIME type.
///
/// Serves both as the pipeline's immutable input (the file the user picked)
/// and as each stage's output. The declared MIME type is advisory; decoding
/// sniffs the actual format from the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Filename, used for display and for deriving the converted name.
    pub name: String,
    /// Declared MIME type (e.g. "image/jpeg").
    pub mime: String,
    /// The encoded image bytes.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Create a new ImageFile.
    pub fn new(name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes,
        }
    }

    /// Byte size of the encoded image.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Policy parameters for one optimization run.
///
/// The size threshold and bounds are policy, not invariants: the defaults
/// reproduce the production behavior (800px first pass, 600px second pass
/// above 500 KiB) but callers may tune them per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizePolicy {
    /// Longer-side bound for the first resize pass, in pixels.
    pub resize_bound: u32,
    /// Longer-side bound for the second resize pass, in pixels.
    pub second_pass_bound: u32,
    /// Output size above which the second resize pass runs, in bytes.
    pub second_pass_threshold: usize,
    /// Lossy WebP quality (0.0-100.0).
    pub webp_quality: f32,
    /// Bounding box for the preview thumbnail, in pixels.
    pub thumbnail_bound: u32,
    /// JPEG quality for the thumbnail.
    pub thumbnail_quality: u8,
    /// JPEG quality when the complexity estimate exceeds the threshold.
    pub jpeg_quality_complex: u8,
    /// JPEG quality for flatter images.
    pub jpeg_quality_simple: u8,
    /// Complexity above which the higher JPEG quality is used.
    pub complexity_threshold: f32,
}

impl Default for OptimizePolicy {
    fn default() -> Self {
        Self {
            resize_bound: 800,
            second_pass_bound: 600,
            second_pass_threshold: 500 * 1024,
            webp_quality: 80.0,
            thumbnail_bound: 150,
            thumbnail_quality: 70,
            jpeg_quality_complex: 85,
            jpeg_quality_simple: 75,
            complexity_threshold: 0.7,
        }
    }
}

impl OptimizePolicy {
    /// Create a policy with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_size() {
        let file = ImageFile::new("a.jpg", "image/jpeg", vec![1, 2, 3]);
        assert_eq!(file.size(), 3);
        assert_eq!(file.name, "a.jpg");
        assert_eq!(file.mime, "image/jpeg");
    }

    #[test]
    fn test_image_file_empty() {
        let file = ImageFile::new("empty", "application/octet-stream", vec![]);
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = OptimizePolicy::new();
        assert_eq!(policy.resize_bound, 800);
        assert_eq!(policy.second_pass_bound, 600);
        assert_eq!(policy.second_pass_threshold, 512_000);
        assert_eq!(policy.thumbnail_bound, 150);
        assert_eq!(policy.jpeg_quality_complex, 85);
        assert_eq!(policy.jpeg_quality_simple, 75);
    }

    #[test]
    fn test_policy_roundtrips_through_serde() {
        let policy = OptimizePolicy::default();
        let json = serde_json::to_string(&policy).unwrap();
        let back: OptimizePolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(policy, back);
    }
}
