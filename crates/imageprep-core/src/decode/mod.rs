//! Image decoding for the optimization pipeline.
//!
//! This module provides functionality for:
//! - Decoding arbitrary raster uploads (JPEG, PNG, WebP) with format sniffing
//! - EXIF orientation correction (matching what a browser renderer would do)
//! - The dimension math and resampling used by the pipeline stages
//!
//! # Architecture
//!
//! Decoding is synchronous and allocation-owned: each call produces a fresh
//! `DecodedImage` that belongs to exactly one pipeline invocation. Decode
//! failures are ordinary `Result` errors here; the pipeline stages absorb
//! them into passthrough outcomes rather than surfacing them to callers.

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, get_orientation};
pub use resize::{fit_even_dimensions, resize, scale_to_bound};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
