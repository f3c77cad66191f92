//! Grayscale reduction and adaptive binarization.
//!
//! This crate covers the first two pipeline stages:
//! - interleaved RGBA bytes to a single-channel luminance raster (and back for display),
//! - a 5x5 local-mean threshold that turns luminance into a two-level raster.
//!
//! Both stages are per-pixel maps over a read-only input, so the `rayon`
//! feature parallelises them without changing a single output sample.

mod luminance;
mod threshold;

pub use luminance::{
    from_luminance, from_luminance_into, luminance, to_luminance, to_luminance_into, LUMA_WEIGHTS,
};
pub use threshold::{
    adaptive_threshold, adaptive_threshold_into, ThresholdParams, WINDOW_RADIUS, WINDOW_SIZE,
};
