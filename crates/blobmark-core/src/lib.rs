//! Core raster types for the blobmark pipeline.
//!
//! This crate is intentionally small. It owns the buffer shapes that every
//! stage agrees on (`Rect`, single-channel `Raster<T>`, interleaved RGBA views)
//! and the precondition errors raised when a buffer does not match its shape.

mod error;
mod logger;
mod raster;
mod rect;

pub use error::RasterError;
pub use raster::{Raster, RasterView, RgbaView, RgbaViewMut, RGBA_CHANNELS};
pub use rect::{Bound, Rect};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
