//! High-level facade for the `blobmark-*` workspace.
//!
//! blobmark finds a rectangular, high-contrast marker (a printed code, a
//! fiducial square) in an arbitrary photographed page:
//!
//! 1. RGBA pixels are reduced to luminance,
//! 2. a 5x5 local-mean threshold binarizes them, robust to uneven lighting,
//! 3. a labeler splits the dark pixels into connected regions,
//! 4. the largest region is isolated,
//! 5. optionally, the region pixels nearest its bounding-box corners are located
//!    for later geometric correction.
//!
//! ## Quickstart
//!
//! ```no_run
//! use blobmark::{LocateParams, MarkerLocator};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("page.jpg")?.decode()?.to_rgba8();
//! let locator = MarkerLocator::new(LocateParams::default());
//!
//! match locator.locate(&blobmark::detect::rgba_view(&img)?) {
//!     Ok(found) => println!("marker at {:?}", found.corners),
//!     Err(e) if e.is_not_detected() => println!("no marker"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `blobmark::core`: rects, rasters, precondition errors, logger.
//! - `blobmark::binarize`: luminance and adaptive threshold.
//! - `blobmark::region`: labeler seam, dominant region, masks, corners.
//! - `blobmark::detect` (feature `image`): adapters from `image` buffers.

pub use blobmark_binarize as binarize;
pub use blobmark_core as core;
pub use blobmark_region as region;

pub use blobmark_binarize::ThresholdParams;
pub use blobmark_core::{Bound, Raster, RasterError, RasterView, Rect, RgbaView, RgbaViewMut};
pub use blobmark_region::{
    Connectivity, Corner, CornerKind, CornerScan, CornerSet, FloodFillLabeler, Labeler, Region,
};

mod locate;

pub use nalgebra::Point2;

pub use locate::{Isolation, LocateError, LocateParams, MarkerLocation, MarkerLocator};

#[cfg(feature = "image")]
pub mod detect;
