//! Region isolation and corner location on labeled rasters.
//!
//! This crate does not decide which pixels belong together. It consumes the
//! output of a [`Labeler`] (a label raster plus one [`Region`] per label),
//! picks the dominant region, isolates it, and estimates its four corners.
//!
//! [`FloodFillLabeler`] is a small reference labeler so the pipeline can run
//! end to end; any implementation honouring the [`Labeler`] contract works.

mod colorize;
mod corners;
mod labeler;
mod mask;
mod region;

pub use colorize::{colorize_labels, label_color};
pub use corners::{find_corners, Corner, CornerKind, CornerScan, CornerSet};
pub use labeler::{Connectivity, FloodFillLabeler, Labeler, Labeling};
pub use mask::{
    mask_to_label, mask_to_label_in_place, restrict_to_bound, restrict_to_bound_in_place,
};
pub use region::{select_dominant, Region};
