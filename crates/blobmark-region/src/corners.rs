//! Bounding-box corner estimation for a roughly rectangular region.
//!
//! For each corner of the region's box, the region pixel with the smallest
//! squared distance to that box corner wins. This is not a contour tracer:
//! it assumes the true corners of the marker lie near its bounding box.

use blobmark_core::{RasterError, RasterView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::Region;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Logical box corner, in the order corners are stored in a [`CornerSet`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerKind {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl CornerKind {
    pub const ALL: [CornerKind; 4] = [
        CornerKind::TopLeft,
        CornerKind::TopRight,
        CornerKind::BottomLeft,
        CornerKind::BottomRight,
    ];
}

/// Which pixels of the box are scanned.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerScan {
    /// `x1..=x2` by `y1..=y2`: every pixel of the inclusive box.
    #[default]
    Inclusive,
    /// `x1..x2` by `y1..y2`: the last column and row of the box are skipped.
    HalfOpen,
}

/// Best pixel found so far for one box corner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub position: Point2<usize>,
    /// Squared euclidean distance to the box corner; `u64::MAX` while unset.
    pub distance: u64,
}

impl Corner {
    pub fn unset() -> Self {
        Self {
            position: Point2::new(0, 0),
            distance: u64::MAX,
        }
    }

    pub fn is_set(&self) -> bool {
        self.distance != u64::MAX
    }
}

/// Corners ordered top-left, top-right, bottom-left, bottom-right.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    pub corners: [Corner; 4],
}

impl Default for CornerSet {
    fn default() -> Self {
        Self::unset()
    }
}

impl CornerSet {
    pub fn unset() -> Self {
        Self {
            corners: [Corner::unset(); 4],
        }
    }

    pub fn get(&self, kind: CornerKind) -> &Corner {
        &self.corners[kind as usize]
    }

    /// `true` once a matching pixel has been seen; all four are set together.
    pub fn is_complete(&self) -> bool {
        self.corners.iter().all(Corner::is_set)
    }

    /// Corner positions, or `None` when no pixel of the region was scanned.
    pub fn positions(&self) -> Option<[Point2<usize>; 4]> {
        self.is_complete().then(|| self.corners.map(|c| c.position))
    }

    /// Offer one pixel with its four corner distances.
    ///
    /// A strictly smaller distance replaces the current winner, so the first
    /// of several equidistant pixels is kept.
    #[inline]
    pub fn offer(&mut self, position: Point2<usize>, distances: [u64; 4]) {
        for (corner, distance) in self.corners.iter_mut().zip(distances) {
            if distance < corner.distance {
                *corner = Corner { position, distance };
            }
        }
    }

    /// Combine partial results; `self` must cover pixels scanned before `other`.
    ///
    /// Ties keep `self`, which preserves first-minimum-wins across partitions.
    pub fn merge(mut self, other: CornerSet) -> CornerSet {
        for (mine, theirs) in self.corners.iter_mut().zip(other.corners) {
            if theirs.distance < mine.distance {
                *mine = theirs;
            }
        }
        self
    }
}

/// Locate the pixels labeled `region.label` nearest each corner of the region's box.
///
/// Pixels are visited row by row, left to right. If no scanned pixel carries
/// the label, every corner stays unset; check [`CornerSet::is_complete`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(labels), fields(label = region.label))
)]
pub fn find_corners(
    labels: &RasterView<'_, u32>,
    region: &Region,
    scan: CornerScan,
) -> Result<CornerSet, RasterError> {
    labels.validate()?;
    labels.rect.check_bound(&region.bound())?;

    let (x_end, y_end) = match scan {
        CornerScan::Inclusive => (region.x2 + 1, region.y2 + 1),
        CornerScan::HalfOpen => (region.x2, region.y2),
    };
    let rows = region.y1..y_end;

    #[cfg(feature = "rayon")]
    let set = rows
        .into_par_iter()
        .map(|y| scan_row(labels, region, y, x_end))
        .reduce(CornerSet::unset, CornerSet::merge);

    #[cfg(not(feature = "rayon"))]
    let set = rows
        .map(|y| scan_row(labels, region, y, x_end))
        .fold(CornerSet::unset(), CornerSet::merge);

    if !set.is_complete() {
        log::debug!("region {} has no pixels inside its scan window", region.label);
    }
    Ok(set)
}

fn scan_row(
    labels: &RasterView<'_, u32>,
    region: &Region,
    y: usize,
    x_end: usize,
) -> CornerSet {
    let mut set = CornerSet::unset();
    let row = labels.row(y);
    let dy1 = sq(region.y1.abs_diff(y));
    let dy2 = sq(region.y2.abs_diff(y));

    for x in region.x1..x_end {
        if row[x] != region.label {
            continue;
        }
        let dx1 = sq(region.x1.abs_diff(x));
        let dx2 = sq(region.x2.abs_diff(x));
        set.offer(Point2::new(x, y), [dx1 + dy1, dx2 + dy1, dx1 + dy2, dx2 + dy2]);
    }
    set
}

#[inline]
fn sq(d: usize) -> u64 {
    let d = d as u64;
    d * d
}
