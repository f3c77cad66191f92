use blobmark_core::Bound;
use serde::{Deserialize, Serialize};

/// One labeled region: its id, inclusive bounding box and pixel count.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub label: u32,
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
    pub area: usize,
}

impl Region {
    pub fn new(label: u32, bound: Bound, area: usize) -> Self {
        Self {
            label,
            x1: bound.x1,
            y1: bound.y1,
            x2: bound.x2,
            y2: bound.y2,
            area,
        }
    }

    pub fn bound(&self) -> Bound {
        Bound {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
        }
    }
}

/// The region with the largest area.
///
/// Ties go to the region listed first. Returns `None` for an empty list,
/// which callers treat as "no marker found".
pub fn select_dominant(regions: &[Region]) -> Option<&Region> {
    regions.iter().fold(None::<&Region>, |best, r| match best {
        Some(b) if b.area >= r.area => Some(b),
        _ => Some(r),
    })
}
