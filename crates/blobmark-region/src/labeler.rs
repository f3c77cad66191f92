//! Connected-component labeling seam.

use blobmark_core::{Bound, Raster, RasterError, RasterView};
use serde::{Deserialize, Serialize};

use crate::Region;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Pixel adjacency used when growing a region.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge neighbours only.
    #[default]
    Four,
    /// Edge and diagonal neighbours.
    Eight,
}

/// Output of a labeler.
///
/// `labels` has the input's dimensions; 0 marks background and every other
/// value is the label of a region. `regions` holds exactly one entry per
/// label, with an exact inclusive bounding box and pixel count.
#[derive(Clone, Debug, PartialEq)]
pub struct Labeling {
    pub labels: Raster<u32>,
    pub regions: Vec<Region>,
}

/// Splits the `foreground` pixels of a binary raster into connected regions.
pub trait Labeler {
    fn label<T>(&self, binary: &RasterView<'_, T>, foreground: T) -> Result<Labeling, RasterError>
    where
        T: Copy + PartialEq;
}

/// Stack-based flood fill labeler.
///
/// Labels are handed out from 1 in raster order of each region's first
/// pixel, and `regions` is sorted by label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodFillLabeler {
    pub connectivity: Connectivity,
}

impl FloodFillLabeler {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }
}

impl Labeler for FloodFillLabeler {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, binary, foreground),
            fields(width = binary.rect.width, height = binary.rect.height)
        )
    )]
    fn label<T>(&self, binary: &RasterView<'_, T>, foreground: T) -> Result<Labeling, RasterError>
    where
        T: Copy + PartialEq,
    {
        binary.validate()?;
        let rect = binary.rect;
        let (w, h) = (rect.width, rect.height);
        let mut labels = Raster::filled(rect, 0u32)?;
        let mut regions = Vec::new();
        let mut stack = Vec::new();

        for start in 0..rect.len() {
            if binary.data[start] != foreground || labels.as_slice()[start] != 0 {
                continue;
            }

            let label = u32::try_from(regions.len() + 1).map_err(|_| {
                RasterError::LabelOverflow {
                    regions: regions.len(),
                }
            })?;
            let out = labels.as_mut_slice();
            let (sx, sy) = (start % w, start / w);
            let mut bound = Bound {
                x1: sx,
                y1: sy,
                x2: sx,
                y2: sy,
            };
            let mut area = 0usize;

            out[start] = label;
            stack.push(start);
            while let Some(idx) = stack.pop() {
                let (x, y) = (idx % w, idx / w);
                area += 1;
                bound.x1 = bound.x1.min(x);
                bound.x2 = bound.x2.max(x);
                bound.y1 = bound.y1.min(y);
                bound.y2 = bound.y2.max(y);

                for (nx, ny) in neighbours(x, y, w, h, self.connectivity) {
                    let n = ny * w + nx;
                    if out[n] == 0 && binary.data[n] == foreground {
                        out[n] = label;
                        stack.push(n);
                    }
                }
            }

            regions.push(Region::new(label, bound, area));
        }

        log::debug!(
            "labeled {} regions in {}x{} ({:?})",
            regions.len(),
            w,
            h,
            self.connectivity
        );
        Ok(Labeling { labels, regions })
    }
}

const OFFSETS_4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const OFFSETS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn neighbours(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    connectivity: Connectivity,
) -> impl Iterator<Item = (usize, usize)> {
    let offsets: &'static [(isize, isize)] = match connectivity {
        Connectivity::Four => &OFFSETS_4,
        Connectivity::Eight => &OFFSETS_8,
    };
    offsets.iter().filter_map(move |&(dx, dy)| {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < w && ny < h).then_some((nx, ny))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobmark_core::Rect;

    fn binary(w: usize, h: usize, rows: &[&str]) -> Raster<u8> {
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { 0 } else { 255 }))
            .collect();
        Raster::from_vec(Rect::new(w, h).unwrap(), data).unwrap()
    }

    #[test]
    fn regions_carry_exact_bounds_and_areas() {
        let img = binary(6, 4, &["##..#.", "#...#.", "....##", ".###.."]);
        let lab = FloodFillLabeler::default().label(&img.view(), 0).unwrap();

        assert_eq!(
            lab.regions,
            vec![
                Region {
                    label: 1,
                    x1: 0,
                    y1: 0,
                    x2: 1,
                    y2: 1,
                    area: 3
                },
                Region {
                    label: 2,
                    x1: 4,
                    y1: 0,
                    x2: 5,
                    y2: 2,
                    area: 4
                },
                Region {
                    label: 3,
                    x1: 1,
                    y1: 3,
                    x2: 3,
                    y2: 3,
                    area: 3
                },
            ]
        );
        assert_eq!(*lab.labels.get(5, 2), 2);
        assert_eq!(*lab.labels.get(2, 2), 0);
    }

    #[test]
    fn diagonal_touch_merges_only_with_eight_connectivity() {
        let img = binary(3, 3, &["#..", ".#.", "..#"]);
        let four = FloodFillLabeler::new(Connectivity::Four)
            .label(&img.view(), 0)
            .unwrap();
        let eight = FloodFillLabeler::new(Connectivity::Eight)
            .label(&img.view(), 0)
            .unwrap();

        assert_eq!(four.regions.len(), 3);
        assert_eq!(eight.regions.len(), 1);
        assert_eq!(eight.regions[0].area, 3);
        assert_eq!(eight.labels.as_slice(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn region_areas_sum_to_foreground_count() {
        let img = binary(5, 5, &["#.#.#", ".....", "#####", "#...#", "##.##"]);
        let lab = FloodFillLabeler::default().label(&img.view(), 0).unwrap();
        let fg = img.as_slice().iter().filter(|&&v| v == 0).count();
        assert_eq!(lab.regions.iter().map(|r| r.area).sum::<usize>(), fg);
        assert_eq!(lab.regions.len(), 4);
    }

    #[test]
    fn background_only_yields_no_regions() {
        let img = binary(3, 2, &["...", "..."]);
        let lab = FloodFillLabeler::default().label(&img.view(), 0).unwrap();
        assert!(lab.regions.is_empty());
        assert!(lab.labels.as_slice().iter().all(|&l| l == 0));
    }

    #[test]
    fn connectivity_reads_lowercase_names() {
        let l: FloodFillLabeler = serde_json::from_str(r#"{"connectivity": "eight"}"#).unwrap();
        assert_eq!(l.connectivity, Connectivity::Eight);
    }
}
