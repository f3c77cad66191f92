//! End-to-end marker location: luminance -> threshold -> labels -> dominant region -> corners.

use std::time::Instant;

use blobmark_binarize::{adaptive_threshold, to_luminance, ThresholdParams};
use blobmark_core::{Raster, RasterError, RasterView, Rect, RgbaView, RgbaViewMut};
use blobmark_region::{
    colorize_labels, find_corners, mask_to_label_in_place, restrict_to_bound_in_place,
    select_dominant, Connectivity, CornerScan, CornerSet, FloodFillLabeler, Labeler, Region,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// How everything but the dominant region is removed from the label raster.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Keep exactly the pixels carrying the dominant label.
    #[default]
    LabelMask,
    /// Keep every labeled pixel inside the dominant region's bounding box.
    Bound,
}

/// Configuration of [`MarkerLocator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateParams {
    /// Local-mean threshold; `low` and `high` are the binary levels.
    pub threshold: ThresholdParams<u8>,
    /// Binary level treated as blob pixels by the labeler.
    ///
    /// With the default levels, dark print next to a lighter surround falls
    /// to `low` (0).
    pub foreground: u8,
    /// Adjacency used by the built-in labeler.
    pub connectivity: Connectivity,
    pub isolation: Isolation,
    /// Run the corner locator on the dominant region.
    pub find_corners: bool,
    pub corner_scan: CornerScan,
}

impl Default for LocateParams {
    fn default() -> Self {
        let threshold = ThresholdParams::default();
        Self {
            foreground: threshold.low,
            threshold,
            connectivity: Connectivity::Four,
            isolation: Isolation::LabelMask,
            find_corners: true,
            corner_scan: CornerScan::Inclusive,
        }
    }
}

/// Errors returned by [`MarkerLocator`].
#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("no region found in the binarized image")]
    NoRegion,
    #[error("region {label} has no pixels inside its corner scan window")]
    NoCornerPixels { label: u32 },
}

impl LocateError {
    /// `true` for "marker not detected" outcomes, `false` for bad input.
    pub fn is_not_detected(&self) -> bool {
        matches!(self, Self::NoRegion | Self::NoCornerPixels { .. })
    }
}

/// A located marker.
#[derive(Clone, Debug)]
pub struct MarkerLocation {
    /// The dominant region as reported by the labeler.
    pub region: Region,
    /// Number of regions the labeler found.
    pub region_count: usize,
    /// Label raster with everything but the dominant region cleared.
    pub isolated: Raster<u32>,
    /// Present when corner location was requested.
    pub corners: Option<CornerSet>,
}

impl MarkerLocation {
    pub fn rect(&self) -> Rect {
        self.isolated.rect()
    }
}

/// Marker locator: runs the pipeline stages with one set of parameters.
pub struct MarkerLocator<L: Labeler = FloodFillLabeler> {
    params: LocateParams,
    labeler: L,
}

impl MarkerLocator<FloodFillLabeler> {
    /// Locator using the built-in flood fill labeler.
    pub fn new(params: LocateParams) -> Self {
        let labeler = FloodFillLabeler::new(params.connectivity);
        Self { params, labeler }
    }
}

impl<L: Labeler> MarkerLocator<L> {
    /// Locator delegating connected-component labeling to `labeler`.
    pub fn with_labeler(params: LocateParams, labeler: L) -> Self {
        Self { params, labeler }
    }

    pub fn params(&self) -> &LocateParams {
        &self.params
    }

    /// Locate the marker in an interleaved RGBA image.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.rect.width, height = image.rect.height)
        )
    )]
    pub fn locate(&self, image: &RgbaView<'_>) -> Result<MarkerLocation, LocateError> {
        let t0 = Instant::now();
        let luma = to_luminance(image)?;
        log::debug!("luminance in {:.3} ms", ms_since(t0));
        self.locate_luminance(&luma.view())
    }

    /// Locate the marker in a single-channel luminance raster.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, luma),
            fields(width = luma.rect.width, height = luma.rect.height)
        )
    )]
    pub fn locate_luminance(
        &self,
        luma: &RasterView<'_, f32>,
    ) -> Result<MarkerLocation, LocateError> {
        let t0 = Instant::now();
        let binary = adaptive_threshold(luma, &self.params.threshold)?;
        log::debug!(
            "adaptive threshold (c={}) in {:.3} ms",
            self.params.threshold.c,
            ms_since(t0)
        );

        let t1 = Instant::now();
        let labeling = self.labeler.label(&binary.view(), self.params.foreground)?;
        let region_count = labeling.regions.len();
        log::debug!("{} regions labeled in {:.3} ms", region_count, ms_since(t1));

        let Some(&region) = select_dominant(&labeling.regions) else {
            log::warn!("no region found");
            return Err(LocateError::NoRegion);
        };
        log::debug!(
            "dominant region {} area={} box=({},{})-({},{})",
            region.label,
            region.area,
            region.x1,
            region.y1,
            region.x2,
            region.y2
        );

        let mut isolated = labeling.labels;
        match self.params.isolation {
            Isolation::LabelMask => mask_to_label_in_place(&mut isolated, region.label),
            Isolation::Bound => restrict_to_bound_in_place(&mut isolated, &region.bound())?,
        }

        let corners = if self.params.find_corners {
            let set = find_corners(&isolated.view(), &region, self.params.corner_scan)?;
            if !set.is_complete() {
                log::warn!("region {} yielded no corner pixels", region.label);
                return Err(LocateError::NoCornerPixels {
                    label: region.label,
                });
            }
            Some(set)
        } else {
            None
        };

        log::info!(
            "marker located: region {} ({} px) among {} regions in {:.3} ms",
            region.label,
            region.area,
            region_count,
            ms_since(t0)
        );
        Ok(MarkerLocation {
            region,
            region_count,
            isolated,
            corners,
        })
    }

    /// Recompose a location into an RGBA display buffer, one colour per label.
    pub fn render(
        &self,
        location: &MarkerLocation,
        dst: &mut RgbaViewMut<'_>,
    ) -> Result<(), LocateError> {
        colorize_labels(&location.isolated.view(), dst)?;
        Ok(())
    }
}

fn ms_since(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1e3
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobmark_region::Labeling;
    use nalgebra::Point2;

    /// Returns a fixed labeling regardless of input, to exercise the seam.
    struct Fixed(Labeling);

    impl Labeler for Fixed {
        fn label<T: Copy + PartialEq>(
            &self,
            _binary: &RasterView<'_, T>,
            _foreground: T,
        ) -> Result<Labeling, RasterError> {
            Ok(self.0.clone())
        }
    }

    fn flat(w: usize, h: usize, v: f32) -> Raster<f32> {
        Raster::filled(Rect::new(w, h).unwrap(), v).unwrap()
    }

    #[test]
    fn default_params_label_dark_print() {
        let p = LocateParams::default();
        assert_eq!(p.threshold.c, 10.0);
        assert_eq!((p.threshold.low, p.threshold.high), (0, 255));
        assert_eq!(p.foreground, 0);
        assert_eq!(p.isolation, Isolation::LabelMask);
    }

    #[test]
    fn partial_json_config_keeps_defaults() {
        let json = r#"{"isolation": "bound", "threshold": {"c": 4, "low": 0, "high": 255}}"#;
        let p: LocateParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.isolation, Isolation::Bound);
        assert_eq!(p.threshold.c, 4.0);
        assert!(p.find_corners);
        assert_eq!(p.corner_scan, CornerScan::Inclusive);
    }

    #[test]
    fn flat_image_has_no_region() {
        let locator = MarkerLocator::new(LocateParams::default());
        let err = locator.locate_luminance(&flat(8, 8, 120.0).view()).unwrap_err();
        assert!(matches!(err, LocateError::NoRegion));
        assert!(err.is_not_detected());
    }

    #[test]
    fn tiny_image_is_a_precondition_error() {
        let locator = MarkerLocator::new(LocateParams::default());
        let err = locator.locate_luminance(&flat(4, 4, 0.0).view()).unwrap_err();
        assert!(matches!(err, LocateError::Raster(RasterError::TooSmall { .. })));
        assert!(!err.is_not_detected());
    }

    #[test]
    fn custom_labeler_drives_region_selection() {
        let rect = Rect::new(6, 6).unwrap();
        let mut labels = vec![0u32; 36];
        labels[7] = 1;
        for i in [14, 15, 20, 21] {
            labels[i] = 2;
        }
        let regions = vec![
            Region {
                label: 1,
                x1: 1,
                y1: 1,
                x2: 1,
                y2: 1,
                area: 1,
            },
            Region {
                label: 2,
                x1: 2,
                y1: 2,
                x2: 3,
                y2: 3,
                area: 4,
            },
        ];
        let fixed = Fixed(Labeling {
            labels: Raster::from_vec(rect, labels).unwrap(),
            regions,
        });
        let locator = MarkerLocator::with_labeler(LocateParams::default(), fixed);

        let found = locator.locate_luminance(&flat(6, 6, 9.0).view()).unwrap();
        assert_eq!(found.region.label, 2);
        assert_eq!(found.region_count, 2);
        assert_eq!(found.isolated.as_slice().iter().filter(|&&l| l != 0).count(), 4);
        assert_eq!(*found.isolated.get(1, 1), 0);
        let corners = found.corners.unwrap().positions().unwrap();
        assert_eq!(corners[0], Point2::new(2, 2));
        assert_eq!(corners[3], Point2::new(3, 3));
    }

    #[test]
    fn half_open_scan_on_single_pixel_region_is_not_detected() {
        let rect = Rect::new(5, 5).unwrap();
        let mut labels = vec![0u32; 25];
        labels[12] = 1;
        let fixed = Fixed(Labeling {
            labels: Raster::from_vec(rect, labels).unwrap(),
            regions: vec![Region {
                label: 1,
                x1: 2,
                y1: 2,
                x2: 2,
                y2: 2,
                area: 1,
            }],
        });
        let params = LocateParams {
            corner_scan: CornerScan::HalfOpen,
            ..LocateParams::default()
        };
        let locator = MarkerLocator::with_labeler(params, fixed);
        let err = locator.locate_luminance(&flat(5, 5, 1.0).view()).unwrap_err();
        assert!(matches!(err, LocateError::NoCornerPixels { label: 1 }));
        assert!(err.is_not_detected());
    }
}
