//! 5x5 local-mean adaptive threshold.
//!
//! Each interior pixel is compared with the mean of the 25 samples centred on
//! it, minus a bias `c`: `value > mean - c` maps to `high`, anything else to
//! `low`. The outer two rows and columns cannot host a full window and are
//! always written as `high`.
//!
//! Window sums are accumulated in `f64`, starting from zero, visiting the
//! window rows top to bottom and each row left to right. Implementations that
//! need bit-exact agreement must use the same order.

use blobmark_core::{Raster, RasterError, RasterView};
use serde::{Deserialize, Serialize};

use crate::luminance::prefix_mut;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Side length of the averaging window.
pub const WINDOW_SIZE: usize = 5;
/// Distance from the window centre to its edge.
pub const WINDOW_RADIUS: usize = WINDOW_SIZE / 2;

const WINDOW_AREA: f64 = (WINDOW_SIZE * WINDOW_SIZE) as f64;

/// Bias and output levels of the adaptive threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams<O> {
    /// Subtracted from the local mean before comparing.
    ///
    /// Larger values classify more of a flat neighbourhood as `high` and
    /// suppress noise; smaller values keep fine detail.
    pub c: f64,
    /// Level written when the pixel is not brighter than `mean - c`.
    pub low: O,
    /// Level written when the pixel is brighter than `mean - c`, and on the border.
    pub high: O,
}

impl Default for ThresholdParams<u8> {
    fn default() -> Self {
        Self {
            c: 10.0,
            low: 0,
            high: 255,
        }
    }
}

/// Threshold `src` into a freshly allocated raster.
pub fn adaptive_threshold<T, O>(
    src: &RasterView<'_, T>,
    params: &ThresholdParams<O>,
) -> Result<Raster<O>, RasterError>
where
    T: Copy + Into<f64> + Sync,
    O: Copy + Send + Sync,
{
    src.validate()?;
    src.rect.require_min(WINDOW_SIZE)?;
    let mut out = Raster::filled(src.rect, params.high)?;
    adaptive_threshold_into(src, params, out.as_mut_slice())?;
    Ok(out)
}

/// Threshold `src` into `dst`.
///
/// `dst` must hold at least `width * height` samples; only that prefix is
/// written. Rasters narrower or shorter than the 5x5 window are rejected.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(src, params, dst),
        fields(width = src.rect.width, height = src.rect.height, c = params.c)
    )
)]
pub fn adaptive_threshold_into<T, O>(
    src: &RasterView<'_, T>,
    params: &ThresholdParams<O>,
    dst: &mut [O],
) -> Result<(), RasterError>
where
    T: Copy + Into<f64> + Sync,
    O: Copy + Send + Sync,
{
    src.validate()?;
    src.rect.require_min(WINDOW_SIZE)?;
    let width = src.rect.width;
    let dst = prefix_mut(dst, src.rect.len())?;

    #[cfg(feature = "rayon")]
    dst.par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, row)| threshold_row(src, y, params, row));

    #[cfg(not(feature = "rayon"))]
    for (y, row) in dst.chunks_exact_mut(width).enumerate() {
        threshold_row(src, y, params, row);
    }

    log::trace!(
        "adaptive threshold {}x{} c={}",
        src.rect.width,
        src.rect.height,
        params.c
    );
    Ok(())
}

fn threshold_row<T, O>(
    src: &RasterView<'_, T>,
    y: usize,
    params: &ThresholdParams<O>,
    out: &mut [O],
) where
    T: Copy + Into<f64>,
    O: Copy,
{
    let w = src.rect.width;
    let h = src.rect.height;

    if y < WINDOW_RADIUS || y + WINDOW_RADIUS >= h {
        out.fill(params.high);
        return;
    }

    out[..WINDOW_RADIUS].fill(params.high);
    out[w - WINDOW_RADIUS..].fill(params.high);

    for x in WINDOW_RADIUS..w - WINDOW_RADIUS {
        let mean = window_sum(src, x, y) / WINDOW_AREA;
        let val: f64 = src.at(x, y).into();
        out[x] = if val > mean - params.c {
            params.high
        } else {
            params.low
        };
    }
}

#[inline]
fn window_sum<T: Copy + Into<f64>>(src: &RasterView<'_, T>, x: usize, y: usize) -> f64 {
    let mut sum = 0.0f64;
    for wy in y - WINDOW_RADIUS..=y + WINDOW_RADIUS {
        for &s in &src.row(wy)[x - WINDOW_RADIUS..=x + WINDOW_RADIUS] {
            sum += s.into();
        }
    }
    sum
}
