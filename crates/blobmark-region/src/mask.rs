//! Two interchangeable ways to isolate the dominant region.
//!
//! Label masking keeps exactly the pixels carrying one label. Bound
//! restriction keeps everything inside a box, including pixels of other
//! regions that overlap it. Background is `T::default()` (0 for integers).

use blobmark_core::{Bound, Raster, RasterError, RasterView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Copy of `src` where every sample other than `label` is background.
pub fn mask_to_label<T>(src: &RasterView<'_, T>, label: T) -> Result<Raster<T>, RasterError>
where
    T: Copy + PartialEq + Default,
{
    src.validate()?;
    let mut out = src.to_raster();
    mask_slice(out.as_mut_slice(), label);
    Ok(out)
}

/// In-place variant of [`mask_to_label`].
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn mask_to_label_in_place<T>(raster: &mut Raster<T>, label: T)
where
    T: Copy + PartialEq + Default,
{
    mask_slice(raster.as_mut_slice(), label);
}

fn mask_slice<T: Copy + PartialEq + Default>(data: &mut [T], label: T) {
    for v in data.iter_mut().filter(|v| **v != label) {
        *v = T::default();
    }
}

/// Copy of `src` where every pixel strictly outside `bound` is background.
///
/// `bound` is inclusive: pixels on its edges are kept.
pub fn restrict_to_bound<T>(
    src: &RasterView<'_, T>,
    bound: &Bound,
) -> Result<Raster<T>, RasterError>
where
    T: Copy + Default,
{
    src.validate()?;
    let mut out = src.to_raster();
    restrict_to_bound_in_place(&mut out, bound)?;
    Ok(out)
}

/// In-place variant of [`restrict_to_bound`]. The bound is checked before any write.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn restrict_to_bound_in_place<T>(
    raster: &mut Raster<T>,
    bound: &Bound,
) -> Result<(), RasterError>
where
    T: Copy + Default,
{
    let rect = raster.rect();
    rect.check_bound(bound)?;

    let rows = raster.as_mut_slice().chunks_exact_mut(rect.width);
    for (y, row) in rows.enumerate() {
        if y < bound.y1 || y > bound.y2 {
            row.fill(T::default());
            continue;
        }
        row[..bound.x1].fill(T::default());
        row[bound.x2 + 1..].fill(T::default());
    }
    Ok(())
}
