//! Adapters between `image` buffers and the blobmark raster types.

use blobmark_binarize::{from_luminance_into, to_luminance};
use blobmark_core::{RasterError, Rect, RgbaView, RgbaViewMut, RGBA_CHANNELS};
use blobmark_region::{colorize_labels, Labeler};

use crate::{LocateError, MarkerLocation, MarkerLocator};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Borrow an `image::RgbaImage` as an [`RgbaView`].
pub fn rgba_view(img: &::image::RgbaImage) -> Result<RgbaView<'_>, RasterError> {
    let rect = Rect::new(img.width() as usize, img.height() as usize)?;
    RgbaView::new(rect, img.as_raw())
}

/// Copy an interleaved RGBA slice into an owned `image::RgbaImage`.
pub fn rgba_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::RgbaImage, RasterError> {
    let rect = Rect::new(width as usize, height as usize)?;
    let expected = rect.len() * RGBA_CHANNELS;
    if pixels.len() != expected {
        return Err(RasterError::BufferLength {
            expected,
            got: pixels.len(),
        });
    }
    ::image::RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or(RasterError::InvalidRect {
        width: rect.width,
        height: rect.height,
    })
}

/// Run `locator` on an `image::RgbaImage`.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(locator, img),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn locate_image<L: Labeler>(
    locator: &MarkerLocator<L>,
    img: &::image::RgbaImage,
) -> Result<MarkerLocation, LocateError> {
    locator.locate(&rgba_view(img)?)
}

/// Colourise the isolated label raster of a location into a new image.
pub fn render_image(location: &MarkerLocation) -> Result<::image::RgbaImage, RasterError> {
    let rect = location.rect();
    let mut out = blank_image(rect)?;
    let mut dst = RgbaViewMut::new(rect, &mut out)?;
    colorize_labels(&location.isolated.view(), &mut dst)?;
    Ok(out)
}

/// Greyscale an RGBA image through the luminance stage, keeping its alpha.
pub fn grey_image(img: &::image::RgbaImage) -> Result<::image::RgbaImage, RasterError> {
    let luma = to_luminance(&rgba_view(img)?)?;
    let mut out = img.clone();
    let mut dst = RgbaViewMut::new(luma.rect(), &mut out)?;
    from_luminance_into(&luma.view(), &mut dst)?;
    Ok(out)
}

fn blank_image(rect: Rect) -> Result<::image::RgbaImage, RasterError> {
    let invalid = RasterError::InvalidRect {
        width: rect.width,
        height: rect.height,
    };
    let w = u32::try_from(rect.width).map_err(|_| invalid.clone())?;
    let h = u32::try_from(rect.height).map_err(|_| invalid)?;
    Ok(::image::RgbaImage::new(w, h))
}
