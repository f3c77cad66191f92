use blobmark_core::{
    Raster, RasterError, RasterView, RgbaView, RgbaViewMut, Rect, RGBA_CHANNELS,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// R, G, B weights of the luminance sum. Alpha does not contribute.
pub const LUMA_WEIGHTS: [f32; 3] = [0.3, 0.59, 0.11];

/// Luminance of one `[r, g, b, a]` pixel.
#[inline]
pub fn luminance(px: [u8; 4]) -> f32 {
    px[0] as f32 * LUMA_WEIGHTS[0] + px[1] as f32 * LUMA_WEIGHTS[1] + px[2] as f32 * LUMA_WEIGHTS[2]
}

/// Reduce an RGBA raster to a freshly allocated luminance raster.
pub fn to_luminance(src: &RgbaView<'_>) -> Result<Raster<f32>, RasterError> {
    let mut out = Raster::filled(src.rect, 0.0f32)?;
    to_luminance_into(src, out.as_mut_slice())?;
    Ok(out)
}

/// Reduce an RGBA raster into `dst`.
///
/// `dst` must hold at least `width * height` samples; only that prefix is written.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(src, dst),
        fields(width = src.rect.width, height = src.rect.height)
    )
)]
pub fn to_luminance_into(src: &RgbaView<'_>, dst: &mut [f32]) -> Result<(), RasterError> {
    src.validate()?;
    let dst = prefix_mut(dst, src.rect.len())?;

    #[cfg(feature = "rayon")]
    dst.par_iter_mut()
        .zip(src.data.par_chunks_exact(RGBA_CHANNELS))
        .for_each(|(d, px)| *d = luminance([px[0], px[1], px[2], px[3]]));

    #[cfg(not(feature = "rayon"))]
    for (d, px) in dst.iter_mut().zip(src.data.chunks_exact(RGBA_CHANNELS)) {
        *d = luminance([px[0], px[1], px[2], px[3]]);
    }

    Ok(())
}

/// Expand a single-channel raster into a new opaque RGBA buffer.
pub fn from_luminance<T>(src: &RasterView<'_, T>) -> Result<Vec<u8>, RasterError>
where
    T: Copy + Into<f64> + Sync,
{
    src.validate()?;
    let mut out = vec![u8::MAX; src.rect.len() * RGBA_CHANNELS];
    let mut dst = RgbaViewMut::new(src.rect, &mut out)?;
    from_luminance_into(src, &mut dst)?;
    Ok(out)
}

/// Write `R = G = B = value` for every pixel of `dst`, leaving alpha as found.
///
/// Values are rounded to the nearest integer and clamped to `0..=255`, the
/// behaviour of an 8-bit clamped display buffer.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(src, dst),
        fields(width = src.rect.width, height = src.rect.height)
    )
)]
pub fn from_luminance_into<T>(
    src: &RasterView<'_, T>,
    dst: &mut RgbaViewMut<'_>,
) -> Result<(), RasterError>
where
    T: Copy + Into<f64> + Sync,
{
    src.validate()?;
    dst.validate()?;
    check_same_rect(src.rect, dst.rect)?;

    #[cfg(feature = "rayon")]
    dst.data
        .par_chunks_exact_mut(RGBA_CHANNELS)
        .zip(src.data.par_iter())
        .for_each(|(px, &v)| write_grey(px, v));

    #[cfg(not(feature = "rayon"))]
    for (px, &v) in dst.data.chunks_exact_mut(RGBA_CHANNELS).zip(src.data) {
        write_grey(px, v);
    }

    Ok(())
}

#[inline]
fn write_grey<T: Into<f64>>(px: &mut [u8], v: T) {
    let g = v.into().round().clamp(0.0, 255.0) as u8;
    px[0] = g;
    px[1] = g;
    px[2] = g;
}

fn check_same_rect(src: Rect, dst: Rect) -> Result<(), RasterError> {
    if src != dst {
        return Err(RasterError::BufferLength {
            expected: src.len() * RGBA_CHANNELS,
            got: dst.len() * RGBA_CHANNELS,
        });
    }
    Ok(())
}

pub(crate) fn prefix_mut<T>(dst: &mut [T], len: usize) -> Result<&mut [T], RasterError> {
    let got = dst.len();
    dst.get_mut(..len)
        .ok_or(RasterError::BufferLength { expected: len, got })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rgba(rect: Rect, f: impl Fn(usize) -> [u8; 4]) -> Vec<u8> {
        (0..rect.len()).flat_map(f).collect()
    }

    #[test]
    fn grey_input_keeps_its_value() {
        let rect = Rect::new(16, 16).unwrap();
        let data = rgba(rect, |i| {
            let v = i as u8;
            [v, v, v, 255]
        });
        let src = RgbaView::new(rect, &data).unwrap();
        let luma = to_luminance(&src).unwrap();

        for (i, &l) in luma.as_slice().iter().enumerate() {
            assert_abs_diff_eq!(l, i as f32, epsilon = 1e-3);
        }
    }

    #[test]
    fn weights_apply_per_channel_and_ignore_alpha() {
        let rect = Rect::new(4, 1).unwrap();
        let data = [
            100, 0, 0, 0, //
            0, 100, 0, 17, //
            0, 0, 100, 255, //
            10, 20, 30, 40,
        ];
        let luma = to_luminance(&RgbaView::new(rect, &data).unwrap()).unwrap();
        let expected = [30.0, 59.0, 11.0, 3.0 + 11.8 + 3.3];
        for (got, want) in luma.as_slice().iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-4);
        }
    }

    #[test]
    fn round_trip_preserves_luminance_not_colour() {
        let rect = Rect::new(3, 2).unwrap();
        let data = rgba(rect, |i| [(i * 40) as u8, 200 - (i * 30) as u8, 7, 99]);
        let src = RgbaView::new(rect, &data).unwrap();
        let luma = to_luminance(&src).unwrap();

        let mut back = data.clone();
        let mut dst = RgbaViewMut::new(rect, &mut back).unwrap();
        from_luminance_into(&luma.view(), &mut dst).unwrap();

        for (i, px) in back.chunks_exact(4).enumerate() {
            let want = luma.as_slice()[i].round() as u8;
            assert_eq!(&px[..3], &[want, want, want]);
            assert_eq!(px[3], 99, "alpha must be left as found");
        }
    }

    #[test]
    fn from_luminance_clamps_out_of_range_values() {
        let rect = Rect::new(3, 1).unwrap();
        let luma = Raster::from_vec(rect, vec![-4.0f32, 127.5, 300.0]).unwrap();
        let out = from_luminance(&luma.view()).unwrap();
        assert_eq!(out, vec![0, 0, 0, 255, 128, 128, 128, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn short_destination_fails_before_writing() {
        let rect = Rect::new(2, 2).unwrap();
        let data = [9u8; 16];
        let src = RgbaView::new(rect, &data).unwrap();
        let mut dst = [7.0f32; 3];
        assert_eq!(
            to_luminance_into(&src, &mut dst),
            Err(RasterError::BufferLength {
                expected: 4,
                got: 3
            })
        );
        assert_eq!(dst, [7.0; 3]);
    }

    #[test]
    fn longer_destination_only_gets_its_prefix_written() {
        let rect = Rect::new(1, 2).unwrap();
        let data = [10u8, 10, 10, 0, 20, 20, 20, 0];
        let src = RgbaView::new(rect, &data).unwrap();
        let mut dst = [-1.0f32; 3];
        to_luminance_into(&src, &mut dst).unwrap();
        assert_abs_diff_eq!(dst[0], 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(dst[1], 20.0, epsilon = 1e-4);
        assert_eq!(dst[2], -1.0);
    }

    #[test]
    fn mismatched_display_buffer_is_rejected() {
        let luma = Raster::filled(Rect::new(2, 2).unwrap(), 1.0f32).unwrap();
        let mut buf = [0u8; 24];
        let mut dst = RgbaViewMut::new(Rect::new(3, 2).unwrap(), &mut buf).unwrap();
        assert!(from_luminance_into(&luma.view(), &mut dst).is_err());
        assert_eq!(buf, [0u8; 24]);
    }
}
