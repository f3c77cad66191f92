use blobmark_core::{RasterError, RasterView, RgbaViewMut, RGBA_CHANNELS};

/// Display colour of a label. Background (0) is black; other labels get a
/// stable, reasonably bright colour derived from the id.
pub fn label_color(label: u32) -> [u8; 3] {
    if label == 0 {
        return [0, 0, 0];
    }
    let h = label.wrapping_mul(0x9E37_79B1).rotate_left(7);
    let [a, b, c, _] = h.to_le_bytes();
    [a | 0x40, b | 0x40, c | 0x40]
}

/// Paint a label raster into an RGBA display buffer, one colour per label.
///
/// Alpha is set to opaque. The destination must match the label raster's rect.
pub fn colorize_labels(
    labels: &RasterView<'_, u32>,
    dst: &mut RgbaViewMut<'_>,
) -> Result<(), RasterError> {
    labels.validate()?;
    dst.validate()?;
    if labels.rect != dst.rect {
        return Err(RasterError::BufferLength {
            expected: labels.rect.len() * RGBA_CHANNELS,
            got: dst.data.len(),
        });
    }

    for (px, &label) in dst.data.chunks_exact_mut(RGBA_CHANNELS).zip(labels.data) {
        let [r, g, b] = label_color(label);
        px.copy_from_slice(&[r, g, b, u8::MAX]);
    }
    Ok(())
}
