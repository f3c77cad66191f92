/// Precondition failures on raster shapes and buffers.
///
/// Every stage checks these before writing a single sample, so a returned
/// error always means the destination buffer is untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("invalid raster dimensions (width={width}, height={height})")]
    InvalidRect { width: usize, height: usize },

    #[error("invalid raster buffer length (expected {expected} samples, got {got})")]
    BufferLength { expected: usize, got: usize },

    #[error("raster {width}x{height} is smaller than the {min}x{min} minimum")]
    TooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("bound ({x1},{y1})-({x2},{y2}) does not fit a {width}x{height} raster")]
    BoundOutOfRange {
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
        width: usize,
        height: usize,
    },

    #[error("label space exhausted after {regions} regions")]
    LabelOverflow { regions: usize },
}
