use crate::{RasterError, Rect};

/// Samples per pixel in an interleaved R,G,B,A buffer.
pub const RGBA_CHANNELS: usize = 4;

/// Owned single-channel raster, row-major, `data.len() == rect.len()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    rect: Rect,
    data: Vec<T>,
}

impl<T> Raster<T> {
    /// Wrap an existing buffer, checking its length against `rect`.
    pub fn from_vec(rect: Rect, data: Vec<T>) -> Result<Self, RasterError> {
        rect.validate()?;
        check_len(rect.len(), data.len())?;
        Ok(Self { rect, data })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> RasterView<'_, T> {
        RasterView {
            rect: self.rect,
            data: &self.data,
        }
    }

    /// Sample at `(x, y)`. Panics when out of range, like slice indexing.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.rect.offset(x, y)]
    }
}

impl<T: Clone> Raster<T> {
    /// A raster with every sample set to `value`.
    pub fn filled(rect: Rect, value: T) -> Result<Self, RasterError> {
        rect.validate()?;
        Ok(Self {
            rect,
            data: vec![value; rect.len()],
        })
    }
}

/// Borrowed single-channel raster.
#[derive(Clone, Copy, Debug)]
pub struct RasterView<'a, T> {
    pub rect: Rect,
    pub data: &'a [T],
}

impl<'a, T> RasterView<'a, T> {
    pub fn new(rect: Rect, data: &'a [T]) -> Result<Self, RasterError> {
        let view = Self { rect, data };
        view.validate()?;
        Ok(view)
    }

    /// Re-check shape and length; fields are public so views may be built directly.
    pub fn validate(&self) -> Result<(), RasterError> {
        self.rect.validate()?;
        check_len(self.rect.len(), self.data.len())
    }

    /// One full row of samples.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [T] {
        let start = y * self.rect.width;
        &self.data[start..start + self.rect.width]
    }
}

impl<T: Copy> RasterView<'_, T> {
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> T {
        self.data[self.rect.offset(x, y)]
    }

    pub fn to_raster(&self) -> Raster<T> {
        Raster {
            rect: self.rect,
            data: self.data.to_vec(),
        }
    }
}

/// Borrowed interleaved R,G,B,A byte raster.
#[derive(Clone, Copy, Debug)]
pub struct RgbaView<'a> {
    pub rect: Rect,
    pub data: &'a [u8],
}

impl<'a> RgbaView<'a> {
    pub fn new(rect: Rect, data: &'a [u8]) -> Result<Self, RasterError> {
        let view = Self { rect, data };
        view.validate()?;
        Ok(view)
    }

    pub fn validate(&self) -> Result<(), RasterError> {
        self.rect.validate()?;
        check_len(self.rect.len() * RGBA_CHANNELS, self.data.len())
    }

    /// `[r, g, b, a]` of pixel `i` in row-major order.
    #[inline]
    pub fn pixel(&self, i: usize) -> [u8; 4] {
        let o = i * RGBA_CHANNELS;
        [
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ]
    }
}

/// Mutable interleaved R,G,B,A byte raster (the host display buffer).
#[derive(Debug)]
pub struct RgbaViewMut<'a> {
    pub rect: Rect,
    pub data: &'a mut [u8],
}

impl<'a> RgbaViewMut<'a> {
    pub fn new(rect: Rect, data: &'a mut [u8]) -> Result<Self, RasterError> {
        let view = Self { rect, data };
        view.validate()?;
        Ok(view)
    }

    pub fn validate(&self) -> Result<(), RasterError> {
        self.rect.validate()?;
        check_len(self.rect.len() * RGBA_CHANNELS, self.data.len())
    }

    pub fn as_view(&self) -> RgbaView<'_> {
        RgbaView {
            rect: self.rect,
            data: &*self.data,
        }
    }
}

fn check_len(expected: usize, got: usize) -> Result<(), RasterError> {
    if expected != got {
        return Err(RasterError::BufferLength { expected, got });
    }
    Ok(())
}
