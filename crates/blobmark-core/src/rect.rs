use serde::{Deserialize, Serialize};

use crate::RasterError;

/// Dimensions shared by every raster of one pipeline run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// Build a rect, rejecting zero-sized dimensions.
    pub fn new(width: usize, height: usize) -> Result<Self, RasterError> {
        let rect = Self { width, height };
        rect.validate()?;
        Ok(rect)
    }

    /// Check that both dimensions are positive and the sample count fits `usize`.
    ///
    /// `Rect` has public fields so deserialized or hand-built values are
    /// re-checked by every stage that consumes them.
    pub fn validate(&self) -> Result<(), RasterError> {
        if self.width == 0 || self.height == 0 {
            return Err(self.invalid());
        }
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(crate::RGBA_CHANNELS))
            .ok_or(self.invalid())?;
        Ok(())
    }

    /// Number of single-channel samples (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major offset of `(x, y)` in a single-channel raster.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// The inclusive bound covering the whole raster.
    pub fn full_bound(&self) -> Bound {
        Bound {
            x1: 0,
            y1: 0,
            x2: self.width.saturating_sub(1),
            y2: self.height.saturating_sub(1),
        }
    }

    /// Fail with [`RasterError::TooSmall`] unless both sides are at least `min`.
    pub fn require_min(&self, min: usize) -> Result<(), RasterError> {
        if self.width < min || self.height < min {
            return Err(RasterError::TooSmall {
                width: self.width,
                height: self.height,
                min,
            });
        }
        Ok(())
    }

    /// Fail with [`RasterError::BoundOutOfRange`] unless `bound` is ordered and inside.
    pub fn check_bound(&self, bound: &Bound) -> Result<(), RasterError> {
        let ordered = bound.x1 <= bound.x2 && bound.y1 <= bound.y2;
        if !ordered || !self.contains(bound.x2, bound.y2) {
            return Err(RasterError::BoundOutOfRange {
                x1: bound.x1,
                y1: bound.y1,
                x2: bound.x2,
                y2: bound.y2,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    fn invalid(&self) -> RasterError {
        RasterError::InvalidRect {
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis-aligned box with inclusive corners `(x1, y1)` and `(x2, y2)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Bound {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Bound {
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }

    pub fn width(&self) -> usize {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> usize {
        self.y2 - self.y1 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            Rect::new(0, 4),
            Err(RasterError::InvalidRect {
                width: 0,
                height: 4
            })
        );
        assert!(Rect::new(3, 0).is_err());
        assert!(Rect::new(1, 1).is_ok());
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(Rect::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn offset_is_row_major() {
        let rect = Rect::new(7, 3).unwrap();
        assert_eq!(rect.offset(0, 0), 0);
        assert_eq!(rect.offset(6, 0), 6);
        assert_eq!(rect.offset(0, 1), 7);
        assert_eq!(rect.offset(2, 2), 16);
        assert_eq!(rect.len(), 21);
    }

    #[test]
    fn min_size_check_reports_dimensions() {
        let rect = Rect::new(4, 10).unwrap();
        assert_eq!(
            rect.require_min(5),
            Err(RasterError::TooSmall {
                width: 4,
                height: 10,
                min: 5
            })
        );
        assert!(Rect::new(5, 5).unwrap().require_min(5).is_ok());
    }

    #[test]
    fn bound_check_requires_ordered_box_inside_raster() {
        let rect = Rect::new(10, 8).unwrap();
        let inside = Bound {
            x1: 2,
            y1: 1,
            x2: 9,
            y2: 7,
        };
        assert!(rect.check_bound(&inside).is_ok());

        let outside = Bound { x2: 10, ..inside };
        assert!(rect.check_bound(&outside).is_err());

        let flipped = Bound {
            x1: 5,
            y1: 1,
            x2: 4,
            y2: 7,
        };
        assert!(rect.check_bound(&flipped).is_err());
    }

    #[test]
    fn bound_contains_its_edges() {
        let b = Bound {
            x1: 2,
            y1: 3,
            x2: 4,
            y2: 5,
        };
        assert!(b.contains(2, 3));
        assert!(b.contains(4, 5));
        assert!(!b.contains(1, 3));
        assert!(!b.contains(4, 6));
        assert_eq!(b.width(), 3);
        assert_eq!(b.height(), 3);
    }
}
