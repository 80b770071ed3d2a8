//! Pixel-space rectangles.

use std::{cmp, fmt};

use crate::resolution::Resolution;

/// An axis-aligned rectangle in pixel coordinates.
///
/// Both corners are *inclusive*, so a rectangle spanning a single pixel has `x_min == x_max` and a
/// width of 1. Coordinates may be negative or lie past the frame edge, since landmark networks
/// can place points outside of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

impl Rect {
    /// Creates a rectangle from two opposing corner points.
    ///
    /// # Panics
    ///
    /// Panics if `top_left` lies below or to the right of `bottom_right`.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        Self::span_inner(top_left.0, top_left.1, bottom_right.0, bottom_right.1)
    }

    /// Returns the rectangle covering every pixel of a frame with the given [`Resolution`].
    ///
    /// Returns [`None`] if `res` has no pixels.
    pub fn from_resolution(res: Resolution) -> Option<Self> {
        if res.is_empty() {
            return None;
        }

        Some(Self::span_inner(
            0,
            0,
            res.width() as i32 - 1,
            res.height() as i32 - 1,
        ))
    }

    /// Computes the (axis-aligned) bounding rectangle that encompasses `points`.
    ///
    /// Returns [`None`] if `points` is an empty iterator.
    pub fn bounding<I: IntoIterator<Item = (i32, i32)>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();

        let (x, y) = iter.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x, x, y, y);

        for (x, y) in iter {
            x_min = cmp::min(x_min, x);
            x_max = cmp::max(x_max, x);
            y_min = cmp::min(y_min, y);
            y_max = cmp::max(y_max, y);
        }

        Some(Self::span_inner(x_min, y_min, x_max, y_max))
    }

    fn span_inner(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        assert!(x_min <= x_max, "x_min={}, x_max={}", x_min, x_max);
        assert!(y_min <= y_max, "y_min={}, y_max={}", y_min, y_max);
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    #[inline]
    pub fn x_min(&self) -> i32 {
        self.x_min
    }

    #[inline]
    pub fn y_min(&self) -> i32 {
        self.y_min
    }

    #[inline]
    pub fn x_max(&self) -> i32 {
        self.x_max
    }

    #[inline]
    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    #[inline]
    pub fn top_left(&self) -> (i32, i32) {
        (self.x_min, self.y_min)
    }

    #[inline]
    pub fn bottom_right(&self) -> (i32, i32) {
        (self.x_max, self.y_max)
    }

    /// Returns the number of pixel columns covered by this rectangle.
    #[inline]
    pub fn width(&self) -> u32 {
        self.x_max.abs_diff(self.x_min) + 1
    }

    /// Returns the number of pixel rows covered by this rectangle.
    #[inline]
    pub fn height(&self) -> u32 {
        self.y_max.abs_diff(self.y_min) + 1
    }

    /// Returns the `(x_min, y_min, x_max, y_max)` tuple describing this rectangle.
    #[inline]
    pub fn to_tuple(&self) -> (i32, i32, i32, i32) {
        (self.x_min, self.y_min, self.x_max, self.y_max)
    }

    /// Computes the intersection of `self` and `other`.
    ///
    /// Returns [`None`] when the rectangles do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = cmp::max(self.x_min, other.x_min);
        let y_min = cmp::max(self.y_min, other.y_min);
        let x_max = cmp::min(self.x_max, other.x_max);
        let y_max = cmp::min(self.y_max, other.y_max);

        if x_min > x_max || y_min > y_max {
            None
        } else {
            Some(Self::span_inner(x_min, y_min, x_max, y_max))
        }
    }

    /// Clips this rectangle so that it only covers pixels inside a frame of resolution `res`.
    ///
    /// Returns [`None`] if nothing of `self` is visible.
    pub fn clip_to(&self, res: Resolution) -> Option<Rect> {
        self.intersection(&Rect::from_resolution(res)?)
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({},{})..=({},{})",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding() {
        assert_eq!(
            Rect::bounding([(0, 0), (1, 1), (-1, -1)]).unwrap(),
            Rect::from_corners((-1, -1), (1, 1)),
        );
        assert_eq!(
            Rect::bounding([(1, 1), (-1, -1)]).unwrap(),
            Rect::from_corners((-1, -1), (1, 1)),
        );
        assert_eq!(
            Rect::bounding([(5, 2)]).unwrap(),
            Rect::from_corners((5, 2), (5, 2)),
        );
        assert_eq!(Rect::bounding(std::iter::empty::<(i32, i32)>()), None);
    }

    #[test]
    fn test_size() {
        let single = Rect::from_corners((3, 3), (3, 3));
        assert_eq!(single.width(), 1);
        assert_eq!(single.height(), 1);

        let rect = Rect::from_corners((10, 20), (19, 24));
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.height(), 5);
        assert_eq!(rect.to_tuple(), (10, 20, 19, 24));
    }

    #[test]
    fn test_size_saturated() {
        let rect = Rect::from_corners((i32::MIN, 0), (i32::MAX - 1, 0));
        assert_eq!(rect.width(), u32::MAX);
        assert_eq!(rect.height(), 1);
    }

    #[test]
    #[should_panic]
    fn test_inverted_corners() {
        Rect::from_corners((5, 5), (4, 6));
    }

    #[test]
    fn test_intersection() {
        let a = Rect::from_corners((0, 0), (10, 10));
        let b = Rect::from_corners((5, 5), (5, 5));
        assert_eq!(a.intersection(&b), Some(b));
        assert_eq!(b.intersection(&a), Some(b));
        assert_eq!(
            b.intersection(&Rect::from_corners((6, 0), (10, 10))),
            None
        );
    }

    #[test]
    fn test_clip_to() {
        let res = Resolution::new(640, 480);
        assert_eq!(
            Rect::from_corners((-20, 100), (700, 480)).clip_to(res),
            Some(Rect::from_corners((0, 100), (639, 479)))
        );
        assert_eq!(
            Rect::from_corners((10, 10), (20, 20)).clip_to(res),
            Some(Rect::from_corners((10, 10), (20, 20)))
        );
        assert_eq!(Rect::from_corners((640, 0), (700, 10)).clip_to(res), None);
        assert_eq!(
            Rect::from_corners((0, 0), (1, 1)).clip_to(Resolution::new(0, 0)),
            None
        );
    }

    #[test]
    fn test_contains_point() {
        let rect = Rect::from_corners((0, 0), (2, 2));
        assert!(rect.contains_point(0, 0));
        assert!(rect.contains_point(2, 2));
        assert!(!rect.contains_point(3, 2));
        assert!(!rect.contains_point(-1, 0));
    }
}
