//! Rectangles.

use cgmath::{Point2, Vector2, Zero};
use core::ops;

/// An integer rectangle in window coordinates (origin top-left, y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<i32>,

    /// Rectangle size.
    pub size: Vector2<i32>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Rect {
        Rect {
            origin: Point2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0, 0),
            size: Vector2::zero(),
        }
    }

    /// Returns true if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    /// The exclusive right edge, saturating at `i32::MAX`.
    pub fn max_x(&self) -> i32 {
        self.origin.x.saturating_add(self.size.x)
    }

    /// The exclusive bottom edge, saturating at `i32::MAX`.
    pub fn max_y(&self) -> i32 {
        self.origin.y.saturating_add(self.size.y)
    }

    /// Edges widened to `i64`, where they cannot overflow.
    fn edges(&self) -> (i64, i64, i64, i64) {
        let x = i64::from(self.origin.x);
        let y = i64::from(self.origin.y);
        (x, y, x + i64::from(self.size.x), y + i64::from(self.size.y))
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// Edges are half-open, so empty rectangles never contain anything.
    pub fn contains(&self, point: Point2<i32>) -> bool {
        let (min_x, min_y, max_x, max_y) = self.edges();
        let (x, y) = (i64::from(point.x), i64::from(point.y));
        x >= min_x && y >= min_y && x < max_x && y < max_y
    }

    /// Returns true if the two rectangles intersect.
    pub fn intersects(&self, rect: Rect) -> bool {
        let (a_min_x, a_min_y, a_max_x, a_max_y) = self.edges();
        let (b_min_x, b_min_y, b_max_x, b_max_y) = rect.edges();
        a_min_x < b_max_x && a_min_y < b_max_y && b_min_x < a_max_x && b_min_y < a_max_y
    }

    /// Returns the intersection rectangle.
    ///
    /// Sizes that do not fit in an `i32` are clamped.
    pub fn intersect(&self, rect: Rect) -> Option<Rect> {
        if !self.intersects(rect) {
            return None;
        }

        let (a_min_x, a_min_y, a_max_x, a_max_y) = self.edges();
        let (b_min_x, b_min_y, b_max_x, b_max_y) = rect.edges();
        let min_x = a_min_x.max(b_min_x);
        let min_y = a_min_y.max(b_min_y);
        let width = a_max_x.min(b_max_x) - min_x;
        let height = a_max_y.min(b_max_y) - min_y;

        let clamp = |v: i64| v.min(i64::from(i32::MAX)) as i32;
        Some(Rect::new(min_x as i32, min_y as i32, clamp(width), clamp(height)))
    }

    /// Returns a new rectangle inset by the specified amount.
    pub fn inset(&self, horiz: i32, vert: i32) -> Rect {
        Rect::new(
            self.origin.x.saturating_add(horiz),
            self.origin.y.saturating_add(vert),
            self.size.x.saturating_sub(horiz.saturating_mul(2)),
            self.size.y.saturating_sub(vert.saturating_mul(2)),
        )
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point2<i32>) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }

    /// Returns a new rectangle with the given size.
    pub fn with_size(&self, size: Vector2<i32>) -> Rect {
        Rect {
            origin: self.origin,
            size,
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::zero()
    }
}

impl ops::Add<Vector2<i32>> for Rect {
    type Output = Rect;
    fn add(self, offset: Vector2<i32>) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}
