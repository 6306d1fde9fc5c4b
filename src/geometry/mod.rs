//! Geometric primitives for layout analysis.
//!
//! This module provides the integer point/rectangle types used by the splitter
//! and the line extractor, the separator [`Segment`] handed over by the line
//! detector, and the [`IntervalSet`] used to mark rows that must not be split.
//!
//! All coordinates are pixels with a top-left origin. Rectangles are
//! half-open: a pixel `(x, y)` belongs to a rectangle when
//! `left <= x < right` and `top <= y < bottom`.

pub mod interval;
mod segment;

pub use interval::{Interval, IntervalSet};
pub use segment::{deskew_segments, estimate_deskew_angle, Segment};

use serde::{Deserialize, Serialize};

/// A 2D point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (column)
    pub x: i32,
    /// Y coordinate (row)
    pub y: i32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use layout_oxide::geometry::Point;
    ///
    /// let point = Point::new(10, 20);
    /// assert_eq!(point.x, 10);
    /// assert_eq!(point.y, 20);
    /// ```
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: i32,
    /// Y coordinate of top-left corner
    pub y: i32,
    /// Width of rectangle
    pub width: i32,
    /// Height of rectangle
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use layout_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0, 0, 100, 50);
    /// assert_eq!(rect.width, 100);
    /// assert_eq!(rect.height, 50);
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corners, `(x0, y0)` inclusive and
    /// `(x1, y1)` exclusive.
    pub fn from_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Get the right edge x-coordinate (exclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Get the bottom edge y-coordinate (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Area in pixels (0 for empty rectangles).
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// True when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True when the rectangle covers pixels and lies in the positive quadrant.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.x >= 0 && self.y >= 0
    }

    /// Grow this rectangle so that it also encloses `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layout_oxide::geometry::Rect;
    ///
    /// let mut r = Rect::new(0, 0, 50, 50);
    /// r.merge(&Rect::new(25, 25, 50, 50));
    /// assert_eq!(r, Rect::new(0, 0, 75, 75));
    /// ```
    pub fn merge(&mut self, other: &Rect) {
        *self = self.union(other);
    }

    /// Smallest rectangle enclosing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Grow (k > 0) or shrink (k < 0) the rectangle by `k` pixels on every side.
    ///
    /// The size never goes below zero.
    pub fn inflate(&mut self, k: i32) {
        self.width = (self.width + 2 * k).max(0);
        self.height = (self.height + 2 * k).max(0);
        self.x -= k;
        self.y -= k;
    }

    /// Copy of this rectangle inflated by `k`.
    pub fn inflated(&self, k: i32) -> Rect {
        let mut r = *self;
        r.inflate(k);
        r
    }

    /// Scale position and size by `s`, rounding half up.
    pub fn scale(&mut self, s: f32) {
        self.x = (self.x as f32 * s + 0.5) as i32;
        self.y = (self.y as f32 * s + 0.5) as i32;
        self.width = (self.width as f32 * s + 0.5) as i32;
        self.height = (self.height as f32 * s + 0.5) as i32;
    }

    /// Check if this rectangle overlaps another on both axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use layout_oxide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0, 0, 100, 100);
    /// let r2 = Rect::new(50, 50, 100, 100);
    /// let r3 = Rect::new(0, 200, 100, 100);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Overlapping part of two rectangles. Empty when they do not intersect.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Rect::from_points(x0, y0, x1.max(x0), y1.max(y0))
    }

    /// Restrict this rectangle to an image of the given size.
    pub fn clamp_to(&self, width: u32, height: u32) -> Rect {
        self.intersection(&Rect::new(0, 0, width as i32, height as i32))
    }

    /// Check if this rectangle contains a point (right/bottom edges excluded).
    pub fn contains_point(&self, p: &Point) -> bool {
        self.x <= p.x && p.x < self.right() && self.y <= p.y && p.y < self.bottom()
    }

    /// Check if both end points of a segment lie inside this rectangle.
    pub fn contains_segment(&self, s: &Segment) -> bool {
        self.contains_point(&s.start) && self.contains_point(&s.end)
    }

    /// Check if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}
