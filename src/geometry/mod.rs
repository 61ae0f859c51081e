//! Geometric primitives for evidence regions.
//!
//! All coordinates live in page space: the origin is the top-left corner of the
//! visible page box and y grows downward.

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page space.
///
/// Constructors normalise their input so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from two corners, in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::geometry::Rect;
    ///
    /// let rect = Rect::new(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x0, 10.0);
    /// assert_eq!(rect.y0, 20.0);
    /// assert_eq!(rect.width(), 100.0);
    /// assert_eq!(rect.height(), 50.0);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a rectangle from its top-left corner and size.
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest rectangle containing all the given points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rect {
            x0: first.x,
            y0: first.y,
            x1: first.x,
            y1: first.y,
        };
        for p in iter {
            rect.x0 = rect.x0.min(p.x);
            rect.y0 = rect.y0.min(p.y);
            rect.x1 = rect.x1.max(p.x);
            rect.y1 = rect.y1.max(p.y);
        }
        Some(rect)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }

    /// Check if this rectangle fully contains another.
    pub fn contains(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 75.0, 75.0);
    /// assert_eq!(r1.union(&r2), Rect::new(0.0, 0.0, 75.0, 75.0));
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Combine the top-left corner of `self` with the bottom-right corner of `later`.
    ///
    /// This is how a run of occurrences in reading order is merged into one
    /// region: the earliest occurrence defines the top-left, the latest the
    /// bottom-right. The corners are re-ordered if `later` lies above or to
    /// the left of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_evidence::geometry::Rect;
    ///
    /// let first = Rect::new(72.0, 100.0, 300.0, 112.0);
    /// let last = Rect::new(72.0, 400.0, 200.0, 412.0);
    /// assert_eq!(first.span(&last), Rect::new(72.0, 100.0, 200.0, 412.0));
    /// ```
    pub fn span(&self, later: &Rect) -> Rect {
        Rect::new(self.x0, self.y0, later.x1, later.y1)
    }

    /// Grow the vertical extent: `y0` moves up by `top`, `y1` down by `bottom`.
    pub fn expand(&self, top: f32, bottom: f32) -> Rect {
        Rect::new(self.x0, self.y0 - top, self.x1, self.y1 + bottom)
    }

    /// Stretch horizontally to the full page width, leaving y untouched.
    pub fn clamp_width(&self, page_width: f32) -> Rect {
        Rect::new(0.0, self.y0, page_width, self.y1)
    }

    /// Clamp the vertical extent into `[0, page_height]`.
    pub fn clamp_height(&self, page_height: f32) -> Rect {
        let y0 = self.y0.clamp(0.0, page_height);
        let y1 = self.y1.clamp(0.0, page_height);
        Rect::new(self.x0, y0, self.x1, y1)
    }

    /// Translate the rectangle.
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }
}
