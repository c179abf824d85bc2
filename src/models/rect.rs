use serde::{Deserialize, Serialize};

use super::Point;

/// Axis-aligned rectangle in view coordinates
///
/// Candidates and the focus area must share one coordinate space; the
/// rectangle itself does not care whether that space is pixels or points.
/// Construct through [`Rect::new`] to keep `right >= left` and
/// `bottom >= top`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawRect")]
pub struct Rect {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

// Deserialization goes through the normalizing constructor.
#[derive(Deserialize)]
struct RawRect {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl From<RawRect> for Rect {
    fn from(raw: RawRect) -> Self {
        Rect::new(raw.left, raw.top, raw.right, raw.bottom)
    }
}

impl Rect {
    /// Create a rectangle, swapping inverted edges
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let (left, right) = if right < left { (right, left) } else { (left, right) };
        let (top, bottom) = if bottom < top { (bottom, top) } else { (top, bottom) };
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from its top-left corner and size
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Create a rectangle centered on `center`
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self::new(
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        )
    }

    /// Width, never negative
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    /// Height, never negative
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Area of the rectangle
    ///
    /// A rectangle built with struct literal syntax may still be inverted;
    /// its area is then zero rather than negative.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        !(self.right > self.left && self.bottom > self.top)
    }

    /// Center point
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Full containment test with inclusive edges
    ///
    /// An empty rectangle contains nothing, not even itself.
    pub fn contains(&self, other: &Rect) -> bool {
        !self.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Point containment with inclusive edges
    pub fn contains_point(&self, p: &Point) -> bool {
        !self.is_empty()
            && p.x >= self.left
            && p.x <= self.right
            && p.y >= self.top
            && p.y <= self.bottom
    }

    /// Translate by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}
