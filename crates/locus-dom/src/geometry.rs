//! Geometry
//!
//! Bounding rectangles and screen points for hit-testing.

use serde::{Deserialize, Serialize};

/// Screen point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Check if point is inside
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Combined distance from all four corners' edges to a point.
    ///
    /// Used to pick the hit whose box hugs the point tightest.
    pub fn corner_distance(&self, p: Point) -> f64 {
        let dx1 = self.left() - p.x;
        let dy1 = self.top() - p.y;
        let dx2 = self.right() - p.x;
        let dy2 = self.bottom() - p.y;
        (dx1 * dx1 + dy1 * dy1 + dx2 * dx2 + dy2 * dy2).sqrt()
    }

    /// Zero-area rects never contain a visible pixel
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
