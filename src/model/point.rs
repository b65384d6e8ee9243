//! Geometry primitives in image space and display space.

use serde::{Deserialize, Serialize};

/// A point in original-image pixel coordinates.
///
/// Serialized as a two-element array `[x, y]`, matching the label file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A position in viewport (display) coordinates, as delivered by pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPos {
    pub x: f64,
    pub y: f64,
}

impl DisplayPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
