//! Point, stroke and path-set model for captured drawings.

use kurbo::BezPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A surface-relative pixel coordinate.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Convert to a floating-point kurbo point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl From<[u32; 2]> for Point {
    fn from([x, y]: [u32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [u32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Error returned when building a stroke from no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyStroke;

impl fmt::Display for EmptyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a stroke must contain at least one point")
    }
}

impl std::error::Error for EmptyStroke {}

/// One pointer-down to pointer-up gesture.
///
/// Points are kept in the order they were drawn. A stroke is never empty;
/// a stroke with a single point is a tap and renders as a dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke at `start`.
    pub fn new(start: Point) -> Self {
        Self { points: vec![start] }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Result<Self, EmptyStroke> {
        if points.is_empty() {
            return Err(EmptyStroke);
        }
        Ok(Self { points })
    }

    /// Add a point to the end of the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Points in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The first point of the stroke.
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Returns the point if this stroke is a single tap.
    pub fn as_dot(&self) -> Option<Point> {
        match self.points.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Polyline through every point of the stroke.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start().to_kurbo());
        for point in self.points.iter().skip(1) {
            path.line_to(point.to_kurbo());
        }
        path
    }
}

impl TryFrom<Vec<Point>> for Stroke {
    type Error = EmptyStroke;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<Stroke> for Vec<Point> {
    fn from(stroke: Stroke) -> Self {
        stroke.points
    }
}

/// All strokes of one drawing, back to front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSet {
    strokes: Vec<Stroke>,
}

impl PathSet {
    /// Create an empty path set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn last_mut(&mut self) -> Option<&mut Stroke> {
        self.strokes.last_mut()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    /// Number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total number of points across all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points().len()).sum()
    }
}

impl From<Vec<Stroke>> for PathSet {
    fn from(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }
}

impl FromIterator<Stroke> for PathSet {
    fn from_iter<I: IntoIterator<Item = Stroke>>(iter: I) -> Self {
        Self {
            strokes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a Stroke;
    type IntoIter = std::slice::Iter<'a, Stroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.strokes.iter()
    }
}
