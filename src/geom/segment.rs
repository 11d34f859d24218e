//! Line segments and infinite lines in the plane.

use crate::geom::point::Point;
use crate::geom::vector::Vector;
use serde::{Deserialize, Serialize};

/// A straight segment between two end points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
}

impl Segment {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Vector from `p1` to `p2` (not normalized).
    pub fn vector(&self) -> Vector {
        self.p2 - self.p1
    }

    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    pub fn midpoint(&self) -> Point {
        self.p1.midpoint(&self.p2)
    }

    /// Unit direction `p1 -> p2`, or `None` for a degenerate segment.
    pub fn direction(&self) -> Option<Vector> {
        self.vector().normalize()
    }

    /// Unit normal obtained by rotating the direction by +90 degrees.
    ///
    /// Points to the left of `p1 -> p2`.
    pub fn normal(&self) -> Option<Vector> {
        self.direction().map(|d| d.perp())
    }

    /// Signed side of `pt` relative to `p1 -> p2` (positive = left).
    pub fn side(&self, pt: Point) -> f64 {
        self.vector().cross(&(pt - self.p1))
    }
}

/// An infinite line through two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn from_point_direction(p: Point, direction: Vector) -> Self {
        Self { p1: p, p2: p + direction }
    }

    /// Intersection point of two lines, `None` if they are (nearly) parallel.
    pub fn intersection(&self, other: &Self) -> Option<Point> {
        let (t, _) = line_intersection_params(
            self.p1,
            self.p2 - self.p1,
            other.p1,
            other.p2 - other.p1,
            1e-12,
        )?;
        Some(self.p1 + (self.p2 - self.p1) * t)
    }

    /// Perpendicular bisector of the segment `a`-`b`.
    pub fn perpendicular_bisector(a: Point, b: Point) -> Self {
        let mid = a.midpoint(&b);
        Self::from_point_direction(mid, (b - a).perp())
    }
}

/// Solves `a + t * da = b + s * db` and returns `(t, s)`.
///
/// Returns `None` when `|da x db| < min_cross`.
pub fn line_intersection_params(
    a: Point,
    da: Vector,
    b: Point,
    db: Vector,
    min_cross: f64,
) -> Option<(f64, f64)> {
    let denom = da.cross(&db);
    if denom.abs() < min_cross {
        return None;
    }
    let ab = b - a;
    let t = ab.cross(&db) / denom;
    let s = ab.cross(&da) / denom;
    Some((t, s))
}
