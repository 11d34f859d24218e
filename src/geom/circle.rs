//! Circles and circular arcs.

use std::f64::consts::TAU;

use crate::geom::point::Point;
use crate::geom::segment::Line;
use serde::{Deserialize, Serialize};

/// Angular tolerance used at arc end points (radians).
const ANGLE_TOL: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Circle centered at `center` passing through `boundary`.
    pub fn through(center: Point, boundary: Point) -> Self {
        Self {
            center,
            radius: center.distance(&boundary),
        }
    }

    /// Circumscribed circle of three points.
    ///
    /// The center is found as the intersection of the perpendicular bisectors
    /// of `p1`-`p3` and `p2`-`p3`. Returns `None` for collinear points.
    pub fn from_3_points(p1: Point, p2: Point, p3: Point) -> Option<Self> {
        let b13 = Line::perpendicular_bisector(p1, p3);
        let b23 = Line::perpendicular_bisector(p2, p3);
        let center = b13.intersection(&b23)?;
        if !center.is_finite() {
            return None;
        }
        Some(Self::through(center, p3))
    }

    /// Polar angle of `pt` around the center, in `(-pi, pi]`.
    pub fn angle_of(&self, pt: Point) -> f64 {
        (pt.y - self.center.y).atan2(pt.x - self.center.x)
    }

    pub fn contains(&self, pt: Point) -> bool {
        self.center.distance_squared(&pt) < self.radius * self.radius
    }
}

/// Circular arc swept from `start_angle` to `end_angle`.
///
/// Angles are polar angles around the center (`atan2` convention).
/// `counterclockwise` selects the sweep direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub circle: Circle,
    pub start_angle: f64,
    pub end_angle: f64,
    pub counterclockwise: bool,
}

impl Arc {
    /// Arc through `p1`, `p3` and `p2`, starting at `p1` and ending at `p2`.
    ///
    /// The sweep orientation follows the winding of the triangle `p1, p3, p2`:
    /// points visited counterclockwise around a circle always form a
    /// counterclockwise triangle. Returns `None` for collinear points.
    pub fn from_3_points(p1: Point, p2: Point, p3: Point) -> Option<Self> {
        let circle = Circle::from_3_points(p1, p2, p3)?;
        let winding = (p3 - p1).cross(&(p2 - p1));
        Some(Self {
            circle,
            start_angle: circle.angle_of(p1),
            end_angle: circle.angle_of(p2),
            counterclockwise: winding > 0.0,
        })
    }

    /// Angular extent of the arc in `[0, 2pi)`.
    pub fn span(&self) -> f64 {
        if self.counterclockwise {
            (self.end_angle - self.start_angle).rem_euclid(TAU)
        } else {
            (self.start_angle - self.end_angle).rem_euclid(TAU)
        }
    }

    /// Returns true if the polar angle `theta` lies within the swept span.
    ///
    /// Handles wraparound at +-pi by measuring the offset from the start
    /// angle modulo 2pi in the sweep direction.
    pub fn contains_angle(&self, theta: f64) -> bool {
        let offset = if self.counterclockwise {
            (theta - self.start_angle).rem_euclid(TAU)
        } else {
            (self.start_angle - theta).rem_euclid(TAU)
        };
        offset <= self.span() + ANGLE_TOL || offset >= TAU - ANGLE_TOL
    }

    pub fn contains_point(&self, pt: Point) -> bool {
        self.contains_angle(self.circle.angle_of(pt))
    }
}
