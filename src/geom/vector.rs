use crate::geom::EPS;
use crate::geom::point::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn from_points(beg: Point, end: Point) -> Self {
        Self {
            dx: end.x - beg.x,
            dy: end.y - beg.y,
        }
    }

    /// Unit vector for an angle measured from +y towards +x: `(sin θ, cos θ)`.
    ///
    /// Every light source uses this convention, so θ = 0 points along +y.
    pub fn from_angle(theta: f64) -> Self {
        Self {
            dx: theta.sin(),
            dy: theta.cos(),
        }
    }

    /// Scalar (z-component) cross product between 2 vectors.
    pub fn cross(&self, other: &Self) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }

    /// Dot product between 2 vectors.
    pub fn dot(&self, other: &Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// Returns the length of the vector.
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f64 {
        self.dx.powi(2) + self.dy.powi(2)
    }

    pub fn is_close(&self, other: &Self) -> bool {
        (self.dx - other.dx).abs() < EPS && (self.dy - other.dy).abs() < EPS
    }

    /// Normalizes the vector (divides by its length) and returns a copy.
    ///
    /// Returns `None` for (near) zero-length or non-finite vectors.
    pub fn normalize(&self) -> Option<Self> {
        let len = self.length();
        if len < EPS || !len.is_finite() {
            None
        } else {
            Some(Self {
                dx: self.dx / len,
                dy: self.dy / len,
            })
        }
    }

    /// Rotates the vector by +90 degrees (counterclockwise).
    pub fn perp(&self) -> Self {
        Self {
            dx: -self.dy,
            dy: self.dx,
        }
    }

    /// Rotates the vector counterclockwise by `angle` radians.
    pub fn rotate(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            dx: self.dx * c - self.dy * s,
            dy: self.dx * s + self.dy * c,
        }
    }

    /// Returns this vector flipped if needed so that it points against `direction`.
    pub fn facing_against(&self, direction: &Self) -> Self {
        if self.dot(direction) > 0.0 { -*self } else { *self }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(f, "Vector({:.prec$}, {:.prec$})", self.dx, self.dy, prec = prec)
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
        }
    }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
        }
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, other: f64) -> Self {
        Self {
            dx: self.dx * other,
            dy: self.dy * other,
        }
    }
}

impl Mul<Vector> for f64 {
    type Output = Vector;
    fn mul(self, other: Vector) -> Vector {
        other * self
    }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}
