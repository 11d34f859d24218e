use serde::{Deserialize, Serialize};

use crate::geom::point::Point;
use crate::geom::vector::Vector;

/// A ray travelling through the scene.
///
/// Rays are values: every interaction produces new rays instead of mutating
/// the incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRay {
    pub origin: Point,
    /// Unit direction.
    pub direction: Vector,
    /// s-polarized intensity (>= 0).
    pub brightness_s: f64,
    /// p-polarized intensity (>= 0).
    pub brightness_p: f64,
    /// Starts a visually disconnected chain: no backward extension is drawn.
    pub gap: bool,
    /// Freshly emitted by a light source.
    pub is_new: bool,
    /// Wavelength in nm, `None` for white light.
    pub wavelength: Option<f64>,
}

impl SimulationRay {
    /// Creates a freshly emitted ray with `brightness` split evenly between S and P.
    ///
    /// Returns `None` if `direction` cannot be normalized.
    pub fn new(origin: Point, direction: Vector, brightness: f64) -> Option<Self> {
        let direction = direction.normalize()?;
        let half = brightness.max(0.0) * 0.5;
        Some(Self {
            origin,
            direction,
            brightness_s: half,
            brightness_p: half,
            gap: false,
            is_new: true,
            wavelength: None,
        })
    }

    /// Ray from `origin` aimed at `target`.
    pub fn from_points(origin: Point, target: Point, brightness: f64) -> Option<Self> {
        Self::new(origin, target - origin, brightness)
    }

    pub fn with_wavelength(self, wavelength: Option<f64>) -> Self {
        Self { wavelength, ..self }
    }

    pub fn with_gap(self, gap: bool) -> Self {
        Self { gap, ..self }
    }

    /// Combined brightness of both polarizations.
    pub fn brightness(&self) -> f64 {
        self.brightness_s + self.brightness_p
    }

    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Continues the ray from `origin` in a new direction with the same intensities.
    ///
    /// The result is no longer new and starts a connected chain.
    /// Returns `None` if `direction` cannot be normalized.
    pub fn redirected(&self, origin: Point, direction: Vector) -> Option<Self> {
        let direction = direction.normalize()?;
        Some(Self {
            origin,
            direction,
            gap: false,
            is_new: false,
            ..*self
        })
    }

    /// Copy of the ray with each polarization scaled by its own factor.
    pub fn scaled(&self, factor_s: f64, factor_p: f64) -> Self {
        Self {
            brightness_s: (self.brightness_s * factor_s).max(0.0),
            brightness_p: (self.brightness_p * factor_p).max(0.0),
            ..*self
        }
    }
}
