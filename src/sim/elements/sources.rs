//! Light sources. None of them ever intersects a ray.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geom::point::Point;
use crate::geom::segment::Segment;
use crate::geom::vector::Vector;
use crate::sim::element::{Category, OpticalElement};
use crate::sim::elements::ElementRecord;
use crate::sim::engine::config::ViewMode;
use crate::sim::ray::SimulationRay;

/// Number of rays a point source emits per unit of ray density.
pub const RAYS_PER_DENSITY: f64 = 500.0;

/// Upper bound on the rays one source emits in a single trace.
pub const MAX_RAYS_PER_SOURCE: usize = 100_000;

/// Small angular nudge applied to the observer-mode sweep start.
const OBSERVER_SEAM_OFFSET: f64 = 1e-5;

/// Angular step between neighbouring rays at a given density.
fn angular_step(ray_density: f64) -> f64 {
    TAU / angular_count(ray_density) as f64
}

fn angular_count(ray_density: f64) -> usize {
    ((ray_density * RAYS_PER_DENSITY).floor() as usize).clamp(1, MAX_RAYS_PER_SOURCE)
}

/// Brightness carried by each discrete ray, capped at 1.
fn ray_brightness(brightness: f64, ray_density: f64) -> f64 {
    (brightness / ray_density).clamp(0.0, 1.0)
}

fn default_point_brightness() -> f64 {
    0.5
}

fn default_single_brightness() -> f64 {
    1.0
}

/// Isotropic point source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSource {
    pub p1: Point,
    #[serde(default = "default_point_brightness")]
    pub brightness: f64,
    #[serde(default)]
    pub wavelength: Option<f64>,
}

impl PointSource {
    pub fn new(p1: Point) -> Self {
        Self {
            p1,
            brightness: default_point_brightness(),
            wavelength: None,
        }
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = Some(wavelength);
        self
    }
}

impl OpticalElement for PointSource {
    fn category(&self) -> Category {
        Category::LightSource
    }

    /// Rays at uniform angular steps over the full circle.
    ///
    /// In observer mode the sweep starts two steps early so that no seam
    /// lines up with the observer.
    fn emit_rays(&self, ray_density: f64, mode: ViewMode) -> Vec<SimulationRay> {
        let count = angular_count(ray_density);
        if count == MAX_RAYS_PER_SOURCE {
            log::warn!(
                "Point source capped at {} rays for ray density {}",
                MAX_RAYS_PER_SOURCE,
                ray_density
            );
        }
        let step = angular_step(ray_density);
        let start = if mode == ViewMode::Observer {
            -2.0 * step + OBSERVER_SEAM_OFFSET
        } else {
            0.0
        };
        let brightness = ray_brightness(self.brightness, ray_density);

        (0..count)
            .filter_map(|i| {
                let theta = start + i as f64 * step;
                SimulationRay::new(self.p1, Vector::from_angle(theta), brightness)
            })
            .map(|ray| ray.with_wavelength(self.wavelength))
            .collect()
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::PointSource(self.clone())
    }
}

/// A single ray from `p1` towards `p2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleRaySource {
    pub p1: Point,
    pub p2: Point,
    #[serde(default = "default_single_brightness")]
    pub brightness: f64,
    #[serde(default)]
    pub wavelength: Option<f64>,
}

impl SingleRaySource {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            brightness: default_single_brightness(),
            wavelength: None,
        }
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = Some(wavelength);
        self
    }
}

impl OpticalElement for SingleRaySource {
    fn category(&self) -> Category {
        Category::LightSource
    }

    fn emit_rays(&self, _ray_density: f64, _mode: ViewMode) -> Vec<SimulationRay> {
        match SimulationRay::from_points(self.p1, self.p2, self.brightness) {
            Some(ray) => vec![ray.with_wavelength(self.wavelength)],
            None => {
                log::warn!("Single ray source with coincident points emits nothing");
                Vec::new()
            }
        }
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::SingleRay(self.clone())
    }
}

/// Parallel (or divergent) beam emitted from the segment `p1`-`p2`.
///
/// Rays leave perpendicular to the segment, towards its left side
/// (direction `p1 -> p2` rotated by +90 degrees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beam {
    pub p1: Point,
    pub p2: Point,
    #[serde(default = "default_point_brightness")]
    pub brightness: f64,
    /// Half-angle of the fan at each emission point, in degrees.
    #[serde(default)]
    pub emis_angle: f64,
    #[serde(default)]
    pub wavelength: Option<f64>,
}

impl Beam {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            brightness: default_point_brightness(),
            emis_angle: 0.0,
            wavelength: None,
        }
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_emis_angle(mut self, degrees: f64) -> Self {
        self.emis_angle = degrees;
        self
    }

    /// Fan offsets (radians) around the beam direction, symmetric about 0.
    fn fan_angles(&self, ray_density: f64) -> Vec<f64> {
        let half = self.emis_angle.abs().to_radians().min(std::f64::consts::PI);
        let step = angular_step(ray_density);
        let side = (half / step).floor() as i64;
        (-side..=side).map(|k| k as f64 * step).collect()
    }
}

impl OpticalElement for Beam {
    fn category(&self) -> Category {
        Category::LightSource
    }

    /// Evenly spaced emission points along the segment.
    ///
    /// The per-position brightness is shared by the fan sub-rays so the energy
    /// per position does not depend on the spread.
    fn emit_rays(&self, ray_density: f64, _mode: ViewMode) -> Vec<SimulationRay> {
        let segment = Segment::new(self.p1, self.p2);
        let Some(normal) = segment.normal() else {
            log::warn!("Beam with zero length emits nothing");
            return Vec::new();
        };
        let fan = self.fan_angles(ray_density);
        let max_count = (MAX_RAYS_PER_SOURCE / fan.len()).max(1);
        let wanted = segment.length() * ray_density;
        let count = (wanted.round() as usize).clamp(1, max_count);
        if wanted.round() > max_count as f64 {
            log::warn!(
                "Beam capped at {} emission points for ray density {}",
                max_count,
                ray_density
            );
        }
        let brightness = ray_brightness(self.brightness, ray_density) / fan.len() as f64;

        let mut rays = Vec::with_capacity(count * fan.len());
        for i in 0..count {
            let rel = (i as f64 + 0.5) / count as f64;
            let origin = Point::new_between_2_points(self.p1, self.p2, rel);
            for &offset in &fan {
                if let Some(ray) = SimulationRay::new(origin, normal.rotate(offset), brightness) {
                    rays.push(ray.with_wavelength(self.wavelength));
                }
            }
        }
        rays
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::Beam(self.clone())
    }
}
