//! Absorbing elements.

use serde::{Deserialize, Serialize};

use crate::geom::EPS;
use crate::geom::circle::Circle;
use crate::geom::point::Point;
use crate::geom::ray::ray_circle_intersections;
use crate::geom::segment::Segment;
use crate::sim::element::{Category, Intersection, OpticalElement, RayInteraction};
use crate::sim::elements::{ElementRecord, nearest_segment_hit, segment_hit};
use crate::sim::ray::SimulationRay;

/// Wavelength window in which a blocker lets rays through.
///
/// With `invert` the window is blocked and everything else passes.
/// White rays (no wavelength) never pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandpassFilter {
    /// Center of the window in nm.
    pub wavelength: f64,
    /// Full width of the window in nm.
    pub bandwidth: f64,
    #[serde(default)]
    pub invert: bool,
}

impl BandpassFilter {
    pub fn new(wavelength: f64, bandwidth: f64) -> Self {
        Self {
            wavelength,
            bandwidth,
            invert: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    pub fn passes(&self, ray: &SimulationRay) -> bool {
        match ray.wavelength {
            Some(wavelength) => {
                let in_band = (wavelength - self.wavelength).abs() <= 0.5 * self.bandwidth;
                in_band != self.invert
            }
            None => false,
        }
    }
}

fn filtered(filter: &Option<BandpassFilter>, ray: &SimulationRay) -> bool {
    filter.as_ref().is_some_and(|f| f.passes(ray))
}

/// Opaque segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBlocker {
    pub p1: Point,
    pub p2: Point,
    #[serde(default)]
    pub filter: Option<BandpassFilter>,
}

impl LineBlocker {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: BandpassFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl OpticalElement for LineBlocker {
    fn category(&self) -> Category {
        Category::Blocker
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        if filtered(&self.filter, ray) {
            return None;
        }
        segment_hit(ray, &Segment::new(self.p1, self.p2))
    }

    fn on_ray_incident(&self, _ray: &SimulationRay, _hit: &Intersection) -> RayInteraction {
        RayInteraction::absorbed()
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::Blocker(self.clone())
    }
}

/// Opaque disk centered at `p1` with `p2` on its rim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleBlocker {
    pub p1: Point,
    pub p2: Point,
    #[serde(default)]
    pub filter: Option<BandpassFilter>,
}

impl CircleBlocker {
    pub fn new(center: Point, boundary: Point) -> Self {
        Self {
            p1: center,
            p2: boundary,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: BandpassFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl OpticalElement for CircleBlocker {
    fn category(&self) -> Category {
        Category::Blocker
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        if filtered(&self.filter, ray) {
            return None;
        }
        let circle = Circle::through(self.p1, self.p2);
        if circle.radius < EPS {
            return None;
        }
        let (t, point) = ray_circle_intersections(ray.origin, ray.direction, &circle)
            .into_iter()
            .next()?;
        Intersection::new(ray, t, point, point - circle.center)
    }

    fn on_ray_incident(&self, _ray: &SimulationRay, _hit: &Intersection) -> RayInteraction {
        RayInteraction::absorbed()
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::CircleBlocker(self.clone())
    }
}

/// Opaque line `p1`-`p2` with a transparent opening `p3`-`p4`.
///
/// The blocking parts are `p1`-`p3` and `p4`-`p2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aperture {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
    pub p4: Point,
    #[serde(default)]
    pub filter: Option<BandpassFilter>,
}

impl Aperture {
    pub fn new(p1: Point, p2: Point, p3: Point, p4: Point) -> Self {
        Self {
            p1,
            p2,
            p3,
            p4,
            filter: None,
        }
    }

    /// Aperture centered on `p1`-`p2`, with an opening of `width` in the middle.
    pub fn centered(p1: Point, p2: Point, width: f64) -> Self {
        let length = p1.distance(&p2);
        let rel = if length > EPS {
            (0.5 * width / length).clamp(0.0, 0.5)
        } else {
            0.0
        };
        Self::new(
            p1,
            p2,
            Point::new_between_2_points(p1, p2, 0.5 - rel),
            Point::new_between_2_points(p1, p2, 0.5 + rel),
        )
    }

    pub fn segments(&self) -> [Segment; 2] {
        [Segment::new(self.p1, self.p3), Segment::new(self.p4, self.p2)]
    }
}

impl OpticalElement for Aperture {
    fn category(&self) -> Category {
        Category::Blocker
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        if filtered(&self.filter, ray) {
            return None;
        }
        nearest_segment_hit(ray, &self.segments())
    }

    fn on_ray_incident(&self, _ray: &SimulationRay, _hit: &Intersection) -> RayInteraction {
        RayInteraction::absorbed()
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::Aperture(self.clone())
    }
}
