//! Refractive elements.
//!
//! Every glass decides whether a ray is entering or leaving by looking at the
//! midpoint between the ray origin and the hit point: the ray cannot cross
//! this element's boundary before its nearest hit, so that probe is on the
//! same side as the whole path travelled so far.

use serde::{Deserialize, Serialize};

use crate::geom::circle::Circle;
use crate::geom::optics::{cauchy_index, fresnel_reflectance, reflect, refract};
use crate::geom::point::Point;
use crate::geom::polygon::{edges, point_in_polygon};
use crate::geom::ray::ray_circle_intersections;
use crate::geom::segment::{Segment, line_intersection_params};
use crate::geom::{EPS, MIN_T, PARALLEL_EPS};
use crate::sim::element::{Category, Intersection, OpticalElement, RayInteraction};
use crate::sim::elements::mirrors::ideal_deflection;
use crate::sim::elements::{ElementRecord, segment_hit};
use crate::sim::ray::SimulationRay;

/// Partial reflections dimmer than this are not spawned.
pub const FRESNEL_SPAWN_THRESHOLD: f64 = 0.01;

/// Straight pieces per curved surface of a spherical lens.
pub const LENS_SURFACE_SEGMENTS: usize = 40;

fn default_ref_index() -> f64 {
    1.5
}

fn default_cauchy_b() -> f64 {
    0.004
}

/// Index of refraction seen by `ray`. White rays use `ref_index` as is.
fn index_for(ref_index: f64, cauchy_b: f64, ray: &SimulationRay) -> f64 {
    match ray.wavelength {
        Some(wavelength) => cauchy_index(ref_index, cauchy_b, wavelength),
        None => ref_index,
    }
}

/// Fresnel refraction at a glass boundary.
///
/// `inside` tells whether the ray travels inside the glass before the hit.
/// Under total internal reflection the whole ray is reflected. Otherwise the
/// refracted ray continues the chain and the partial reflection is spawned as
/// a new ray if it is bright enough. Dropped partial reflections are not
/// counted as truncation.
pub(crate) fn refract_at(
    ray: &SimulationRay,
    hit: &Intersection,
    glass_index: f64,
    inside: bool,
) -> RayInteraction {
    let (n1, n2) = if inside {
        (glass_index, 1.0)
    } else {
        (1.0, glass_index)
    };
    let reflected_dir = reflect(ray.direction, hit.normal);
    let Some(refracted_dir) = refract(ray.direction, hit.normal, n1, n2) else {
        return RayInteraction::outgoing(ray.redirected(hit.point, reflected_dir));
    };

    let cos_i = -ray.direction.dot(&hit.normal);
    let (rs, rp) = fresnel_reflectance(cos_i, n1, n2);
    let refracted = ray
        .redirected(hit.point, refracted_dir)
        .map(|r| r.scaled(1.0 - rs, 1.0 - rp));
    let mut interaction = RayInteraction::outgoing(refracted);

    if ray.brightness_s * rs + ray.brightness_p * rp > FRESNEL_SPAWN_THRESHOLD
        && let Some(reflected) = ray.redirected(hit.point, reflected_dir)
    {
        interaction = interaction.with_new_ray(reflected.scaled(rs, rp));
    }
    interaction
}

fn probe(ray: &SimulationRay, hit: &Intersection) -> Point {
    ray.origin.midpoint(&hit.point)
}

/// Glass filling the half-plane to the left of `p1 -> p2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfPlaneGlass {
    pub p1: Point,
    pub p2: Point,
    #[serde(default = "default_ref_index")]
    pub ref_index: f64,
    #[serde(default = "default_cauchy_b")]
    pub cauchy_b: f64,
}

impl HalfPlaneGlass {
    pub fn new(p1: Point, p2: Point, ref_index: f64) -> Self {
        Self {
            p1,
            p2,
            ref_index,
            cauchy_b: default_cauchy_b(),
        }
    }

    fn boundary(&self) -> Segment {
        Segment::new(self.p1, self.p2)
    }

    pub fn is_inside(&self, pt: Point) -> bool {
        self.boundary().side(pt) > 0.0
    }
}

impl OpticalElement for HalfPlaneGlass {
    fn category(&self) -> Category {
        Category::Glass
    }

    /// Hit with the infinite boundary line.
    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        let boundary = self.boundary();
        let (t, _) = line_intersection_params(
            ray.origin,
            ray.direction,
            boundary.p1,
            boundary.vector(),
            PARALLEL_EPS,
        )?;
        if t <= MIN_T {
            return None;
        }
        Intersection::new(ray, t, ray.point_at(t), boundary.normal()?)
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        let n = index_for(self.ref_index, self.cauchy_b, ray);
        refract_at(ray, hit, n, self.is_inside(probe(ray, hit)))
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::PlaneGlass(self.clone())
    }
}

/// Glass disk centered at `p1` with `p2` on its rim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleGlass {
    pub p1: Point,
    pub p2: Point,
    #[serde(default = "default_ref_index")]
    pub ref_index: f64,
    #[serde(default = "default_cauchy_b")]
    pub cauchy_b: f64,
}

impl CircleGlass {
    pub fn new(center: Point, boundary: Point, ref_index: f64) -> Self {
        Self {
            p1: center,
            p2: boundary,
            ref_index,
            cauchy_b: default_cauchy_b(),
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::through(self.p1, self.p2)
    }
}

impl OpticalElement for CircleGlass {
    fn category(&self) -> Category {
        Category::Glass
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        let circle = self.circle();
        if circle.radius < EPS {
            return None;
        }
        let (t, point) = ray_circle_intersections(ray.origin, ray.direction, &circle)
            .into_iter()
            .next()?;
        Intersection::new(ray, t, point, point - circle.center)
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        let n = index_for(self.ref_index, self.cauchy_b, ray);
        refract_at(ray, hit, n, self.circle().contains(probe(ray, hit)))
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::CircleGlass(self.clone())
    }
}

/// Glass bounded by a closed polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonGlass {
    pub path: Vec<Point>,
    #[serde(default = "default_ref_index")]
    pub ref_index: f64,
    #[serde(default = "default_cauchy_b")]
    pub cauchy_b: f64,
}

impl PolygonGlass {
    pub fn new(path: Vec<Point>, ref_index: f64) -> Self {
        Self {
            path,
            ref_index,
            cauchy_b: default_cauchy_b(),
        }
    }
}

fn polygon_hit(path: &[Point], ray: &SimulationRay) -> Option<Intersection> {
    if path.len() < 3 {
        return None;
    }
    edges(path)
        .filter_map(|edge| segment_hit(ray, &edge))
        .min_by(|a, b| a.t.total_cmp(&b.t))
}

impl OpticalElement for PolygonGlass {
    fn category(&self) -> Category {
        Category::Glass
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        polygon_hit(&self.path, ray)
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        let n = index_for(self.ref_index, self.cauchy_b, ray);
        refract_at(ray, hit, n, point_in_polygon(probe(ray, hit), &self.path))
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::Glass(self.clone())
    }
}

/// Lens with two spherical (or flat) surfaces.
///
/// `p1` and `p2` are the front and back vertices on the optical axis. A surface
/// radius is signed along `p1 -> p2`: the center of curvature lies at
/// `vertex + r * axis`. A missing, zero or infinite radius means a flat surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LensParams", into = "LensParams")]
pub struct SphericalLens {
    params: LensParams,
    path: Vec<Point>,
}

/// Parameters of a spherical lens, as written to scene files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LensParams {
    p1: Point,
    p2: Point,
    diameter: f64,
    #[serde(default)]
    r1: Option<f64>,
    #[serde(default)]
    r2: Option<f64>,
    #[serde(default = "default_ref_index")]
    ref_index: f64,
    #[serde(default = "default_cauchy_b")]
    cauchy_b: f64,
}

fn curvature_radius(r: Option<f64>) -> Option<f64> {
    r.filter(|r| r.is_finite() && r.abs() > EPS)
}

/// Axial offset of a spherical surface at height `y` from the axis.
fn sag(radius: Option<f64>, y: f64) -> f64 {
    match radius {
        Some(r) => r - r.signum() * (r * r - y * y).max(0.0).sqrt(),
        None => 0.0,
    }
}

impl LensParams {
    /// Closed outline: front surface bottom to top, then back surface top to bottom.
    ///
    /// The aperture is clipped to the smallest curved radius.
    fn outline(&self) -> Vec<Point> {
        let Some(axis) = (self.p2 - self.p1).normalize() else {
            return Vec::new();
        };
        let r1 = curvature_radius(self.r1);
        let r2 = curvature_radius(self.r2);
        let half = [r1, r2]
            .into_iter()
            .flatten()
            .fold(0.5 * self.diameter, |h, r| h.min(r.abs()));
        if !half.is_finite() || half <= EPS {
            return Vec::new();
        }
        let across = axis.perp();
        let n = LENS_SURFACE_SEGMENTS;
        let height = |k: usize| -half + 2.0 * half * k as f64 / n as f64;
        let surface =
            |vertex: Point, r: Option<f64>, y: f64| vertex + axis * sag(r, y) + across * y;

        let mut path = Vec::with_capacity(2 * (n + 1));
        path.extend((0..=n).map(|k| surface(self.p1, r1, height(k))));
        path.extend((0..=n).rev().map(|k| surface(self.p2, r2, height(k))));
        path
    }
}

impl From<LensParams> for SphericalLens {
    fn from(params: LensParams) -> Self {
        Self {
            params,
            path: params.outline(),
        }
    }
}

impl From<SphericalLens> for LensParams {
    fn from(lens: SphericalLens) -> Self {
        lens.params
    }
}

impl SphericalLens {
    pub fn new(p1: Point, p2: Point, diameter: f64, r1: Option<f64>, r2: Option<f64>) -> Self {
        LensParams {
            p1,
            p2,
            diameter,
            r1,
            r2,
            ref_index: default_ref_index(),
            cauchy_b: default_cauchy_b(),
        }
        .into()
    }

    pub fn with_ref_index(mut self, ref_index: f64) -> Self {
        self.params.ref_index = ref_index;
        self
    }

    /// Lens outline, built once with the lens. Empty for a lens with
    /// coincident vertices or no aperture.
    pub fn path(&self) -> &[Point] {
        &self.path
    }
}

impl OpticalElement for SphericalLens {
    fn category(&self) -> Category {
        Category::Glass
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        polygon_hit(&self.path, ray)
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        let n = index_for(self.params.ref_index, self.params.cauchy_b, ray);
        let inside = point_in_polygon(probe(ray, hit), &self.path);
        refract_at(ray, hit, n, inside)
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::SphericalLens(self.clone())
    }
}

/// Thin ideal lens along `p1`-`p2`. Positive focal length converges.
///
/// Achromatic: the wavelength of the ray is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealLens {
    pub p1: Point,
    pub p2: Point,
    pub focal_length: f64,
}

impl IdealLens {
    pub fn new(p1: Point, p2: Point, focal_length: f64) -> Self {
        Self {
            p1,
            p2,
            focal_length,
        }
    }

    fn segment(&self) -> Segment {
        Segment::new(self.p1, self.p2)
    }
}

impl OpticalElement for IdealLens {
    fn category(&self) -> Category {
        Category::Glass
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        segment_hit(ray, &self.segment())
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        match ideal_deflection(&self.segment(), self.focal_length, ray.direction, hit.point, true) {
            Some(direction) => RayInteraction::outgoing(ray.redirected(hit.point, direction)),
            None => RayInteraction::pass_through(ray, hit),
        }
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::IdealLens(self.clone())
    }
}
