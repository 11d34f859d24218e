//! The capability contract shared by every optical element.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::point::Point;
use crate::geom::vector::Vector;
use crate::sim::elements::ElementRecord;
use crate::sim::engine::config::ViewMode;
use crate::sim::ray::SimulationRay;

/// Broad family an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Emits rays, never intersects any ray.
    LightSource,
    Mirror,
    Glass,
    Blocker,
}

/// A ray-surface hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// Ray parameter of the hit (> `MIN_T`).
    pub t: f64,
    /// Unit surface normal facing the incoming ray.
    pub normal: Vector,
}

impl Intersection {
    /// Builds a hit, orienting `surface_normal` against the ray direction.
    ///
    /// Returns `None` if the normal is degenerate.
    pub fn new(ray: &SimulationRay, t: f64, point: Point, surface_normal: Vector) -> Option<Self> {
        let normal = surface_normal.normalize()?.facing_against(&ray.direction);
        Some(Self { point, t, normal })
    }
}

/// Outcome of a ray striking an element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RayInteraction {
    pub is_absorbed: bool,
    /// Primary continuation of the incoming ray.
    pub outgoing_ray: Option<SimulationRay>,
    /// Secondary branches (e.g. partial reflection next to refraction).
    pub new_rays: Vec<SimulationRay>,
    /// Brightness discarded by this interaction.
    pub truncation: f64,
}

impl RayInteraction {
    pub fn absorbed() -> Self {
        Self {
            is_absorbed: true,
            ..Self::default()
        }
    }

    /// Continues with a single outgoing ray. A `None` ray ends the chain.
    pub fn outgoing(ray: Option<SimulationRay>) -> Self {
        Self {
            is_absorbed: ray.is_none(),
            outgoing_ray: ray,
            ..Self::default()
        }
    }

    /// The ray continues undeviated from the hit point.
    pub fn pass_through(ray: &SimulationRay, hit: &Intersection) -> Self {
        Self::outgoing(ray.redirected(hit.point, ray.direction))
    }

    pub fn with_new_ray(mut self, ray: SimulationRay) -> Self {
        self.new_rays.push(ray);
        self
    }
}

/// Every concrete element kind implements this trait once.
///
/// Elements are borrowed read-only for the whole duration of a trace.
pub trait OpticalElement: fmt::Debug + Send + Sync {
    fn category(&self) -> Category;

    /// Rays emitted at the start of a trace. Empty unless the element is a source.
    fn emit_rays(&self, _ray_density: f64, _mode: ViewMode) -> Vec<SimulationRay> {
        Vec::new()
    }

    /// Nearest hit of `ray` with this element, if any.
    fn check_ray_intersection(&self, _ray: &SimulationRay) -> Option<Intersection> {
        None
    }

    /// What happens to `ray` when it strikes this element at `hit`.
    fn on_ray_incident(&self, _ray: &SimulationRay, _hit: &Intersection) -> RayInteraction {
        RayInteraction::absorbed()
    }

    /// Type-discriminated serializable form of the element.
    fn serialize(&self) -> ElementRecord;
}
