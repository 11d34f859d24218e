//! Concrete optical elements and their serializable records.

pub mod blockers;
pub mod glass;
pub mod mirrors;
pub mod sources;

use serde::{Deserialize, Serialize};

use crate::geom::ray::{ray_segment_intersection, ray_segments_intersection};
use crate::geom::segment::Segment;
use crate::sim::element::{Intersection, OpticalElement};
use crate::sim::ray::SimulationRay;

use blockers::{Aperture, CircleBlocker, LineBlocker};
use glass::{CircleGlass, HalfPlaneGlass, IdealLens, PolygonGlass, SphericalLens};
use mirrors::{ArcMirror, BeamSplitter, IdealMirror, ParabolicMirror, SegmentMirror};
use sources::{Beam, PointSource, SingleRaySource};

/// Serialized form of an element, discriminated by its `"type"` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementRecord {
    PointSource(PointSource),
    Beam(Beam),
    SingleRay(SingleRaySource),
    Mirror(SegmentMirror),
    ArcMirror(ArcMirror),
    ParabolicMirror(ParabolicMirror),
    IdealMirror(IdealMirror),
    BeamSplitter(BeamSplitter),
    PlaneGlass(HalfPlaneGlass),
    CircleGlass(CircleGlass),
    Glass(PolygonGlass),
    SphericalLens(SphericalLens),
    IdealLens(IdealLens),
    Blocker(LineBlocker),
    CircleBlocker(CircleBlocker),
    Aperture(Aperture),
}

impl ElementRecord {
    /// Builds the live element described by this record.
    pub fn into_element(self) -> Box<dyn OpticalElement> {
        match self {
            Self::PointSource(e) => Box::new(e),
            Self::Beam(e) => Box::new(e),
            Self::SingleRay(e) => Box::new(e),
            Self::Mirror(e) => Box::new(e),
            Self::ArcMirror(e) => Box::new(e),
            Self::ParabolicMirror(e) => Box::new(e),
            Self::IdealMirror(e) => Box::new(e),
            Self::BeamSplitter(e) => Box::new(e),
            Self::PlaneGlass(e) => Box::new(e),
            Self::CircleGlass(e) => Box::new(e),
            Self::Glass(e) => Box::new(e),
            Self::SphericalLens(e) => Box::new(e),
            Self::IdealLens(e) => Box::new(e),
            Self::Blocker(e) => Box::new(e),
            Self::CircleBlocker(e) => Box::new(e),
            Self::Aperture(e) => Box::new(e),
        }
    }

    /// The `"type"` tag written for this record.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::PointSource(_) => "PointSource",
            Self::Beam(_) => "Beam",
            Self::SingleRay(_) => "SingleRay",
            Self::Mirror(_) => "Mirror",
            Self::ArcMirror(_) => "ArcMirror",
            Self::ParabolicMirror(_) => "ParabolicMirror",
            Self::IdealMirror(_) => "IdealMirror",
            Self::BeamSplitter(_) => "BeamSplitter",
            Self::PlaneGlass(_) => "PlaneGlass",
            Self::CircleGlass(_) => "CircleGlass",
            Self::Glass(_) => "Glass",
            Self::SphericalLens(_) => "SphericalLens",
            Self::IdealLens(_) => "IdealLens",
            Self::Blocker(_) => "Blocker",
            Self::CircleBlocker(_) => "CircleBlocker",
            Self::Aperture(_) => "Aperture",
        }
    }
}

/// Hit of `ray` with a flat segment, normal facing the ray.
pub(crate) fn segment_hit(ray: &SimulationRay, segment: &Segment) -> Option<Intersection> {
    let (t, point) = ray_segment_intersection(ray.origin, ray.direction, segment)?;
    Intersection::new(ray, t, point, segment.normal()?)
}

/// Nearest hit of `ray` with any of `segments`.
pub(crate) fn nearest_segment_hit(
    ray: &SimulationRay,
    segments: &[Segment],
) -> Option<Intersection> {
    let (t, point, idx) = ray_segments_intersection(ray.origin, ray.direction, segments)?;
    Intersection::new(ray, t, point, segments[idx].normal()?)
}
