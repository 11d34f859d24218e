use serde::{Deserialize, Serialize};

use crate::geom::point::Point;
use crate::geom::vector::Vector;
use crate::sim::ray::SimulationRay;

/// A drawable piece of a ray path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracedSegment {
    pub p1: Point,
    pub p2: Point,
    /// Combined S + P brightness.
    pub brightness: f64,
    pub wavelength: Option<f64>,
    /// Non-physical backward extension (virtual ray).
    pub is_extension: bool,
    /// Reaches the configured observer.
    pub is_observed: bool,
}

impl TracedSegment {
    /// Forward segment of `ray` from its origin to `end`.
    pub fn forward(ray: &SimulationRay, end: Point) -> Self {
        Self {
            p1: ray.origin,
            p2: end,
            brightness: ray.brightness(),
            wavelength: ray.wavelength,
            is_extension: false,
            is_observed: false,
        }
    }

    /// Backward extension of `ray` from its origin over `length`.
    pub fn extension(ray: &SimulationRay, length: f64) -> Self {
        Self {
            p1: ray.origin,
            p2: ray.origin - ray.direction * length,
            brightness: ray.brightness(),
            wavelength: ray.wavelength,
            is_extension: true,
            is_observed: false,
        }
    }

    pub fn vector(&self) -> Vector {
        self.p2 - self.p1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageType {
    /// Forward rays actually converge here.
    Real,
    /// Backward extensions appear to converge here.
    Virtual,
    /// Forward rays were heading here but got intercepted first.
    VirtualObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedImage {
    pub position: Point,
    pub image_type: ImageType,
    pub brightness: f64,
}

/// Output of a trace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    pub segments: Vec<TracedSegment>,
    /// Rays as initially emitted by the sources.
    pub rays: Vec<SimulationRay>,
    pub images: Vec<DetectedImage>,
    /// Total brightness discarded by depth and brightness cut-offs.
    pub truncation_error: f64,
}

impl TraceResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward_segments(&self) -> impl Iterator<Item = &TracedSegment> {
        self.segments.iter().filter(|s| !s.is_extension)
    }

    pub fn extension_segments(&self) -> impl Iterator<Item = &TracedSegment> {
        self.segments.iter().filter(|s| s.is_extension)
    }

    pub fn observed_segments(&self) -> impl Iterator<Item = &TracedSegment> {
        self.segments.iter().filter(|s| s.is_observed)
    }
}
