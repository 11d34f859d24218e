use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::geom::point::Point;

/// What the trace produces besides forward ray segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// Forward segments only.
    #[default]
    Rays,
    /// Forward segments plus backward extensions for virtual rays.
    Extended,
    /// Extended, plus real/virtual image detection.
    Images,
    /// Forward segments tagged by whether the observer sees them.
    Observer,
}

impl ViewMode {
    /// True if backward extensions are recorded for every ray.
    pub fn draws_extensions(&self) -> bool {
        matches!(self, Self::Extended | Self::Images)
    }
}

/// An eye placed in the scene, used in observer mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub position: Point,
    /// Acceptance radius around `position`.
    pub radius: f64,
}

impl Observer {
    pub fn new(position: Point, radius: f64) -> Self {
        Self { position, radius }
    }
}

/// Configuration of a single trace.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Depth cap per ray chain.
    pub max_ray_depth: usize,
    /// Rays dimmer than this (S + P) are dropped.
    pub min_brightness: f64,
    /// Scales how many discrete rays the sources emit.
    pub ray_density: f64,
    pub mode: ViewMode,
    pub observer: Option<Observer>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            max_ray_depth: 200,
            min_brightness: 0.01,
            ray_density: 0.1,
            mode: ViewMode::Rays,
            observer: None,
        }
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ray_density(mut self, ray_density: f64) -> Self {
        self.ray_density = ray_density;
        self
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_ray_depth == 0 {
            bail!("Maximum ray depth must be at least 1");
        }
        if !self.ray_density.is_finite() || self.ray_density <= 0.0 {
            bail!("Ray density must be a positive number, got {}", self.ray_density);
        }
        if !self.min_brightness.is_finite() || self.min_brightness < 0.0 {
            bail!(
                "Minimum brightness must be a non-negative number, got {}",
                self.min_brightness
            );
        }
        if let Some(observer) = &self.observer
            && (!observer.position.is_finite() || observer.radius.is_nan() || observer.radius < 0.0)
        {
            bail!("Observer must have a finite position and a non-negative radius");
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
