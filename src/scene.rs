//! Mutable scene around the engine, with a single cached trace.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::id::{ElementId, IdAllocator};
use crate::sim::element::OpticalElement;
use crate::sim::elements::ElementRecord;
use crate::sim::engine::RaySimulation;
use crate::sim::engine::config::{EngineConfig, Observer, ViewMode};
use crate::sim::engine::result::TraceResult;

/// Scene-wide settings. Grid fields are carried for editors and do not
/// affect the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneSettings {
    pub mode: ViewMode,
    pub ray_density: f64,
    pub max_ray_depth: usize,
    pub min_brightness: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub grid_size: f64,
    pub observer: Option<Observer>,
}

impl SceneSettings {
    pub fn new() -> Self {
        let engine = EngineConfig::new();
        Self {
            mode: engine.mode,
            ray_density: engine.ray_density,
            max_ray_depth: engine.max_ray_depth,
            min_brightness: engine.min_brightness,
            show_grid: false,
            snap_to_grid: false,
            grid_size: 20.0,
            observer: engine.observer,
        }
    }

    /// Engine configuration for a trace of this scene.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_ray_depth: self.max_ray_depth,
            min_brightness: self.min_brightness,
            ray_density: self.ray_density,
            mode: self.mode,
            observer: self.observer,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.engine_config().validate()?;
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            bail!("Grid size must be a positive number, got {}", self.grid_size);
        }
        Ok(())
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable state of a whole scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub settings: SceneSettings,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

#[derive(Debug)]
struct SceneElement {
    id: ElementId,
    element: Box<dyn OpticalElement>,
}

impl SceneElement {
    fn element(&self) -> &dyn OpticalElement {
        self.element.as_ref()
    }
}

/// Ordered element collection plus settings.
///
/// Holds at most one trace result. Every mutation through the scene drops it,
/// and `simulate()` only traces again when it is missing.
#[derive(Debug, Default)]
pub struct Scene {
    elements: Vec<SceneElement>,
    settings: SceneSettings,
    ids: IdAllocator,
    cache: Option<TraceResult>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SceneSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    /// Rebuilds a scene from its snapshot. Elements get fresh ids.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Result<Self> {
        let mut scene = Self::with_settings(snapshot.settings)?;
        for record in snapshot.elements {
            scene.add_boxed(record.into_element());
        }
        Ok(scene)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            settings: self.settings.clone(),
            elements: self.elements.iter().map(|e| e.element().serialize()).collect(),
        }
    }

    pub fn add<E: OpticalElement + 'static>(&mut self, element: E) -> ElementId {
        self.add_boxed(Box::new(element))
    }

    pub fn add_boxed(&mut self, element: Box<dyn OpticalElement>) -> ElementId {
        let id = self.ids.allocate();
        self.elements.push(SceneElement { id, element });
        self.invalidate();
        id
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Box<dyn OpticalElement>> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        self.invalidate();
        Some(self.elements.remove(idx).element)
    }

    pub fn get(&self, id: ElementId) -> Option<&dyn OpticalElement> {
        self.elements
            .iter()
            .find(|e| e.id == id)
            .map(SceneElement::element)
    }

    /// Mutable access to an element slot, e.g. to replace the element.
    ///
    /// Invalidates the cached result.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Box<dyn OpticalElement>> {
        let entry = self.elements.iter_mut().find(|e| e.id == id)?;
        self.cache = None;
        Some(&mut entry.element)
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &dyn OpticalElement)> {
        self.elements.iter().map(|e| (e.id, e.element()))
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Removes all elements. Settings are kept.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.invalidate();
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.settings.mode = mode;
        self.invalidate();
    }

    pub fn set_ray_density(&mut self, ray_density: f64) -> Result<()> {
        if !ray_density.is_finite() || ray_density <= 0.0 {
            bail!("Ray density must be a positive number, got {}", ray_density);
        }
        self.settings.ray_density = ray_density;
        self.invalidate();
        Ok(())
    }

    pub fn set_max_ray_depth(&mut self, max_ray_depth: usize) -> Result<()> {
        if max_ray_depth == 0 {
            bail!("Maximum ray depth must be at least 1");
        }
        self.settings.max_ray_depth = max_ray_depth;
        self.invalidate();
        Ok(())
    }

    pub fn set_min_brightness(&mut self, min_brightness: f64) -> Result<()> {
        if !min_brightness.is_finite() || min_brightness < 0.0 {
            bail!(
                "Minimum brightness must be a non-negative number, got {}",
                min_brightness
            );
        }
        self.settings.min_brightness = min_brightness;
        self.invalidate();
        Ok(())
    }

    pub fn set_grid(&mut self, show_grid: bool, snap_to_grid: bool, grid_size: f64) -> Result<()> {
        if !grid_size.is_finite() || grid_size <= 0.0 {
            bail!("Grid size must be a positive number, got {}", grid_size);
        }
        self.settings.show_grid = show_grid;
        self.settings.snap_to_grid = snap_to_grid;
        self.settings.grid_size = grid_size;
        self.invalidate();
        Ok(())
    }

    /// Places the observer and switches to observer mode.
    pub fn set_observer(&mut self, observer: Observer) {
        self.settings.observer = Some(observer);
        self.settings.mode = ViewMode::Observer;
        self.invalidate();
    }

    /// Removes the observer. Observer mode falls back to rays mode; any other
    /// mode is left alone.
    pub fn clear_observer(&mut self) {
        self.settings.observer = None;
        if self.settings.mode == ViewMode::Observer {
            self.settings.mode = ViewMode::Rays;
        }
        self.invalidate();
    }

    /// Drops the cached trace. Call after mutating elements outside the scene.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.is_none()
    }

    /// Result of tracing the scene, recomputed only if the scene changed.
    pub fn simulate(&mut self) -> Result<&TraceResult> {
        let result = match self.cache.take() {
            Some(cached) => {
                log::debug!("Scene unchanged, reusing cached trace");
                cached
            }
            None => {
                let mut elements: Vec<&dyn OpticalElement> =
                    Vec::with_capacity(self.elements.len());
                for entry in &self.elements {
                    elements.push(entry.element());
                }
                RaySimulation::new(elements, self.settings.engine_config())?.run()
            }
        };
        Ok(self.cache.insert(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point::Point;
    use crate::sim::elements::mirrors::SegmentMirror;
    use crate::sim::elements::sources::{PointSource, SingleRaySource};

    fn ray_scene() -> (Scene, ElementId, ElementId) {
        let mut scene = Scene::new();
        let source = scene.add(SingleRaySource::new(Point::new(0., 0.), Point::new(0., 1.)));
        let mirror = scene.add(SegmentMirror::new(Point::new(-10., 10.), Point::new(10., 10.)));
        (scene, source, mirror)
    }

    #[test]
    fn test_add_get_remove() {
        let (mut scene, source, mirror) = ray_scene();
        assert_eq!(scene.len(), 2);
        assert_ne!(source, mirror);
        assert!(scene.get(mirror).is_some());
        assert!(scene.remove(mirror).is_some());
        assert!(scene.get(mirror).is_none());
        assert!(scene.remove(mirror).is_none());
        assert_eq!(scene.ids(), vec![source]);
        // Ids are not reused
        let again = scene.add(SegmentMirror::new(Point::new(0., 5.), Point::new(1., 5.)));
        assert_ne!(again, mirror);
    }

    #[test]
    fn test_ids_are_scoped_per_scene() {
        let (a, ..) = ray_scene();
        let (b, ..) = ray_scene();
        assert_eq!(a.ids(), b.ids());
    }

    #[test]
    fn test_simulate_is_cached_until_mutation() -> Result<()> {
        let (mut scene, _, mirror) = ray_scene();
        assert!(scene.is_dirty());
        let first = scene.simulate()?.clone();
        assert!(!scene.is_dirty());
        let second = scene.simulate()?.clone();
        assert_eq!(first, second);
        assert_eq!(first.segments.len(), 2);

        scene.remove(mirror);
        assert!(scene.is_dirty());
        let third = scene.simulate()?;
        assert_eq!(third.segments.len(), 1);
        Ok(())
    }

    #[test]
    fn test_get_mut_invalidates() -> Result<()> {
        let (mut scene, _, mirror) = ray_scene();
        scene.simulate()?;
        let slot = scene.get_mut(mirror).unwrap();
        *slot = Box::new(SegmentMirror::new(Point::new(-10., 20.), Point::new(10., 20.)));
        assert!(scene.is_dirty());
        let result = scene.simulate()?;
        assert!(result.segments[0].p2.is_close_tol(&Point::new(0., 20.), 1e-9));
        Ok(())
    }

    #[test]
    fn test_settings_mutators() -> Result<()> {
        let mut scene = Scene::new();
        scene.simulate()?;
        scene.set_ray_density(0.5)?;
        assert!(scene.is_dirty());
        assert!(scene.set_ray_density(0.0).is_err());
        assert!(scene.set_max_ray_depth(0).is_err());
        assert!(scene.set_min_brightness(-0.1).is_err());
        assert!(scene.set_grid(true, true, 0.0).is_err());
        scene.set_grid(true, false, 10.0)?;
        assert_eq!(scene.settings().ray_density, 0.5);
        assert!(scene.settings().show_grid);
        assert_eq!(scene.settings().grid_size, 10.0);
        Ok(())
    }

    #[test]
    fn test_observer_setter_and_clearer() {
        let mut scene = Scene::new();
        scene.set_observer(Observer::new(Point::new(1., 1.), 2.));
        assert_eq!(scene.settings().mode, ViewMode::Observer);
        scene.clear_observer();
        assert_eq!(scene.settings().mode, ViewMode::Rays);
        assert!(scene.settings().observer.is_none());

        scene.set_observer(Observer::new(Point::new(1., 1.), 2.));
        scene.set_mode(ViewMode::Images);
        scene.clear_observer();
        assert_eq!(scene.settings().mode, ViewMode::Images);
    }

    #[test]
    fn test_clear_keeps_settings() -> Result<()> {
        let (mut scene, ..) = ray_scene();
        scene.set_mode(ViewMode::Extended);
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.settings().mode, ViewMode::Extended);
        assert!(scene.simulate()?.segments.is_empty());
        Ok(())
    }

    #[test]
    fn test_snapshot_round_trip() -> Result<()> {
        let (mut scene, ..) = ray_scene();
        scene.add(PointSource::new(Point::new(5., 5.)).with_brightness(0.25));
        scene.set_mode(ViewMode::Images);
        let snapshot = scene.snapshot();
        assert_eq!(snapshot.elements.len(), 3);
        assert_eq!(snapshot.elements[1].type_name(), "Mirror");

        let mut rebuilt = Scene::from_snapshot(snapshot.clone())?;
        assert_eq!(rebuilt.snapshot(), snapshot);
        assert_eq!(rebuilt.simulate()?.clone(), scene.simulate()?.clone());
        Ok(())
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"mode": "extended", "rayDensity": 0.3, "gridSize": 15}"#;
        let settings: SceneSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.mode, ViewMode::Extended);
        assert_eq!(settings.ray_density, 0.3);
        assert_eq!(settings.max_ray_depth, 200);
        assert_eq!(settings.grid_size, 15.0);
        assert!(!settings.snap_to_grid);
    }

    #[test]
    fn test_invalid_snapshot_settings_are_rejected() {
        let snapshot = SceneSnapshot {
            settings: SceneSettings {
                ray_density: -1.0,
                ..SceneSettings::default()
            },
            elements: Vec::new(),
        };
        assert!(Scene::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_snapshot_with_zero_depth_is_rejected() {
        let json = r#"{"settings": {"maxRayDepth": 0}, "elements": []}"#;
        let snapshot: SceneSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.settings.max_ray_depth, 0);
        assert!(Scene::from_snapshot(snapshot).is_err());
    }
}
