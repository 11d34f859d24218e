//! JSON scene format.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};

use crate::scene::{Scene, SceneSnapshot};

/// Writes a scene snapshot to a JSON file.
///
/// # Example
/// ```no_run
/// use optics2d::io::write_scene;
/// use optics2d::{Point, PointSource, Scene};
/// use std::path::Path;
///
/// let mut scene = Scene::new();
/// scene.add(PointSource::new(Point::new(0., 0.)));
/// write_scene(Path::new("scene.json"), &scene).unwrap();
/// ```
pub fn write_scene(path: &Path, scene: &Scene) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &scene.snapshot())
        .with_context(|| format!("Failed to serialize scene to: {}", path.display()))?;

    Ok(())
}

/// Reads a scene from a JSON file.
///
/// Settings are validated; elements get fresh ids in file order.
pub fn read_scene(path: &Path) -> Result<Scene> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let snapshot: SceneSnapshot = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize scene from: {}", path.display()))?;
    log::debug!(
        "Loaded {} elements from {}",
        snapshot.elements.len(),
        path.display()
    );

    Scene::from_snapshot(snapshot)
        .with_context(|| format!("Invalid scene settings in: {}", path.display()))
}

/// Serializes a scene to a JSON string.
pub fn to_json_string(scene: &Scene) -> Result<String> {
    serde_json::to_string_pretty(&scene.snapshot()).context("Failed to serialize scene to string")
}

/// Deserializes a scene from a JSON string.
pub fn from_json_str(json: &str) -> Result<Scene> {
    let snapshot: SceneSnapshot =
        serde_json::from_str(json).context("Failed to deserialize scene from string")?;
    Scene::from_snapshot(snapshot)
}
