use std::path::Path;

use anyhow::Result;
use optics2d::io::{read_scene, write_scene};
use optics2d::{
    Beam, HalfPlaneGlass, IdealLens, ImageType, LineBlocker, Point, PointSource, Scene,
    SegmentMirror, ViewMode,
};

/// Lens imaging a point source, with a mirror folding part of the light back.
fn demo_scene() -> Result<Scene> {
    let mut scene = Scene::new();
    scene.add(PointSource::new(Point::new(-100., 10.)).with_brightness(0.5));
    scene.add(IdealLens::new(Point::new(0., -60.), Point::new(0., 60.), 50.));
    scene.add(Beam::new(Point::new(-150., -100.), Point::new(-150., -80.)));
    scene.add(SegmentMirror::new(Point::new(150., -120.), Point::new(170., -60.)));
    scene.add(HalfPlaneGlass::new(Point::new(300., 200.), Point::new(300., -200.), 1.5));
    scene.add(LineBlocker::new(Point::new(-200., 150.), Point::new(400., 150.)));
    scene.set_mode(ViewMode::Images);
    scene.set_ray_density(0.5)?;
    Ok(scene)
}

fn main() -> Result<()> {
    env_logger::init();

    // Usage: optics2d [scene.json] [--save out.json]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut scene = match args.first().filter(|a| !a.starts_with("--")) {
        Some(path) => read_scene(Path::new(path))?,
        None => demo_scene()?,
    };
    if let Some(pos) = args.iter().position(|a| a == "--save")
        && let Some(out) = args.get(pos + 1)
    {
        write_scene(Path::new(out), &scene)?;
        println!("Scene written to {}", out);
    }

    let elements = scene.len();
    let mode = scene.settings().mode;
    let result = scene.simulate()?;

    println!("Elements:        {}", elements);
    println!("Mode:            {:?}", mode);
    println!("Emitted rays:    {}", result.rays.len());
    println!("Segments:        {}", result.forward_segments().count());
    println!("Extensions:      {}", result.extension_segments().count());
    println!("Observed:        {}", result.observed_segments().count());
    println!("Truncation:      {:.4}", result.truncation_error);
    for image in &result.images {
        let kind = match image.image_type {
            ImageType::Real => "real",
            ImageType::Virtual => "virtual",
            ImageType::VirtualObject => "virtual object",
        };
        println!(
            "Image ({}):  {:.1}  brightness {:.3}",
            kind, image.position, image.brightness
        );
    }
    Ok(())
}
