use anyhow::Result;
use optics2d::{
    ArcMirror, Beam, BeamSplitter, CircleBlocker, CircleGlass, HalfPlaneGlass, IdealLens,
    IdealMirror, ImageType, OpticalElement, ParabolicMirror, Point, PointSource, PolygonGlass,
    Scene, SegmentMirror, SimulationRay, SingleRaySource, SphericalLens, Vector, ViewMode,
};

const TOL: f64 = 1e-9;

#[test]
fn point_source_in_empty_scene_escapes() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(PointSource::new(Point::new(0., 0.)).with_brightness(0.5));
    scene.set_ray_density(1.0)?;
    let result = scene.simulate()?;

    assert_eq!(result.rays.len(), 500);
    assert_eq!(result.segments.len(), 500);
    for segment in &result.segments {
        assert!((segment.p1.distance(&segment.p2) - 10000.).abs() < 1e-6);
        assert!((segment.brightness - 0.5).abs() < 1e-12);
        assert!(!segment.is_extension);
    }
    assert_eq!(result.truncation_error, 0.0);
    Ok(())
}

#[test]
fn single_ray_reflects_off_flat_mirror() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(SegmentMirror::new(Point::new(-10., 10.), Point::new(10., 10.)));
    scene.add(SingleRaySource::new(Point::new(0., 0.), Point::new(0., 20.)));
    let result = scene.simulate()?;

    assert_eq!(result.segments.len(), 2);
    let hit = result.segments[0];
    assert!(hit.p2.is_close_tol(&Point::new(0., 10.), TOL));
    let out = result.segments[1];
    assert!(out.p1.is_close_tol(&Point::new(0., 10.), TOL));
    let direction = out.vector().normalize().unwrap();
    assert!((direction - Vector::new(0., -1.)).length() < TOL);
    Ok(())
}

#[test]
fn reflected_ray_does_not_rehit_mirror_at_its_origin() {
    let mirror = SegmentMirror::new(Point::new(0., 0.), Point::new(10., 0.));
    let incoming = SimulationRay::from_points(Point::new(2., 3.), Point::new(5., 0.), 1.0).unwrap();
    let hit = mirror.check_ray_intersection(&incoming).unwrap();
    assert!(hit.point.is_close_tol(&Point::new(5., 0.), TOL));

    let reflected = mirror.on_ray_incident(&incoming, &hit).outgoing_ray.unwrap();
    assert!(reflected.origin.is_close_tol(&Point::new(5., 0.), TOL));
    assert!(mirror.check_ray_intersection(&reflected).is_none());
}

#[test]
fn flat_mirror_angle_in_equals_angle_out() {
    let mirror = SegmentMirror::new(Point::new(-50., 0.), Point::new(50., 0.));
    for degrees in [5.0_f64, 20.0, 45.0, 70.0, 85.0] {
        let theta = degrees.to_radians();
        let origin = Point::new(-10. * theta.tan(), 10.);
        let direction = Vector::new(theta.sin(), -theta.cos());
        let incoming = SimulationRay::new(origin, direction, 1.0).unwrap();
        let hit = mirror.check_ray_intersection(&incoming).unwrap();
        let out = mirror.on_ray_incident(&incoming, &hit).outgoing_ray.unwrap();

        let angle_in = (-incoming.direction.dot(&hit.normal)).acos();
        let angle_out = out.direction.dot(&hit.normal).acos();
        assert!((angle_in - angle_out).abs() < 1e-9, "{degrees} degrees");
        assert!((angle_in - theta).abs() < 1e-9);
        // Leaves on the opposite side of the normal
        assert!(out.point_at(1.0).x > hit.point.x);
    }
}

#[test]
fn normal_incidence_on_half_plane_glass() -> Result<()> {
    let mut scene = Scene::new();
    // Glass on the lower side of the boundary
    scene.add(HalfPlaneGlass::new(Point::new(10., 0.), Point::new(-10., 0.), 1.5));
    scene.add(SingleRaySource::new(Point::new(0., 10.), Point::new(0., 0.)));
    let result = scene.simulate()?;

    let r = ((1.0_f64 - 1.5) / (1.0 + 1.5)).powi(2);
    // Incoming, refracted (escapes downwards) and partially reflected (escapes upwards)
    assert_eq!(result.segments.len(), 3);
    let refracted = result.segments[1];
    assert!(refracted.p1.is_close_tol(&Point::new(0., 0.), TOL));
    assert!(refracted.p2.x.abs() < 1e-6 && refracted.p2.y < -9999.);
    assert!((refracted.brightness - (1. - r)).abs() < 1e-12);
    let reflected = result.segments[2];
    assert!(reflected.p2.y > 9999.);
    assert!((reflected.brightness - r).abs() < 1e-12);
    Ok(())
}

#[test]
fn crossing_rays_form_one_real_image() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(
        SingleRaySource::new(Point::new(0., 0.), Point::new(100., 100.)).with_brightness(0.4),
    );
    scene.add(
        SingleRaySource::new(Point::new(100., 0.), Point::new(0., 100.)).with_brightness(0.8),
    );
    scene.set_mode(ViewMode::Images);
    let result = scene.simulate()?;

    assert_eq!(result.extension_segments().count(), 2);
    assert_eq!(result.images.len(), 1);
    let image = result.images[0];
    assert_eq!(image.image_type, ImageType::Real);
    assert!(image.position.is_close_tol(&Point::new(50., 50.), 1e-6));
    assert!((image.brightness - 0.6).abs() < 1e-12);
    Ok(())
}

#[test]
fn diverging_lens_forms_virtual_image() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(Beam::new(Point::new(-50., 10.), Point::new(-50., -10.)).with_brightness(0.2));
    scene.add(IdealLens::new(Point::new(0., -30.), Point::new(0., 30.), -40.));
    scene.set_ray_density(0.2)?;
    scene.set_mode(ViewMode::Images);
    let result = scene.simulate()?;

    let virtual_images: Vec<_> = result
        .images
        .iter()
        .filter(|i| i.image_type == ImageType::Virtual)
        .collect();
    assert!(!virtual_images.is_empty());
    // The refracted extensions all meet at the virtual focus
    assert!(
        virtual_images
            .iter()
            .any(|i| i.position.is_close_tol(&Point::new(-40., 0.), 1e-6))
    );
    Ok(())
}

#[test]
fn dim_ray_is_dropped_and_counted() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(SingleRaySource::new(Point::new(0., 0.), Point::new(1., 0.)).with_brightness(0.005));
    let result = scene.simulate()?;
    assert!(result.segments.is_empty());
    assert!((result.truncation_error - 0.005).abs() < 1e-12);
    Ok(())
}

#[test]
fn simulate_twice_is_idempotent() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(PointSource::new(Point::new(0., 0.)));
    scene.add(CircleGlass::new(Point::new(30., 0.), Point::new(40., 0.), 1.5));
    scene.add(ArcMirror::new(Point::new(-40., -30.), Point::new(-40., 30.), Point::new(-60., 0.)));
    scene.set_mode(ViewMode::Images);
    let first = scene.simulate()?.clone();
    let second = scene.simulate()?.clone();
    assert_eq!(first, second);
    assert!(!first.segments.is_empty());
    Ok(())
}

#[test]
fn depth_cap_bounds_a_mirror_cavity() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(SegmentMirror::new(Point::new(-10., 10.), Point::new(10., 10.)));
    scene.add(SegmentMirror::new(Point::new(-10., -10.), Point::new(10., -10.)));
    scene.add(SingleRaySource::new(Point::new(0., 0.), Point::new(0., 1.)));
    scene.set_max_ray_depth(50)?;
    let result = scene.simulate()?;
    assert_eq!(result.segments.len(), 50);
    assert!((result.truncation_error - 1.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn observer_sees_rays_passing_nearby() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(PointSource::new(Point::new(0., 0.)));
    scene.add(CircleBlocker::new(Point::new(0., 100.), Point::new(0., 110.)));
    scene.set_observer(optics2d::Observer::new(Point::new(50., 0.), 5.));
    let result = scene.simulate()?;
    let observed: Vec<_> = result.observed_segments().filter(|s| !s.is_extension).collect();
    assert!(!observed.is_empty());
    for segment in observed {
        let direction = segment.vector().normalize().unwrap();
        // Only rays heading roughly along +x reach the observer
        assert!(direction.dx > 0.99);
    }
    Ok(())
}

/// Brightness never increases along a branch, and never goes negative.
#[test]
fn interactions_never_create_energy() {
    let p = |x: f64, y: f64| Point::new(x, y);
    let elements: Vec<Box<dyn OpticalElement>> = vec![
        Box::new(SegmentMirror::new(p(-20., 20.), p(20., 25.))),
        Box::new(ArcMirror::new(p(-20., 20.), p(20., 20.), p(0., 30.))),
        Box::new(ParabolicMirror::new(p(-20., 20.), p(20., 20.), p(0., 30.))),
        Box::new(IdealMirror::new(p(-20., 20.), p(20., 20.), 15.)),
        Box::new(BeamSplitter::new(p(-20., 20.), p(20., 20.), 0.35)),
        Box::new(HalfPlaneGlass::new(p(20., 20.), p(-20., 20.), 1.7)),
        Box::new(CircleGlass::new(p(0., 30.), p(0., 20.), 1.5)),
        Box::new(PolygonGlass::new(vec![p(-20., 20.), p(20., 20.), p(0., 40.)], 1.9)),
        Box::new(SphericalLens::new(p(0., 20.), p(0., 26.), 40., Some(30.), Some(-30.))),
        Box::new(IdealLens::new(p(-20., 20.), p(20., 20.), -10.)),
    ];

    for element in &elements {
        for k in 0..24 {
            let angle = -1.2 + 0.1 * k as f64;
            let mut pending = vec![
                SimulationRay::new(p(0., 0.), Vector::from_angle(angle * 0.5), 1.0).unwrap(),
            ];
            // Follow the branches through a few interactions with the same element
            for _ in 0..6 {
                let mut next = Vec::new();
                for ray in pending {
                    let Some(hit) = element.check_ray_intersection(&ray) else {
                        continue;
                    };
                    let interaction = element.on_ray_incident(&ray, &hit);
                    let children: Vec<SimulationRay> = interaction
                        .outgoing_ray
                        .into_iter()
                        .chain(interaction.new_rays)
                        .collect();
                    let total: f64 = children.iter().map(|c| c.brightness()).sum();
                    assert!(total <= ray.brightness() + 1e-12, "{element:?}");
                    for child in &children {
                        assert!(child.brightness_s >= 0.0 && child.brightness_p >= 0.0);
                    }
                    next.extend(children);
                }
                pending = next;
            }
        }
    }
}

#[test]
fn huge_ray_density_traces_without_overflow() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(Beam::new(Point::new(0., 0.), Point::new(100., 0.)));
    scene.add(PointSource::new(Point::new(0., -50.)));
    scene.set_ray_density(1e18)?;
    let result = scene.simulate()?;
    assert_eq!(result.rays.len(), 2 * optics2d::sim::elements::sources::MAX_RAYS_PER_SOURCE);
    // Every ray is far below the brightness floor
    assert!(result.segments.is_empty());
    Ok(())
}
