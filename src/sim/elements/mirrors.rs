//! Reflective elements.

use serde::{Deserialize, Serialize};

use crate::geom::EPS;
use crate::geom::circle::Arc;
use crate::geom::optics::reflect;
use crate::geom::point::Point;
use crate::geom::ray::ray_arc_intersection;
use crate::geom::segment::Segment;
use crate::geom::vector::Vector;
use crate::sim::element::{Category, Intersection, OpticalElement, RayInteraction};
use crate::sim::elements::{ElementRecord, nearest_segment_hit, segment_hit};
use crate::sim::ray::SimulationRay;

/// Number of straight pieces approximating a parabolic mirror.
pub const PARABOLA_SEGMENTS: usize = 80;

/// Specular reflection at `hit`, same intensities.
fn specular(ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
    RayInteraction::outgoing(ray.redirected(hit.point, reflect(ray.direction, hit.normal)))
}

/// Flat mirror along `p1`-`p2`, reflective on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentMirror {
    pub p1: Point,
    pub p2: Point,
}

impl SegmentMirror {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn segment(&self) -> Segment {
        Segment::new(self.p1, self.p2)
    }
}

impl OpticalElement for SegmentMirror {
    fn category(&self) -> Category {
        Category::Mirror
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        segment_hit(ray, &self.segment())
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        specular(ray, hit)
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::Mirror(self.clone())
    }
}

/// Circular arc mirror from `p1` to `p2` passing through `p3`.
///
/// Collinear points degrade to a flat mirror `p1`-`p2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcMirror {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl ArcMirror {
    pub fn new(p1: Point, p2: Point, p3: Point) -> Self {
        Self { p1, p2, p3 }
    }

    pub fn arc(&self) -> Option<Arc> {
        Arc::from_3_points(self.p1, self.p2, self.p3)
    }
}

impl OpticalElement for ArcMirror {
    fn category(&self) -> Category {
        Category::Mirror
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        match self.arc() {
            Some(arc) => {
                let (t, point) = ray_arc_intersection(ray.origin, ray.direction, &arc)?;
                Intersection::new(ray, t, point, point - arc.circle.center)
            }
            None => segment_hit(ray, &Segment::new(self.p1, self.p2)),
        }
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        specular(ray, hit)
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::ArcMirror(self.clone())
    }
}

/// Parabolic mirror with end points `p1` and `p2` and vertex `p3`.
///
/// The parabola's axis is perpendicular to the chord `p1`-`p2`; `p3` only
/// sets the depth (its distance from the chord).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParabolaPoints", into = "ParabolaPoints")]
pub struct ParabolicMirror {
    points: ParabolaPoints,
    segments: Vec<Segment>,
}

/// Defining points of a parabolic mirror, as written to scene files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ParabolaPoints {
    p1: Point,
    p2: Point,
    p3: Point,
}

impl From<ParabolaPoints> for ParabolicMirror {
    fn from(points: ParabolaPoints) -> Self {
        Self {
            points,
            segments: points.segments(),
        }
    }
}

impl From<ParabolicMirror> for ParabolaPoints {
    fn from(mirror: ParabolicMirror) -> Self {
        mirror.points
    }
}

impl ParabolaPoints {
    fn segments(&self) -> Vec<Segment> {
        let chord = Segment::new(self.p1, self.p2);
        let (Some(u_axis), Some(v_axis)) = (chord.direction(), chord.normal()) else {
            return Vec::new();
        };
        let half = 0.5 * chord.length();
        let mid = chord.midpoint();
        let sagitta = (self.p3 - mid).dot(&v_axis);

        let points: Vec<Point> = (0..=PARABOLA_SEGMENTS)
            .map(|k| {
                let u = -half + 2.0 * half * k as f64 / PARABOLA_SEGMENTS as f64;
                let v = sagitta * (1.0 - (u / half).powi(2));
                mid + u_axis * u + v_axis * v
            })
            .collect();
        points.windows(2).map(|w| Segment::new(w[0], w[1])).collect()
    }
}

impl ParabolicMirror {
    pub fn new(p1: Point, p2: Point, p3: Point) -> Self {
        ParabolaPoints { p1, p2, p3 }.into()
    }

    /// Piecewise-linear approximation of the curve, `p1` to `p2`.
    ///
    /// Built once with the mirror. Empty when `p1 == p2`.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl OpticalElement for ParabolicMirror {
    fn category(&self) -> Category {
        Category::Mirror
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        nearest_segment_hit(ray, &self.segments)
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        specular(ray, hit)
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::ParabolicMirror(self.clone())
    }
}

/// Direction after a thin ideal element along `segment` with focal length `f`.
///
/// The incoming direction is split into a component `a` along the element and
/// `b` across it. The slope `a / |b|` changes by `-h / f`, where `h` is the
/// signed hit height from the element's midpoint. `transmit` keeps the side of
/// travel (lens), otherwise the ray comes back (mirror).
///
/// Returns `None` for a ray grazing the element.
pub(crate) fn ideal_deflection(
    segment: &Segment,
    focal_length: f64,
    direction: Vector,
    point: Point,
    transmit: bool,
) -> Option<Vector> {
    let t_axis = segment.direction()?;
    let n_axis = t_axis.perp();
    let a = direction.dot(&t_axis);
    let b = direction.dot(&n_axis);
    if b.abs() < EPS {
        return None;
    }
    let h = (point - segment.midpoint()).dot(&t_axis);
    let bend = if focal_length.is_finite() && focal_length.abs() > EPS {
        h / focal_length
    } else {
        0.0
    };
    let slope = a / b.abs() - bend;
    let across = if transmit { b.signum() } else { -b.signum() };
    Some(t_axis * slope + n_axis * across)
}

/// Thin ideal curved mirror. Positive focal length converges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealMirror {
    pub p1: Point,
    pub p2: Point,
    pub focal_length: f64,
}

impl IdealMirror {
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

impl OpticalElement for IdealMirror {
    fn category(&self) -> Category {
        Category::Mirror
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        segment_hit(ray, &self.segment())
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        let deflected =
            ideal_deflection(&self.segment(), self.focal_length, ray.direction, hit.point, false);
        match deflected {
            Some(direction) => RayInteraction::outgoing(ray.redirected(hit.point, direction)),
            None => RayInteraction::pass_through(ray, hit),
        }
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::IdealMirror(self.clone())
    }
}

fn default_trans_ratio() -> f64 {
    0.5
}

/// Partially reflective flat mirror.
///
/// `trans_ratio` of the intensity passes through undeviated; the rest is
/// reflected as a new, visually disconnected chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamSplitter {
    pub p1: Point,
    pub p2: Point,
    #[serde(default = "default_trans_ratio")]
    pub trans_ratio: f64,
}

impl BeamSplitter {
    pub fn new(p1: Point, p2: Point, trans_ratio: f64) -> Self {
        Self {
            p1,
            p2,
            trans_ratio,
        }
    }
}

impl OpticalElement for BeamSplitter {
    fn category(&self) -> Category {
        Category::Mirror
    }

    fn check_ray_intersection(&self, ray: &SimulationRay) -> Option<Intersection> {
        segment_hit(ray, &Segment::new(self.p1, self.p2))
    }

    fn on_ray_incident(&self, ray: &SimulationRay, hit: &Intersection) -> RayInteraction {
        let ratio = self.trans_ratio.clamp(0.0, 1.0);
        let transmitted = ray
            .redirected(hit.point, ray.direction)
            .map(|r| r.scaled(ratio, ratio));
        let mut interaction = RayInteraction::outgoing(transmitted);
        if let Some(reflected) = ray.redirected(hit.point, reflect(ray.direction, hit.normal)) {
            let rest = 1.0 - ratio;
            interaction = interaction.with_new_ray(reflected.scaled(rest, rest).with_gap(true));
        }
        interaction
    }

    fn serialize(&self) -> ElementRecord {
        ElementRecord::BeamSplitter(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(ox: f64, oy: f64, dx: f64, dy: f64) -> SimulationRay {
        SimulationRay::new(Point::new(ox, oy), Vector::new(dx, dy), 1.0).unwrap()
    }

    fn bounce(element: &dyn OpticalElement, r: &SimulationRay) -> (Intersection, SimulationRay) {
        let hit = element.check_ray_intersection(r).unwrap();
        let out = element.on_ray_incident(r, &hit).outgoing_ray.unwrap();
        (hit, out)
    }

    #[test]
    fn test_flat_mirror_reflection() {
        let mirror = SegmentMirror::new(Point::new(-10., 10.), Point::new(10., 10.));
        let (hit, out) = bounce(&mirror, &ray(0., 0., 0., 1.));
        assert!(hit.point.is_close_tol(&Point::new(0., 10.), 1e-12));
        assert!((hit.t - 10.).abs() < 1e-12);
        assert!(out.direction.is_close(&Vector::new(0., -1.)));
        assert!(!out.is_new);
        assert!((out.brightness() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_mirror_angle_of_incidence() {
        let mirror = SegmentMirror::new(Point::new(-10., 0.), Point::new(10., 0.));
        let incoming = ray(-5., 5., 1., -1.);
        let (hit, out) = bounce(&mirror, &incoming);
        let cos_in = -incoming.direction.dot(&hit.normal);
        let cos_out = out.direction.dot(&hit.normal);
        assert!((cos_in - cos_out).abs() < 1e-12);
        assert!((out.direction.dx - incoming.direction.dx).abs() < 1e-12);
    }

    #[test]
    fn test_reflected_ray_does_not_rehit_mirror() {
        let mirror = SegmentMirror::new(Point::new(0., -10.), Point::new(0., 10.));
        let (_, out) = bounce(&mirror, &ray(-10., 0., 1., 0.));
        assert!(out.origin.is_close_tol(&Point::new(0., 0.), 1e-12));
        assert!(mirror.check_ray_intersection(&out).is_none());
    }

    #[test]
    fn test_mirror_misses_outside_segment() {
        let mirror = SegmentMirror::new(Point::new(-1., 10.), Point::new(1., 10.));
        assert!(mirror.check_ray_intersection(&ray(5., 0., 0., 1.)).is_none());
        assert!(mirror.check_ray_intersection(&ray(0., 0., 0., -1.)).is_none());
    }

    #[test]
    fn test_arc_mirror_semicircle_retroreflects_radial_ray() {
        // Upper half of the unit-10 circle
        let mirror = ArcMirror::new(Point::new(-10., 0.), Point::new(10., 0.), Point::new(0., 10.));
        let (hit, out) = bounce(&mirror, &ray(0., 0., 0., 1.));
        assert!(hit.point.is_close_tol(&Point::new(0., 10.), 1e-9));
        assert!((out.direction - Vector::new(0., -1.)).length() < 1e-9);
        // Lower half is not part of the arc
        assert!(mirror.check_ray_intersection(&ray(0., 0., 0., -1.)).is_none());
    }

    #[test]
    fn test_arc_mirror_reflex_arc() {
        // Three quarters of the circle, missing the lower-right quadrant
        let mirror =
            ArcMirror::new(Point::new(0., -10.), Point::new(10., 0.), Point::new(-10., 0.));
        assert!(mirror.check_ray_intersection(&ray(0., 0., 0., -1.)).is_some());
        assert!(mirror.check_ray_intersection(&ray(0., 0., -1., 0.)).is_some());
        assert!(mirror.check_ray_intersection(&ray(0., 0., 1., -1.)).is_none());
    }

    #[test]
    fn test_arc_mirror_near_half_circle() {
        let on_circle = |deg: f64| {
            let a = deg.to_radians();
            Point::new(10. * a.cos(), 10. * a.sin())
        };
        let top = Point::new(0., 10.);
        let wide = ArcMirror::new(on_circle(-0.5), on_circle(180.5), top);
        let narrow = ArcMirror::new(on_circle(0.5), on_circle(179.5), top);
        let east = ray(0., 0., 1., 0.);
        let south = ray(0., 0., 0., -1.);

        assert!(wide.check_ray_intersection(&east).is_some());
        assert!(narrow.check_ray_intersection(&east).is_none());
        assert!(wide.check_ray_intersection(&south).is_none());
        assert!(narrow.check_ray_intersection(&south).is_none());
        assert!(narrow.check_ray_intersection(&ray(0., 0., 0., 1.)).is_some());
    }

    #[test]
    fn test_arc_mirror_collinear_falls_back_to_segment() {
        let mirror = ArcMirror::new(Point::new(-10., 5.), Point::new(10., 5.), Point::new(0., 5.));
        assert!(mirror.arc().is_none());
        let (hit, out) = bounce(&mirror, &ray(0., 0., 0., 1.));
        assert!(hit.point.is_close_tol(&Point::new(0., 5.), 1e-12));
        assert!(out.direction.is_close(&Vector::new(0., -1.)));
    }

    #[test]
    fn test_parabolic_mirror_focuses_axial_rays() {
        // y = 10 - x^2 / 40 => focus at distance 10 below the vertex (0, 10)
        let mirror =
            ParabolicMirror::new(Point::new(20., 0.), Point::new(-20., 0.), Point::new(0., 10.));
        let segments = mirror.segments();
        assert_eq!(segments.len(), PARABOLA_SEGMENTS);
        assert!(segments[0].p1.is_close_tol(&Point::new(20., 0.), 1e-9));
        assert!(segments[PARABOLA_SEGMENTS - 1].p2.is_close_tol(&Point::new(-20., 0.), 1e-9));

        let (_, out) = bounce(&mirror, &ray(4.25, -5., 0., 1.));
        // Hit at a segment midpoint, where the chord slope equals the tangent slope
        let t = -out.origin.x / out.direction.dx;
        let crossing = out.point_at(t);
        assert!((crossing.y - 0.0).abs() < 0.2);
    }

    #[test]
    fn test_parabolic_mirror_from_json_builds_segments() {
        let json = r#"{
            "p1": {"x": 20.0, "y": 0.0},
            "p2": {"x": -20.0, "y": 0.0},
            "p3": {"x": 0.0, "y": 10.0}
        }"#;
        let mirror: ParabolicMirror = serde_json::from_str(json).unwrap();
        assert_eq!(mirror.segments().len(), PARABOLA_SEGMENTS);
        assert_eq!(
            mirror,
            ParabolicMirror::new(Point::new(20., 0.), Point::new(-20., 0.), Point::new(0., 10.))
        );
        let written = serde_json::to_value(&mirror).unwrap();
        assert!(written.get("segments").is_none());
        assert_eq!(written["p3"]["y"], 10.0);
    }

    #[test]
    fn test_degenerate_parabolic_mirror_never_hits() {
        let p = Point::new(1., 1.);
        let mirror = ParabolicMirror::new(p, p, Point::new(1., 5.));
        assert!(mirror.segments().is_empty());
        assert!(mirror.check_ray_intersection(&ray(1., -5., 0., 1.)).is_none());
    }

    #[test]
    fn test_ideal_mirror_focal_point() {
        let mirror = IdealMirror::new(Point::new(-20., 0.), Point::new(20., 0.), 10.0);
        for x in [-8.0, -3.0, 2.0, 7.0] {
            let (_, out) = bounce(&mirror, &ray(x, 30., 0., -1.));
            let t = (10.0 - out.origin.y) / out.direction.dy;
            let p = out.point_at(t);
            assert!(p.is_close_tol(&Point::new(0., 10.), 1e-9));
        }
    }

    #[test]
    fn test_beam_splitter_energy_split() {
        let splitter = BeamSplitter::new(Point::new(-10., 10.), Point::new(10., 0.), 0.3);
        let incoming = ray(0., -5., 0., 1.);
        let hit = splitter.check_ray_intersection(&incoming).unwrap();
        let interaction = splitter.on_ray_incident(&incoming, &hit);
        let transmitted = interaction.outgoing_ray.unwrap();
        assert!(transmitted.direction.is_close(&incoming.direction));
        assert!((transmitted.brightness() - 0.3).abs() < 1e-12);
        assert_eq!(interaction.new_rays.len(), 1);
        let reflected = interaction.new_rays[0];
        assert!((reflected.brightness() - 0.7).abs() < 1e-12);
        assert!(reflected.gap);
        assert!(!transmitted.gap);
    }
}
