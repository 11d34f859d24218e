//! Ray casting against planar primitives.
//!
//! A ray is `origin + t * direction`. Every routine here only reports hits with
//! `t > MIN_T`, which keeps a ray from re-hitting the surface it starts on.

use crate::geom::circle::{Arc, Circle};
use crate::geom::point::Point;
use crate::geom::segment::Segment;
use crate::geom::vector::Vector;
use crate::geom::{MIN_T, PARALLEL_EPS};

/// Intersection of a ray with a segment.
///
/// Solves `origin + t * direction = p1 + u * (p2 - p1)` and accepts the hit
/// only for `t > MIN_T` and `u` in `[0, 1]`.
/// Returns `Some((t, point))`, or `None` for a miss or a parallel ray.
pub fn ray_segment_intersection(
    origin: Point,
    direction: Vector,
    segment: &Segment,
) -> Option<(f64, Point)> {
    let edge = segment.vector();
    let denom = direction.cross(&edge);
    if denom.abs() < PARALLEL_EPS {
        return None; // Ray parallel to segment
    }
    let to_p1 = segment.p1 - origin;
    let t = to_p1.cross(&edge) / denom;
    let u = to_p1.cross(&direction) / denom;
    if t > MIN_T && (0.0..=1.0).contains(&u) {
        Some((t, origin + direction * t))
    } else {
        None
    }
}

/// Intersections of a ray with a full circle, sorted by ascending `t`.
///
/// Returns 0, 1 or 2 hits. A tangent ray counts once.
pub fn ray_circle_intersections(
    origin: Point,
    direction: Vector,
    circle: &Circle,
) -> Vec<(f64, Point)> {
    // |o + t d - c|^2 = r^2  =>  a t^2 + 2 b t + c = 0
    let oc = origin - circle.center;
    let a = direction.length_squared();
    if a < PARALLEL_EPS {
        return Vec::new();
    }
    let b = oc.dot(&direction);
    let c = oc.length_squared() - circle.radius * circle.radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    let mut roots = vec![(-b - sq) / a];
    if sq > 0.0 {
        roots.push((-b + sq) / a);
    }
    roots
        .into_iter()
        .filter(|&t| t > MIN_T)
        .map(|t| (t, origin + direction * t))
        .collect()
}

/// Nearest intersection of a ray with a circular arc.
pub fn ray_arc_intersection(origin: Point, direction: Vector, arc: &Arc) -> Option<(f64, Point)> {
    ray_circle_intersections(origin, direction, &arc.circle)
        .into_iter()
        .find(|(_, pt)| arc.contains_point(*pt))
}

/// Nearest intersection of a ray with a chain of segments.
///
/// Returns `(t, point, segment_index)`.
pub fn ray_segments_intersection<'a, I>(
    origin: Point,
    direction: Vector,
    segments: I,
) -> Option<(f64, Point, usize)>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut closest: Option<(f64, Point, usize)> = None;

    for (idx, segment) in segments.into_iter().enumerate() {
        if let Some((t, point)) = ray_segment_intersection(origin, direction, segment) {
            match &closest {
                None => closest = Some((t, point, idx)),
                Some((closest_t, _, _)) if t < *closest_t => {
                    closest = Some((t, point, idx));
                }
                _ => {}
            }
        }
    }

    closest
}
