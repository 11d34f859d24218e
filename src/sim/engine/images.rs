//! Image detection by pairwise ray convergence.
//!
//! Forward segments can form real images (or virtual objects when the rays
//! are intercepted before they meet). Backward extensions form virtual images.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::geom::point::Point;
use crate::geom::segment::line_intersection_params;
use crate::sim::engine::result::{DetectedImage, ImageType, TracedSegment};

/// Each pool is truncated to this many segments (the pass is O(n^2)).
pub const MAX_POOL_SEGMENTS: usize = 500;

/// Grid cell size used to de-duplicate nearby convergence points.
pub const IMAGE_GRID_SIZE: f64 = 5.0;

/// Direction pairs with a smaller cross product are treated as parallel.
const MIN_DIRECTION_CROSS: f64 = 1e-10;

/// Segment parameters this close to an end point do not count as interior.
/// Consecutive segments of one chain meet exactly at their shared end point.
const ENDPOINT_MARGIN: f64 = 1e-6;

/// Detects images among traced segments.
pub fn detect_images(segments: &[TracedSegment]) -> Vec<DetectedImage> {
    let forward: Vec<&TracedSegment> = segments
        .iter()
        .filter(|s| !s.is_extension)
        .take(MAX_POOL_SEGMENTS)
        .collect();
    let backward: Vec<&TracedSegment> = segments
        .iter()
        .filter(|s| s.is_extension)
        .take(MAX_POOL_SEGMENTS)
        .collect();

    let mut images = detect_in_pool(&forward, false);
    images.extend(detect_in_pool(&backward, true));
    images
}

/// Pairwise convergence within one pool, one image per grid cell.
///
/// Rows are evaluated in parallel and merged in `(i, j)` order, so the first
/// pair found for a cell is always the same one.
fn detect_in_pool(pool: &[&TracedSegment], backward: bool) -> Vec<DetectedImage> {
    let candidates: Vec<Vec<DetectedImage>> = (0..pool.len())
        .into_par_iter()
        .map(|i| {
            ((i + 1)..pool.len())
                .filter_map(|j| convergence(pool[i], pool[j], backward))
                .collect()
        })
        .collect();

    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut images = Vec::new();
    for image in candidates.into_iter().flatten() {
        if seen.insert(grid_key(image.position)) {
            images.push(image);
        }
    }
    images
}

fn convergence(a: &TracedSegment, b: &TracedSegment, backward: bool) -> Option<DetectedImage> {
    let va = a.vector();
    let vb = b.vector();
    let da = va.normalize()?;
    let db = vb.normalize()?;
    if da.cross(&db).abs() < MIN_DIRECTION_CROSS {
        return None;
    }
    let (t, s) = line_intersection_params(a.p1, va, b.p1, vb, 0.0)?;

    let interior = |u: f64| u > ENDPOINT_MARGIN && u < 1.0 - ENDPOINT_MARGIN;
    let image_type = if interior(t) && interior(s) {
        if backward {
            ImageType::Virtual
        } else {
            ImageType::Real
        }
    } else if !backward && t > 1.0 + ENDPOINT_MARGIN && s > 1.0 + ENDPOINT_MARGIN {
        ImageType::VirtualObject
    } else {
        return None;
    };

    let position = a.p1 + va * t;
    if !position.is_finite() {
        return None;
    }
    Some(DetectedImage {
        position,
        image_type,
        brightness: 0.5 * (a.brightness + b.brightness),
    })
}

fn grid_key(p: Point) -> (i64, i64) {
    (
        (p.x / IMAGE_GRID_SIZE).round() as i64,
        (p.y / IMAGE_GRID_SIZE).round() as i64,
    )
}
