//! Closed vertex loops.

use crate::geom::point::Point;
use crate::geom::segment::Segment;

/// Iterates over the edges of a closed vertex loop, including the closing edge.
///
/// The iterator is restartable: call `edges()` again for a fresh pass.
pub fn edges(pts: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let n = pts.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |i| Segment::new(pts[i], pts[(i + 1) % n]))
}

/// Even-odd point-in-polygon test with a horizontal crossing ray.
///
/// Points exactly on the boundary may land on either side.
pub fn point_in_polygon(ptest: Point, pts: &[Point]) -> bool {
    let n = pts.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i];
        let pj = pts[j];
        if (pi.y > ptest.y) != (pj.y > ptest.y) {
            let x_cross = pi.x + (ptest.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if ptest.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
