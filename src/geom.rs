pub mod circle;
pub mod optics;
pub mod point;
pub mod polygon;
pub mod ray;
pub mod segment;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-13;

/// Smallest ray parameter accepted as a hit.
///
/// Equivalent to rejecting hits closer than `MIN_T^2` in squared distance for unit
/// directions; prevents self-intersection at the emitting or last-hit surface.
pub const MIN_T: f64 = 1e-6;

/// Cross products below this are treated as parallel.
pub const PARALLEL_EPS: f64 = 1e-12;
