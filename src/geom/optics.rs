//! Reflection, Snell refraction and Fresnel reflectance.
//!
//! All directions are unit vectors. Normals passed in must face the incoming
//! ray, i.e. `direction.dot(normal) < 0`.

use crate::geom::vector::Vector;

/// Perfect specular reflection of `direction` about `normal`.
pub fn reflect(direction: Vector, normal: Vector) -> Vector {
    let dot = direction.dot(&normal);
    direction - 2.0 * dot * normal
}

/// Refracts `direction` through a boundary from index `n1` into index `n2`.
///
/// Returns `None` on total internal reflection (sin^2 of the transmitted angle > 1).
pub fn refract(direction: Vector, normal: Vector, n1: f64, n2: f64) -> Option<Vector> {
    let eta = n1 / n2;
    let cos_i = -direction.dot(&normal);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let refracted = eta * direction + (eta * cos_i - cos_t) * normal;
    refracted.normalize()
}

/// Fresnel power reflectance `(Rs, Rp)` for the two polarizations.
///
/// `cos_incidence` is the cosine of the angle between the incoming ray and the
/// normal (taken by absolute value). Under total internal reflection both
/// components are 1.
pub fn fresnel_reflectance(cos_incidence: f64, n1: f64, n2: f64) -> (f64, f64) {
    let cos_i = cos_incidence.abs().min(1.0);
    let sin2_t = (n1 / n2).powi(2) * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return (1.0, 1.0);
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let rs = ((n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t)).powi(2);
    let rp = ((n1 * cos_t - n2 * cos_i) / (n1 * cos_t + n2 * cos_i)).powi(2);
    (rs.clamp(0.0, 1.0), rp.clamp(0.0, 1.0))
}

/// Refractive index from the Cauchy equation `n = A + B / lambda^2`.
///
/// `wavelength_nm` is in nanometers and `cauchy_b` in square micrometers.
pub fn cauchy_index(ref_index: f64, cauchy_b: f64, wavelength_nm: f64) -> f64 {
    let lambda_um = wavelength_nm / 1000.0;
    ref_index + cauchy_b / (lambda_um * lambda_um)
}
