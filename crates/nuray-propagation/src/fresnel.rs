//! Fresnel reflection at a planar dielectric boundary.

use num_complex::Complex64;

/// Complex amplitude reflection coefficients (parallel, perpendicular) for
/// a wave in medium `n1` hitting medium `n2` at incidence angle `theta_i`
/// [rad] from the normal. Beyond the critical angle |r| = 1 with a phase.
pub fn reflection_coefficients(theta_i: f64, n1: f64, n2: f64) -> (Complex64, Complex64) {
    let cos_i = Complex64::new(theta_i.cos(), 0.0);
    let sin_t = n1 / n2 * theta_i.sin();
    let cos_t = Complex64::new(1.0 - sin_t * sin_t, 0.0).sqrt();

    let r_par = (n2 * cos_i - n1 * cos_t) / (n2 * cos_i + n1 * cos_t);
    let r_perp = (n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t);
    (r_par, r_perp)
}
