//! Polarization of the emitted field in the (e_theta, e_phi) basis of the
//! launch direction.

use nuray_math::vector::{spherical_basis, Vec3};
use nuray_types::config::PolarizationMode;

/// Unit (e_theta, e_phi) weights of the field.
///
/// `Auto`: the field points along the component of the shower axis
/// perpendicular to the launch direction, flipped to point radially away
/// from the axis. Zero on the axis itself.
pub fn polarization(mode: PolarizationMode, shower_axis: Vec3, launch_vector: Vec3) -> (f64, f64) {
    match mode {
        PolarizationMode::Custom { e_theta, e_phi } => (e_theta, e_phi),
        PolarizationMode::Auto => {
            let l = launch_vector.normalized();
            let a = shower_axis.normalized();
            let direction = -(a - l * a.dot(&l));
            if direction.norm() < 1e-12 {
                return (0.0, 0.0);
            }
            let direction = direction.normalized();
            let [_, e_theta, e_phi] = spherical_basis(l.zenith(), l.azimuth());
            (direction.dot(&e_theta), direction.dot(&e_phi))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_is_unit_and_transverse() {
        let axis = Vec3::from_spherical(2.0, 0.4);
        let launch = Vec3::from_spherical(1.1, 2.0);
        let (t, p) = polarization(PolarizationMode::Auto, axis, launch);
        assert!((t * t + p * p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_shower_is_theta_polarized() {
        // Down-going axis, horizontal launch: field lies in the vertical plane
        let axis = -Vec3::EZ;
        let launch = Vec3::new(1.0, 0.0, 0.0);
        let (t, p) = polarization(PolarizationMode::Auto, axis, launch);
        assert!((t.abs() - 1.0).abs() < 1e-12);
        assert!(p.abs() < 1e-12);
    }

    #[test]
    fn test_on_axis_vanishes() {
        let axis = Vec3::from_spherical(0.7, 0.2);
        assert_eq!(polarization(PolarizationMode::Auto, axis, axis), (0.0, 0.0));
    }

    #[test]
    fn test_custom_passthrough() {
        let mode = PolarizationMode::custom(0.6).unwrap();
        let (t, p) = polarization(mode, Vec3::EZ, Vec3::new(1.0, 0.0, 0.0));
        assert!((t - 0.8).abs() < 1e-12);
        assert_eq!(p, 0.6);
    }
}
