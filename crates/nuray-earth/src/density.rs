// ─────────────────────────────────────────────────────────────────────
// Nuray — Earth Density
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radial Earth density profiles and column depth along a chord.

use nuray_math::quadrature::GaussLegendre;
use nuray_math::vector::Vec3;
use nuray_types::constants::R_EARTH;
use nuray_types::units::{CM, KM};

/// Mean density of the Earth [g/cm^3].
const MEAN_DENSITY: f64 = 5.515;

/// Three-layer model: (outer radius [m], density [g/cm^3]).
const CORE_MANTLE_CRUST: [(f64, f64); 3] = [
    (3480.0 * KM, 10.9),
    (6346.6 * KM, 4.4),
    (R_EARTH, 2.9),
];

/// PREM shells: outer radius [m] and ascending polynomial in x = r / R_E.
const PREM: [(f64, &[f64]); 10] = [
    (1221.5 * KM, &[13.0885, 0.0, -8.8381]),
    (3480.0 * KM, &[12.5815, -1.2638, -3.6426, -5.5281]),
    (5701.0 * KM, &[7.9565, -6.4761, 5.5283, -3.0807]),
    (5771.0 * KM, &[5.3197, -1.4836]),
    (5971.0 * KM, &[11.2494, -8.0298]),
    (6151.0 * KM, &[7.1089, -3.8045]),
    (6346.6 * KM, &[2.6910, 0.6924]),
    (6356.0 * KM, &[2.9]),
    (6368.0 * KM, &[2.6]),
    (R_EARTH, &[1.02]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityProfile {
    /// Uniform sphere at the mean Earth density.
    Simple,
    CoreMantleCrust,
    Prem,
}

impl DensityProfile {
    /// Density [g/cm^3] at distance `r` [m] from the centre. Zero outside.
    pub fn density(&self, r: f64) -> f64 {
        if r > R_EARTH {
            return 0.0;
        }
        match self {
            DensityProfile::Simple => MEAN_DENSITY,
            DensityProfile::CoreMantleCrust => CORE_MANTLE_CRUST
                .iter()
                .find(|(outer, _)| r <= *outer)
                .map_or(0.0, |(_, rho)| *rho),
            DensityProfile::Prem => {
                let x = r / R_EARTH;
                PREM.iter()
                    .find(|(outer, _)| r <= *outer)
                    .map_or(0.0, |(_, c)| nuray_math::poly::polyval(c, x))
            }
        }
    }

    /// Shell boundary radii [m] (excluding the surface).
    pub fn boundaries(&self) -> Vec<f64> {
        match self {
            DensityProfile::Simple => Vec::new(),
            DensityProfile::CoreMantleCrust => CORE_MANTLE_CRUST[..2].iter().map(|l| l.0).collect(),
            DensityProfile::Prem => PREM[..PREM.len() - 1].iter().map(|l| l.0).collect(),
        }
    }

    /// Column depth [g/cm^2] from `origin` along `direction` to the surface
    /// of the Earth sphere (centre at (0, 0, -R_E)).
    ///
    /// The chord is split at every shell crossing; each segment is
    /// integrated with `quadrature`.
    pub fn column_depth(&self, origin: Vec3, direction: Vec3, quadrature: &GaussLegendre) -> f64 {
        let centre = Vec3::new(0.0, 0.0, -R_EARTH);
        let d = direction.normalized();
        let p = origin - centre;
        let Some(t_exit) = sphere_exit(p, d, R_EARTH) else {
            return 0.0;
        };
        if t_exit <= 0.0 {
            return 0.0;
        }

        let mut cuts = vec![0.0, t_exit];
        for radius in self.boundaries() {
            for t in sphere_crossings(p, d, radius) {
                if t > 0.0 && t < t_exit {
                    cuts.push(t);
                }
            }
        }
        cuts.sort_by(f64::total_cmp);

        let rho_at = |t: f64| self.density((p + d * t).norm());
        let grams_per_cm2: f64 = cuts
            .windows(2)
            .map(|w| quadrature.integrate(rho_at, w[0], w[1]))
            .sum();
        // rho [g/cm^3] * length [m] -> g/cm^2
        grams_per_cm2 / CM
    }
}

/// Largest parameter t where `p + t d` meets a sphere of `radius` around the origin.
fn sphere_exit(p: Vec3, d: Vec3, radius: f64) -> Option<f64> {
    sphere_crossings(p, d, radius).into_iter().reduce(f64::max)
}

fn sphere_crossings(p: Vec3, d: Vec3, radius: f64) -> Vec<f64> {
    let b = p.dot(&d);
    let c = p.norm_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return Vec::new();
    }
    let s = disc.sqrt();
    vec![-b - s, -b + s]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prem_centre_and_surface() {
        let prem = DensityProfile::Prem;
        assert!((prem.density(0.0) - 13.0885).abs() < 1e-12);
        assert!((prem.density(R_EARTH) - 1.02).abs() < 1e-12);
        assert_eq!(prem.density(R_EARTH + 1.0), 0.0);
    }

    #[test]
    fn test_core_mantle_crust_layers() {
        let cmc = DensityProfile::CoreMantleCrust;
        assert_eq!(cmc.density(1000.0 * KM), 10.9);
        assert_eq!(cmc.density(5000.0 * KM), 4.4);
        assert_eq!(cmc.density(6360.0 * KM), 2.9);
    }

    #[test]
    fn test_vertical_column_depth_uniform() {
        // Straight down from the surface through the centre: 2 R_E of rock
        let gl = GaussLegendre::new(8);
        let x = DensityProfile::Simple.column_depth(Vec3::ZERO, -Vec3::EZ, &gl);
        let expected = MEAN_DENSITY * 2.0 * R_EARTH / CM;
        assert!((x / expected - 1.0).abs() < 1e-9, "x = {x:e}");
    }

    #[test]
    fn test_layered_chord_through_centre() {
        let gl = GaussLegendre::new(8);
        let x = DensityProfile::CoreMantleCrust.column_depth(Vec3::ZERO, -Vec3::EZ, &gl);
        let expected = 2.0
            * (10.9 * 3480.0 * KM + 4.4 * (6346.6 - 3480.0) * KM + 2.9 * (R_EARTH - 6346.6 * KM))
            / CM;
        assert!((x / expected - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mass_roughly_consistent() {
        // Volume-averaged PREM density should be close to the mean Earth density
        let prem = DensityProfile::Prem;
        let gl = GaussLegendre::new(64);
        let mut mass = 0.0;
        let edges: Vec<f64> = std::iter::once(0.0).chain(prem.boundaries()).chain([R_EARTH]).collect();
        for w in edges.windows(2) {
            mass += gl.integrate(|r| prem.density(r) * r * r, w[0], w[1]);
        }
        let mean = 3.0 * mass / R_EARTH.powi(3);
        assert!((mean - MEAN_DENSITY).abs() < 0.05, "mean = {mean}");
    }
}
