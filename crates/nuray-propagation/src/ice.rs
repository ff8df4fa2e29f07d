// ─────────────────────────────────────────────────────────────────────
// Nuray — Ice Models
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Refractive-index profiles n(z) = n_ice - delta_n * exp(z / z_0), z <= 0.

use nuray_types::config::IceModelKind;
use nuray_types::constants::N_AIR;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceModel {
    /// Deep-ice refractive index.
    pub n_ice: f64,
    /// n_ice - n(surface).
    pub delta_n: f64,
    /// e-folding depth of the firn [m].
    pub z_0: f64,
    /// Ice thickness [m]; depth range of the attenuation table.
    pub thickness: f64,
    /// Depth of a reflecting layer (negative) [m].
    pub z_bottom: Option<f64>,
    /// Amplitude reflection coefficient of the bottom layer.
    pub bottom_reflection: f64,
}

impl IceModel {
    pub fn new(kind: IceModelKind) -> Self {
        let gradient = |n_ice: f64, z_0: f64, delta_n: f64, thickness: f64| IceModel {
            n_ice,
            delta_n,
            z_0,
            thickness,
            z_bottom: None,
            bottom_reflection: 1.0,
        };
        match kind {
            IceModelKind::SouthPoleSimple => gradient(1.78, 75.75, 0.43, 2820.0),
            IceModelKind::SouthPole2015 => gradient(1.78, 77.0, 0.426, 2820.0),
            IceModelKind::GreenlandSimple => gradient(1.78, 37.25, 0.51, 3000.0),
            IceModelKind::MooresBaySimple => IceModel {
                z_bottom: Some(-576.0),
                bottom_reflection: 0.82,
                ..gradient(1.78, 34.5, 0.46, 576.0)
            },
            IceModelKind::Homogeneous => gradient(1.78, 1.0, 0.0, 3000.0),
        }
    }

    /// Refractive index at depth `z` [m]; air above the surface.
    pub fn n(&self, z: f64) -> f64 {
        if z > 0.0 {
            return N_AIR;
        }
        self.n_ice - self.delta_n * (z / self.z_0).exp()
    }

    pub fn n_surface(&self) -> f64 {
        self.n_ice - self.delta_n
    }

    pub fn is_homogeneous(&self) -> bool {
        self.delta_n == 0.0
    }
}
