// ─────────────────────────────────────────────────────────────────────
// Nuray — Antenna Response
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Vector effective length H = (H_theta, H_phi) [m] of a channel.
//!
//! Short dipole of length l along unit axis a, signal arriving from the
//! direction k (zenith theta, azimuth phi):
//!
//!   H_theta = l/2 (a . e_theta),  H_phi = l/2 (a . e_phi)
//!
//! which for a vertical dipole reduces to |H_theta| = l/2 sin(theta).
//! The isotropic model has H_theta = H_phi = l/2 in every direction.
//! Every response is multiplied by the channel's bandpass magnitude.

use crate::detector::{AntennaModel, Bandpass, ChannelDescription};
use nuray_math::vector::{spherical_basis, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntennaResponse {
    model: AntennaModel,
    axis: Vec3,
    half_length: f64,
    bandpass: Bandpass,
}

impl AntennaResponse {
    pub fn new(model: AntennaModel, axis: Vec3, length: f64, bandpass: Bandpass) -> Self {
        AntennaResponse {
            model,
            axis: axis.normalized(),
            half_length: 0.5 * length,
            bandpass,
        }
    }

    pub fn for_channel(channel: &ChannelDescription) -> Self {
        Self::new(
            channel.antenna_model,
            channel.axis(),
            channel.antenna_length,
            channel.bandpass,
        )
    }

    pub fn bandpass(&self) -> &Bandpass {
        &self.bandpass
    }

    /// Frequency-independent (H_theta, H_phi) for a signal arriving from
    /// (`zenith`, `azimuth`).
    pub fn directional(&self, zenith: f64, azimuth: f64) -> (f64, f64) {
        match self.model {
            AntennaModel::Isotropic => (self.half_length, self.half_length),
            AntennaModel::VpolDipole | AntennaModel::HpolDipole => {
                let [_, e_theta, e_phi] = spherical_basis(zenith, azimuth);
                (
                    self.half_length * self.axis.dot(&e_theta),
                    self.half_length * self.axis.dot(&e_phi),
                )
            }
        }
    }

    /// (H_theta, H_phi) at `frequency` [GHz].
    pub fn effective_length(&self, zenith: f64, azimuth: f64, frequency: f64) -> (f64, f64) {
        let (h_theta, h_phi) = self.directional(zenith, azimuth);
        let g = self.bandpass.gain(frequency);
        (h_theta * g, h_phi * g)
    }

    /// Upper bound of |H| over frequency for the given direction.
    pub fn peak_effective_length(&self, zenith: f64, azimuth: f64) -> f64 {
        let (h_theta, h_phi) = self.directional(zenith, azimuth);
        h_theta.abs() + h_phi.abs()
    }
}
