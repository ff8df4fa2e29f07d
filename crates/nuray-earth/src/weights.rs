// ─────────────────────────────────────────────────────────────────────
// Nuray — Earth Attenuation Weights
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Neutrino survival probability through the Earth.
//!
//! P = exp(-sigma_tot * N_A * X), with X the column depth [g/cm^2] from the
//! vertex back along the arrival direction to where the neutrino entered.

use crate::cross_section::{CrossSectionModel, InteractionKind};
use crate::density::DensityProfile;
use nuray_math::quadrature::GaussLegendre;
use nuray_types::config::{ResolvedConfig, WeightMode};
use nuray_types::constants::N_AVOGADRO;
use nuray_types::error::{NurayError, NurayResult};
use nuray_types::state::Trajectory;

/// Quadrature order per shell segment.
const QUADRATURE_ORDER: usize = 8;

#[derive(Debug, Clone)]
pub struct EarthAttenuationModel {
    mode: WeightMode,
    cross_section: CrossSectionModel,
    profile: Option<DensityProfile>,
    quadrature: GaussLegendre,
}

impl EarthAttenuationModel {
    pub fn new(mode: WeightMode, cross_section: CrossSectionModel) -> Self {
        let profile = match mode {
            WeightMode::Simple => Some(DensityProfile::Simple),
            WeightMode::CoreMantleCrust => Some(DensityProfile::CoreMantleCrust),
            WeightMode::Prem => Some(DensityProfile::Prem),
            WeightMode::Unity | WeightMode::Existing => None,
        };
        EarthAttenuationModel {
            mode,
            cross_section,
            profile,
            quadrature: GaussLegendre::new(QUADRATURE_ORDER),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.weight_mode, CrossSectionModel::new(config.cross_section))
    }

    pub fn mode(&self) -> WeightMode {
        self.mode
    }

    pub fn cross_section(&self) -> &CrossSectionModel {
        &self.cross_section
    }

    /// Survival probability in [0, 1].
    ///
    /// `existing` mode fails with `ConfigError` when the trajectory carries
    /// no prior weight.
    pub fn survival_probability(&self, trajectory: &Trajectory) -> NurayResult<f64> {
        let p = match (self.mode, self.profile) {
            (WeightMode::Unity, _) => 1.0,
            (WeightMode::Existing, _) => trajectory.prior_weight.ok_or_else(|| {
                NurayError::ConfigError(format!(
                    "weight_mode 'existing' but trajectory {} has no prior weight",
                    trajectory.index
                ))
            })?,
            (_, Some(profile)) => {
                let column = profile.column_depth(
                    trajectory.vertex,
                    trajectory.arrival_direction(),
                    &self.quadrature,
                );
                let sigma = self.cross_section.cross_section(
                    trajectory.energy,
                    trajectory.flavor,
                    InteractionKind::Total,
                );
                (-sigma * N_AVOGADRO * column).exp()
            }
            (mode, None) => {
                return Err(NurayError::ConfigError(format!(
                    "weight_mode {mode:?} has no density profile"
                )))
            }
        };
        if !p.is_finite() {
            return Err(NurayError::PhysicsViolation(format!(
                "non-finite survival probability for trajectory {}",
                trajectory.index
            )));
        }
        let p = p.clamp(0.0, 1.0);
        log::trace!("trajectory {}: survival probability {p:.3e}", trajectory.index);
        Ok(p)
    }
}
