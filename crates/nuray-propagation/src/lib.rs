// ─────────────────────────────────────────────────────────────────────
// Nuray — Propagation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radio propagation from a shower vertex to the antennas.
//!
//! [`RayTracingEngine`] binds an ice model, the analytic tracer and a
//! lazily built [`AttenuationLengthTable`] shared read-only by all workers.

pub mod analytic;
pub mod attenuation;
pub mod cache;
pub mod fresnel;
pub mod ice;

pub use analytic::{AnalyticRayTracer, Topology};
pub use attenuation::AttenuationLengthTable;
pub use cache::RaySolutionCache;
pub use ice::IceModel;

use nuray_math::vector::Vec3;
use nuray_types::config::{PropagationModule, PropagationSettings, ResolvedConfig};
use nuray_types::error::{NurayError, NurayResult};
use nuray_types::state::RaySolution;
use nuray_types::units::GHZ;
use std::sync::OnceLock;

/// Lowest reference frequency for path attenuation [GHz].
pub const ATTENUATION_F_MIN: f64 = 0.05 * GHZ;

#[derive(Debug)]
pub struct RayTracingEngine {
    settings: PropagationSettings,
    tracer: AnalyticRayTracer,
    frequencies: Vec<f64>,
    table: OnceLock<AttenuationLengthTable>,
}

impl RayTracingEngine {
    /// `sampling_rate` [GHz] sets the upper end (Nyquist) of the reference
    /// frequency grid.
    pub fn new(settings: PropagationSettings, sampling_rate: f64) -> NurayResult<Self> {
        let nyquist = 0.5 * sampling_rate;
        if nyquist <= ATTENUATION_F_MIN {
            return Err(NurayError::ConfigError(format!(
                "sampling_rate {sampling_rate} GHz too low for attenuation reference grid"
            )));
        }
        if settings.n_freq < 2 {
            return Err(NurayError::ConfigError(
                "propagation.n_freq must be >= 2".to_string(),
            ));
        }
        let tracer = match settings.module {
            PropagationModule::Analytic => AnalyticRayTracer::new(
                IceModel::new(settings.ice_model),
                settings.n_reflections,
                settings.focusing.then_some(settings.focusing_limit),
            ),
        };
        let step = (nyquist - ATTENUATION_F_MIN) / (settings.n_freq - 1) as f64;
        let frequencies = (0..settings.n_freq)
            .map(|i| ATTENUATION_F_MIN + step * i as f64)
            .collect();
        Ok(RayTracingEngine {
            settings,
            tracer,
            frequencies,
            table: OnceLock::new(),
        })
    }

    pub fn from_config(config: &ResolvedConfig) -> NurayResult<Self> {
        Self::new(config.propagation, config.sampling_rate)
    }

    pub fn settings(&self) -> &PropagationSettings {
        &self.settings
    }

    pub fn ice(&self) -> &IceModel {
        self.tracer.ice()
    }

    pub fn reference_frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Shared attenuation table, built on first use.
    pub fn attenuation_table(&self) -> &AttenuationLengthTable {
        self.table.get_or_init(|| {
            log::info!(
                "building attenuation table ({:?}, {} frequencies)",
                self.settings.attenuation_model,
                self.frequencies.len()
            );
            AttenuationLengthTable::build(
                self.settings.attenuation_model,
                self.ice().thickness,
                &self.frequencies,
            )
        })
    }

    /// All ray solutions vertex -> antenna, ordered by travel time.
    pub fn trace(&self, vertex: Vec3, antenna: Vec3) -> Vec<RaySolution> {
        let table = self
            .settings
            .attenuate_ice
            .then(|| self.attenuation_table());
        self.tracer.trace(vertex, antenna, table)
    }
}
