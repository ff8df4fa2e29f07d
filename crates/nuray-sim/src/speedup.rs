// ─────────────────────────────────────────────────────────────────────
// Nuray — Event Weight and Speedup Controller
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Early-termination cuts.
//!
//! | cut                  | stage                    | drops                       |
//! |----------------------|--------------------------|-----------------------------|
//! | minimum_weight_cut   | before propagation       | the trajectory              |
//! | distance_cut         | before ray tracing       | one (shower, channel) pair  |
//! | delta_C_cut          | after ray tracing        | one ray solution            |
//! | min_efield_amplitude | after the signal model   | one readout group           |
//!
//! Every cut only skips work whose result could not reach the trigger
//! threshold; [`SpeedupConfig::disabled`] turns all of them off.

use nuray_math::poly::polyval;
use nuray_math::vector::Vec3;
use nuray_signal::askaryan::cherenkov_angle;
use nuray_types::config::{ResolvedConfig, SpeedupConfig};
use nuray_types::state::Shower;
use serde::{Deserialize, Serialize};

/// Floor of the distance cut [m].
const MIN_CUT_DISTANCE: f64 = 100.0;

/// Counts of the work each cut removed. Accumulated per worker and merged
/// after the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutStatistics {
    pub trajectories: u64,
    pub weight_cut: u64,
    pub distance_cut: u64,
    pub no_ray_solution: u64,
    pub delta_c_cut: u64,
    pub amplitude_cut: u64,
    pub ray_cache_hits: u64,
}

impl CutStatistics {
    pub fn merge(&mut self, other: &CutStatistics) {
        self.trajectories += other.trajectories;
        self.weight_cut += other.weight_cut;
        self.distance_cut += other.distance_cut;
        self.no_ray_solution += other.no_ray_solution;
        self.delta_c_cut += other.delta_c_cut;
        self.amplitude_cut += other.amplitude_cut;
        self.ray_cache_hits += other.ray_cache_hits;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedupController {
    config: SpeedupConfig,
    zerosignal: bool,
}

impl SpeedupController {
    pub fn new(config: &ResolvedConfig) -> Self {
        SpeedupController {
            config: config.speedup.clone(),
            zerosignal: config.signal.zerosignal,
        }
    }

    pub fn config(&self) -> &SpeedupConfig {
        &self.config
    }

    pub fn redo_raytracing(&self) -> bool {
        self.config.redo_raytracing
    }

    pub fn passes_weight(&self, weight: f64, stats: &mut CutStatistics) -> bool {
        let pass = weight >= self.config.minimum_weight_cut;
        if !pass {
            stats.weight_cut += 1;
        }
        pass
    }

    /// Maximum vertex-antenna distance [m] at which a shower energy sum
    /// [eV] can still trigger.
    pub fn max_distance(&self, energy_sum: f64) -> f64 {
        if energy_sum <= 0.0 {
            return MIN_CUT_DISTANCE;
        }
        let log_distance = polyval(&self.config.distance_cut_coefficients, energy_sum.log10());
        10f64.powf(log_distance).max(MIN_CUT_DISTANCE)
    }

    /// Energy of `showers[index]` plus every shower within
    /// `distance_cut_sum_length` of its vertex.
    pub fn shower_energy_sum(&self, showers: &[Shower], index: usize) -> f64 {
        let Some(shower) = showers.get(index) else {
            return 0.0;
        };
        showers
            .iter()
            .filter(|s| s.vertex.distance(&shower.vertex) <= self.config.distance_cut_sum_length)
            .map(|s| s.energy)
            .sum()
    }

    pub fn passes_distance(
        &self,
        showers: &[Shower],
        index: usize,
        antenna: Vec3,
        stats: &mut CutStatistics,
    ) -> bool {
        if !self.config.distance_cut {
            return true;
        }
        let Some(shower) = showers.get(index) else {
            return false;
        };
        let limit = self.max_distance(self.shower_energy_sum(showers, index));
        let pass = shower.vertex.distance(&antenna) <= limit;
        if !pass {
            stats.distance_cut += 1;
        }
        pass
    }

    /// Viewing angle within `delta_C_cut` of the Cherenkov angle at the vertex.
    pub fn passes_cherenkov(&self, viewing_angle: f64, n_vertex: f64, stats: &mut CutStatistics) -> bool {
        let pass = (viewing_angle - cherenkov_angle(n_vertex)).abs() <= self.config.delta_c_cut;
        if !pass {
            stats.delta_c_cut += 1;
        }
        pass
    }

    /// Voltage estimate of one readout group above `min_efield_amplitude`
    /// noise RMS. The estimate is the sum over the group's fields of peak
    /// |E| times the peak effective length; filter ringing and sub-sample
    /// shifts can push the true peak a few percent beyond it. Zero-signal
    /// runs skip the gate so every readout is still noise-only.
    pub fn passes_amplitude(&self, voltage_estimate: f64, vrms: f64, stats: &mut CutStatistics) -> bool {
        if self.zerosignal {
            return true;
        }
        let pass = voltage_estimate >= self.config.min_efield_amplitude * vrms;
        if !pass {
            stats.amplitude_cut += 1;
        }
        pass
    }
}
