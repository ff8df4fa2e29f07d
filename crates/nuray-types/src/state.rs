// ─────────────────────────────────────────────────────────────────────
// Nuray — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::R_EARTH;
use crate::error::{NurayError, NurayResult};
use ndarray::Array1;
use num_complex::Complex64;
use nuray_math::interp::interp1d;
use nuray_math::vector::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flavor {
    NuE,
    NuEBar,
    NuMu,
    NuMuBar,
    NuTau,
    NuTauBar,
}

impl Flavor {
    pub const ALL: [Flavor; 6] = [
        Flavor::NuE,
        Flavor::NuEBar,
        Flavor::NuMu,
        Flavor::NuMuBar,
        Flavor::NuTau,
        Flavor::NuTauBar,
    ];

    /// PDG Monte Carlo particle code.
    pub fn pdg(self) -> i32 {
        match self {
            Flavor::NuE => 12,
            Flavor::NuEBar => -12,
            Flavor::NuMu => 14,
            Flavor::NuMuBar => -14,
            Flavor::NuTau => 16,
            Flavor::NuTauBar => -16,
        }
    }

    pub fn from_pdg(code: i32) -> Option<Self> {
        Flavor::ALL.into_iter().find(|f| f.pdg() == code)
    }

    pub fn is_antineutrino(self) -> bool {
        self.pdg() < 0
    }

    pub fn is_electron(self) -> bool {
        self.pdg().abs() == 12
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionType {
    /// Charged current.
    Cc,
    /// Neutral current.
    Nc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShowerType {
    Had,
    Em,
}

impl FromStr for ShowerType {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "had" => Ok(ShowerType::Had),
            "em" => Ok(ShowerType::Em),
            other => Err(NurayError::ConfigError(format!(
                "unknown value '{other}' for signal.shower_type"
            ))),
        }
    }
}

/// Particle shower produced at the interaction vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shower {
    pub vertex: Vec3,
    /// Shower energy [eV].
    pub energy: f64,
    pub shower_type: ShowerType,
    /// Unit vector along the shower development (neutrino direction of motion).
    pub axis: Vec3,
}

/// One sampled neutrino interaction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Position in the generated sample; keys the RNG sub-streams.
    pub index: u64,
    /// Arrival direction: zenith/azimuth of where the neutrino comes from [rad].
    pub zenith: f64,
    pub azimuth: f64,
    /// Point where the neutrino entered the Earth.
    pub entry_point: Vec3,
    pub vertex: Vec3,
    pub flavor: Flavor,
    /// Neutrino energy [eV].
    pub energy: f64,
    pub interaction: InteractionType,
    /// Fraction of the neutrino energy given to the hadronic shower.
    pub inelasticity: f64,
    /// Weight computed upstream; only read by `weight_mode = existing`.
    pub prior_weight: Option<f64>,
    pub showers: Vec<Shower>,
}

impl Trajectory {
    /// Build a trajectory and derive its showers and Earth entry point.
    ///
    /// CC nu_e deposits y E hadronically plus (1 - y) E electromagnetically;
    /// every other interaction produces only the hadronic shower.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: u64,
        zenith: f64,
        azimuth: f64,
        vertex: Vec3,
        flavor: Flavor,
        energy: f64,
        interaction: InteractionType,
        inelasticity: f64,
    ) -> Self {
        let arrival = Vec3::from_spherical(zenith, azimuth);
        let axis = -arrival;
        let mut showers = vec![Shower {
            vertex,
            energy: inelasticity * energy,
            shower_type: ShowerType::Had,
            axis,
        }];
        if interaction == InteractionType::Cc && flavor.is_electron() {
            showers.push(Shower {
                vertex,
                energy: (1.0 - inelasticity) * energy,
                shower_type: ShowerType::Em,
                axis,
            });
        }
        Trajectory {
            index,
            zenith,
            azimuth,
            entry_point: earth_exit_point(vertex, arrival),
            vertex,
            flavor,
            energy,
            interaction,
            inelasticity,
            prior_weight: None,
            showers,
        }
    }

    pub fn with_prior_weight(mut self, weight: f64) -> Self {
        self.prior_weight = Some(weight);
        self
    }

    /// Unit vector pointing from the vertex towards where the neutrino came from.
    pub fn arrival_direction(&self) -> Vec3 {
        Vec3::from_spherical(self.zenith, self.azimuth)
    }

    pub fn shower_axis(&self) -> Vec3 {
        -self.arrival_direction()
    }

    /// Summed energy of all showers [eV].
    pub fn shower_energy_sum(&self) -> f64 {
        self.showers.iter().map(|s| s.energy).sum()
    }
}

/// Point where a ray from `origin` along `direction` leaves the Earth sphere
/// (surface at z = 0, centre at (0, 0, -R_E)).
pub fn earth_exit_point(origin: Vec3, direction: Vec3) -> Vec3 {
    let centre = Vec3::new(0.0, 0.0, -R_EARTH);
    let d = direction.normalized();
    let p = origin - centre;
    let b = p.dot(&d);
    let c = p.norm_squared() - R_EARTH * R_EARTH;
    let disc = b * b - c;
    if disc <= 0.0 {
        return origin;
    }
    let t = (-b + disc.sqrt()).max(0.0);
    origin + d * t
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolutionType {
    /// Monotonic in depth between vertex and antenna.
    Direct,
    /// Turns over below the surface.
    Refracted,
    /// Bounces off the surface.
    Reflected,
}

/// Path-integrated attenuation factors sampled at reference frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttenuationSpectrum {
    /// Reference frequencies [GHz], strictly increasing.
    pub frequencies: Vec<f64>,
    /// Amplitude survival factors in [0, 1].
    pub factors: Vec<f64>,
}

impl AttenuationSpectrum {
    /// No attenuation at any frequency.
    pub fn unity() -> Self {
        AttenuationSpectrum {
            frequencies: vec![0.0],
            factors: vec![1.0],
        }
    }

    /// Factor at `frequency`, linear between reference points.
    pub fn factor_at(&self, frequency: f64) -> f64 {
        interp1d(&self.frequencies, &self.factors, frequency)
    }
}

/// One signal path from a vertex to an antenna.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaySolution {
    pub solution_type: SolutionType,
    /// Conserved n(z) sin(theta).
    pub ray_parameter: f64,
    /// Unit propagation direction at the vertex.
    pub launch_vector: Vec3,
    /// Unit vector at the antenna pointing back along the incoming ray.
    pub receive_vector: Vec3,
    /// Zenith of `launch_vector` [rad].
    pub launch_angle: f64,
    /// Zenith of `receive_vector` [rad].
    pub receive_angle: f64,
    /// [ns]
    pub travel_time: f64,
    /// [m]
    pub path_length: f64,
    pub attenuation: AttenuationSpectrum,
    /// Amplitude focusing factor (1 when disabled).
    pub focusing: f64,
    pub n_bottom_reflections: u32,
    pub n_surface_reflections: u32,
    /// Accumulated reflection coefficient for the theta polarization.
    pub reflection_theta: Complex64,
    /// Accumulated reflection coefficient for the phi polarization.
    pub reflection_phi: Complex64,
}

/// Electric field at an antenna for one (shower, ray solution) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricFieldTrace {
    pub channel_id: usize,
    pub shower_index: usize,
    pub ray_index: usize,
    /// Time of the first sample [ns].
    pub start_time: f64,
    /// [GHz]
    pub sampling_rate: f64,
    /// [V/m]
    pub e_theta: Array1<f64>,
    /// [V/m]
    pub e_phi: Array1<f64>,
    pub viewing_angle: f64,
    /// Incoming-signal direction at the antenna.
    pub receive_vector: Vec3,
}

impl ElectricFieldTrace {
    pub fn n_samples(&self) -> usize {
        self.e_theta.len()
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.n_samples() as f64 / self.sampling_rate
    }

    /// Maximum of sqrt(e_theta^2 + e_phi^2).
    pub fn peak_amplitude(&self) -> f64 {
        self.e_theta
            .iter()
            .zip(self.e_phi.iter())
            .map(|(t, p)| t.hypot(*p))
            .fold(0.0, f64::max)
    }
}

/// Peak voltage contributed by a single ray solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayAmplitude {
    pub shower_index: usize,
    pub ray_index: usize,
    /// [V]
    pub peak: f64,
}

/// Channel voltage time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageTrace {
    pub channel_id: usize,
    pub start_time: f64,
    pub sampling_rate: f64,
    pub samples: Array1<f64>,
    pub ray_amplitudes: Option<Vec<RayAmplitude>>,
}

impl VoltageTrace {
    pub fn zeros(channel_id: usize, start_time: f64, sampling_rate: f64, n: usize) -> Self {
        VoltageTrace {
            channel_id,
            start_time,
            sampling_rate,
            samples: Array1::zeros(n),
            ray_amplitudes: None,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.n_samples() as f64 / self.sampling_rate
    }

    pub fn time_of(&self, sample: usize) -> f64 {
        self.start_time + sample as f64 / self.sampling_rate
    }

    pub fn max_abs(&self) -> f64 {
        self.samples.iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

/// One digitizer readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_index: usize,
    pub trajectory_index: u64,
    pub weight: f64,
    pub triggered: bool,
    pub trigger_time: Option<f64>,
    pub channel_traces: Option<Vec<VoltageTrace>>,
    pub electric_field_traces: Option<Vec<ElectricFieldTrace>>,
    pub sim_channel_traces: Option<Vec<VoltageTrace>>,
    pub sim_electric_field_traces: Option<Vec<ElectricFieldTrace>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cc_nue_has_two_showers() {
        let t = Trajectory::new(
            0,
            0.3,
            1.0,
            Vec3::new(100.0, 0.0, -1500.0),
            Flavor::NuE,
            1e18,
            InteractionType::Cc,
            0.25,
        );
        assert_eq!(t.showers.len(), 2);
        assert_eq!(t.showers[0].shower_type, ShowerType::Had);
        assert!((t.showers[0].energy - 2.5e17).abs() < 1.0);
        assert_eq!(t.showers[1].shower_type, ShowerType::Em);
        assert!((t.shower_energy_sum() - 1e18).abs() < 1e3);
    }

    #[test]
    fn test_nc_has_only_hadronic_shower() {
        for flavor in [Flavor::NuE, Flavor::NuMuBar, Flavor::NuTau] {
            let t = Trajectory::new(
                1,
                1.0,
                0.0,
                Vec3::new(0.0, 0.0, -500.0),
                flavor,
                1e17,
                InteractionType::Nc,
                0.4,
            );
            assert_eq!(t.showers.len(), 1);
            assert_eq!(t.showers[0].shower_type, ShowerType::Had);
        }
    }

    #[test]
    fn test_vertical_downgoing_entry_point_is_surface() {
        let t = Trajectory::new(
            2,
            0.0,
            0.0,
            Vec3::new(0.0, 0.0, -1000.0),
            Flavor::NuMu,
            1e18,
            InteractionType::Cc,
            0.2,
        );
        assert!(t.entry_point.distance(&Vec3::ZERO) < 1e-6);
        // Shower travels downwards
        assert!((t.shower_axis().z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_upgoing_entry_point_on_sphere() {
        let vertex = Vec3::new(0.0, 0.0, -200.0);
        let exit = earth_exit_point(vertex, Vec3::from_spherical(2.5, 0.7));
        let centre = Vec3::new(0.0, 0.0, -R_EARTH);
        assert!((exit.distance(&centre) - R_EARTH).abs() < 1e-3);
        assert!(exit.distance(&vertex) > 1e6);
    }

    #[test]
    fn test_pdg_roundtrip() {
        for f in Flavor::ALL {
            assert_eq!(Flavor::from_pdg(f.pdg()), Some(f));
        }
        assert!(Flavor::NuTauBar.is_antineutrino());
        assert_eq!(Flavor::from_pdg(13), None);
    }

    #[test]
    fn test_attenuation_spectrum_interpolates() {
        let s = AttenuationSpectrum {
            frequencies: vec![0.1, 0.5, 1.0],
            factors: vec![0.9, 0.5, 0.2],
        };
        assert_eq!(s.factor_at(0.5), 0.5);
        assert!((s.factor_at(0.3) - 0.7).abs() < 1e-12);
        assert_eq!(s.factor_at(2.0), 0.2);
    }

    #[test]
    fn test_voltage_trace_timing() {
        let mut v = VoltageTrace::zeros(3, 100.0, 2.0, 10);
        v.samples[4] = -0.7;
        assert!((v.end_time() - 105.0).abs() < 1e-12);
        assert!((v.time_of(4) - 102.0).abs() < 1e-12);
        assert_eq!(v.max_abs(), 0.7);
    }
}
