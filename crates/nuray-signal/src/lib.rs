// ─────────────────────────────────────────────────────────────────────
// Nuray — Signal
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electric field of a shower at an antenna, for one ray solution.

pub mod askaryan;
pub mod polarization;

use num_complex::Complex64;
use nuray_math::fft::{irfft, rfft_frequencies};
use nuray_types::config::{PolarizationMode, ResolvedConfig, SignalModelKind};
use nuray_types::state::{ElectricFieldTrace, RaySolution, Shower, ShowerType};
use std::f64::consts::{FRAC_PI_2, PI};

/// Emission model bound to the run configuration.
#[derive(Debug, Clone)]
pub struct SignalModel {
    kind: SignalModelKind,
    zerosignal: bool,
    polarization: PolarizationMode,
    shower_type: Option<ShowerType>,
    sampling_rate: f64,
    n_samples: usize,
}

impl SignalModel {
    /// `n_samples` at the internal `sampling_rate` sets the trace length.
    pub fn new(config: &ResolvedConfig, n_samples: usize) -> Self {
        SignalModel {
            kind: config.signal.model,
            zerosignal: config.signal.zerosignal,
            polarization: config.signal.polarization,
            shower_type: config.signal.shower_type,
            sampling_rate: config.sampling_rate,
            n_samples: n_samples.max(2),
        }
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Field at the antenna end of `ray`, with the pulse centred in the
    /// trace at the ray's arrival time.
    ///
    /// The emitted spectrum is divided by the path length and multiplied
    /// by the attenuation spectrum, the focusing factor and the reflection
    /// coefficients of the path.
    pub fn electric_field(
        &self,
        shower: &Shower,
        shower_index: usize,
        ray: &RaySolution,
        ray_index: usize,
        channel_id: usize,
        n_vertex: f64,
    ) -> ElectricFieldTrace {
        let n = self.n_samples;
        let fs = self.sampling_rate;
        let half_window = n as f64 / (2.0 * fs);
        let viewing_angle = shower.axis.angle_to(&ray.launch_vector);

        let mut trace = ElectricFieldTrace {
            channel_id,
            shower_index,
            ray_index,
            start_time: ray.travel_time - half_window,
            sampling_rate: fs,
            e_theta: ndarray::Array1::zeros(n),
            e_phi: ndarray::Array1::zeros(n),
            viewing_angle,
            receive_vector: ray.receive_vector,
        };
        if self.zerosignal {
            return trace;
        }

        let shower_type = self.shower_type.unwrap_or(shower.shower_type);
        let (p_theta, p_phi) =
            polarization::polarization(self.polarization, shower.axis, ray.launch_vector);
        let distance = ray.path_length.max(1e-3);

        let freqs = rfft_frequencies(n, fs);
        let mut spec_theta = Vec::with_capacity(freqs.len());
        let mut spec_phi = Vec::with_capacity(freqs.len());
        for &f in freqs.iter() {
            let amplitude = askaryan::spectral_amplitude(
                self.kind,
                shower_type,
                shower.energy,
                viewing_angle,
                n_vertex,
                f,
            ) / distance
                * ray.attenuation.factor_at(f)
                * ray.focusing;
            let phase = Complex64::from_polar(amplitude, -FRAC_PI_2 - 2.0 * PI * f * half_window);
            spec_theta.push(phase * p_theta * ray.reflection_theta);
            spec_phi.push(phase * p_phi * ray.reflection_phi);
        }
        trace.e_theta = irfft(&spec_theta, n, fs);
        trace.e_phi = irfft(&spec_phi, n, fs);
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuray_math::vector::Vec3;
    use nuray_types::config::SimulationConfig;
    use nuray_types::state::{AttenuationSpectrum, SolutionType};

    fn config(patch: &str) -> ResolvedConfig {
        SimulationConfig::from_json_str(patch).unwrap().resolve().unwrap()
    }

    fn on_cone_setup() -> (Shower, RaySolution) {
        let theta_c = askaryan::cherenkov_angle(1.78);
        let axis = Vec3::from_spherical(std::f64::consts::PI - 0.3, 0.0);
        // Launch direction at the Cherenkov angle from the axis, in the x-z plane
        let launch = Vec3::from_spherical(std::f64::consts::PI - 0.3 - theta_c, 0.0);
        let shower = Shower {
            vertex: Vec3::new(0.0, 0.0, -1000.0),
            energy: 1e18,
            shower_type: ShowerType::Had,
            axis,
        };
        let ray = RaySolution {
            solution_type: SolutionType::Direct,
            ray_parameter: 1.78 * launch.zenith().sin(),
            launch_vector: launch,
            receive_vector: -launch,
            launch_angle: launch.zenith(),
            receive_angle: (-launch).zenith(),
            travel_time: 5000.0,
            path_length: 1000.0,
            attenuation: AttenuationSpectrum::unity(),
            focusing: 1.0,
            n_bottom_reflections: 0,
            n_surface_reflections: 0,
            reflection_theta: Complex64::new(1.0, 0.0),
            reflection_phi: Complex64::new(1.0, 0.0),
        };
        (shower, ray)
    }

    fn peak_index(trace: &ndarray::Array1<f64>) -> usize {
        trace
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_zerosignal_gives_zero_field() {
        let model = SignalModel::new(&config(r#"{"signal": {"zerosignal": true}}"#), 512);
        let (shower, ray) = on_cone_setup();
        let e = model.electric_field(&shower, 0, &ray, 0, 0, 1.78);
        assert!(e.e_theta.iter().chain(e.e_phi.iter()).all(|&v| v == 0.0));
        assert_eq!(e.n_samples(), 512);
    }

    #[test]
    fn test_pulse_centred_at_arrival_time() {
        let model = SignalModel::new(&config("{}"), 1024);
        let (shower, ray) = on_cone_setup();
        let e = model.electric_field(&shower, 0, &ray, 0, 0, 1.78);
        let i = peak_index(&e.e_theta);
        let t_peak = e.start_time + i as f64 / e.sampling_rate;
        assert!((t_peak - ray.travel_time).abs() < 1.0, "t_peak = {t_peak}");
        assert!(e.peak_amplitude() > 0.0);
    }

    #[test]
    fn test_field_scales_inverse_distance() {
        let model = SignalModel::new(&config("{}"), 512);
        let (shower, mut ray) = on_cone_setup();
        let near = model.electric_field(&shower, 0, &ray, 0, 0, 1.78).peak_amplitude();
        ray.path_length = 2000.0;
        let far = model.electric_field(&shower, 0, &ray, 0, 0, 1.78).peak_amplitude();
        assert!((near / far - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_polarization_ratio() {
        let model = SignalModel::new(
            &config(r#"{"signal": {"polarization": "custom", "ePhi": 0.6}}"#),
            512,
        );
        let (shower, ray) = on_cone_setup();
        let e = model.electric_field(&shower, 0, &ray, 0, 0, 1.78);
        let t = e.e_theta.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let p = e.e_phi.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!((p / t - 0.75).abs() < 1e-9);
    }
}
