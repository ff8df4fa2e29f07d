// ─────────────────────────────────────────────────────────────────────
// Nuray — Efield to Voltage Converter
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Folds the electric fields reaching one channel into voltage traces.
//!
//! 1. Fields are ordered by pulse arrival and grouped: a field whose
//!    arrival lies more than one readout window after the first arrival
//!    of the current group opens a new group.
//! 2. Each field is converted to voltage with the antenna's vector
//!    effective length in the frequency domain.
//! 3. Voltages are upsampled to the converter resolution, shifted onto a
//!    common grid (integer sample offset plus a fractional phase ramp)
//!    and summed.
//! 4. The sum is downsampled to the digitizer rate.

use crate::antenna::AntennaResponse;
use crate::detector::DetectorDescription;
use ndarray::Array1;
use num_complex::Complex64;
use nuray_math::fft::{irfft, rfft, rfft_frequencies};
use nuray_math::resample::{delay_trace, resample};
use nuray_types::config::ResolvedConfig;
use nuray_types::state::{ElectricFieldTrace, RayAmplitude, VoltageTrace};

/// Zero samples appended before a fractional shift so the cyclic delay
/// cannot wrap the pulse tail onto the front.
const SHIFT_PADDING: usize = 8;

#[derive(Debug, Clone)]
pub struct EfieldToVoltageConverter {
    internal_rate: f64,
    detector_rate: f64,
    readout_window: f64,
    pre_trigger_time: f64,
    amp_per_ray_solution: bool,
}

impl EfieldToVoltageConverter {
    pub fn new(config: &ResolvedConfig, detector: &DetectorDescription) -> Self {
        let time_res = config.speedup.time_res_efieldconverter;
        // The common grid is never coarser than the digitizer.
        let internal_rate = if time_res > 0.0 {
            (1.0 / time_res).max(detector.sampling_rate)
        } else {
            detector.sampling_rate
        };
        EfieldToVoltageConverter {
            internal_rate,
            detector_rate: detector.sampling_rate,
            readout_window: detector.readout_window(),
            pre_trigger_time: detector.pre_trigger_time,
            amp_per_ray_solution: config.speedup.amp_per_ray_solution,
        }
    }

    pub fn internal_rate(&self) -> f64 {
        self.internal_rate
    }

    /// Voltage traces of one channel. `fields` must all belong to that
    /// channel; the output is ordered by start time.
    pub fn convert(
        &self,
        channel_id: usize,
        fields: &[ElectricFieldTrace],
        response: &AntennaResponse,
    ) -> Vec<VoltageTrace> {
        self.group(fields)
            .into_iter()
            .map(|group| self.convert_group(channel_id, &group, response))
            .collect()
    }

    /// Fields grouped by arrival time into readout-window clusters.
    pub fn group<'a>(&self, fields: &'a [ElectricFieldTrace]) -> Vec<Vec<&'a ElectricFieldTrace>> {
        let arrivals: Vec<f64> = fields.iter().map(arrival).collect();
        self.group_arrivals(&arrivals)
            .into_iter()
            .map(|group| group.into_iter().map(|i| &fields[i]).collect())
            .collect()
    }

    /// Indices of `arrivals` [ns] clustered into readout windows, each
    /// group in increasing arrival order.
    pub fn group_arrivals(&self, arrivals: &[f64]) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..arrivals.len()).collect();
        order.sort_by(|&a, &b| arrivals[a].total_cmp(&arrivals[b]));

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_start = f64::NEG_INFINITY;
        for i in order {
            let t = arrivals[i];
            match groups.last_mut() {
                Some(current) if t - group_start <= self.readout_window => current.push(i),
                _ => {
                    group_start = t;
                    groups.push(vec![i]);
                }
            }
        }
        groups
    }

    /// Start of the readout opened by a pulse arriving at `first_arrival`.
    pub fn readout_start(&self, first_arrival: f64) -> f64 {
        first_arrival - self.pre_trigger_time
    }

    /// One voltage trace from a group produced by [`Self::group`].
    pub fn convert_group(
        &self,
        channel_id: usize,
        group: &[&ElectricFieldTrace],
        response: &AntennaResponse,
    ) -> VoltageTrace {
        let first = group.first().map(|f| arrival(f)).unwrap_or(0.0);
        let last = group.last().map(|f| arrival(f)).unwrap_or(first);
        self.convert_span(channel_id, first, last, group, response)
    }

    /// Voltage trace of the readout spanning arrivals `first..=last` [ns].
    /// `fields` may be any subset of the pulses in that span.
    pub fn convert_span(
        &self,
        channel_id: usize,
        first: f64,
        last: f64,
        fields: &[&ElectricFieldTrace],
        response: &AntennaResponse,
    ) -> VoltageTrace {
        let start_time = self.readout_start(first);
        let duration = (last - first).max(0.0) + self.readout_window;

        let n_detector = (duration * self.detector_rate).ceil().max(2.0) as usize;
        let n_internal = ((n_detector as f64) * self.internal_rate / self.detector_rate).round() as usize;
        let dt = 1.0 / self.internal_rate;

        let mut sum = Array1::<f64>::zeros(n_internal);
        let mut amplitudes = self.amp_per_ray_solution.then(Vec::new);

        for field in fields {
            let voltage = field_voltage(field, response);
            let mut upsampled = resample(voltage.as_slice().unwrap_or(&[]), field.sampling_rate, self.internal_rate).to_vec();

            let offset = (field.start_time - start_time) / dt;
            let whole = offset.floor();
            let fraction = (offset - whole) * dt;
            if fraction > 0.0 {
                upsampled.extend(std::iter::repeat(0.0).take(SHIFT_PADDING));
                upsampled = delay_trace(&upsampled, self.internal_rate, fraction).to_vec();
            }

            let whole = whole as i64;
            let mut peak = 0.0f64;
            for (i, v) in upsampled.iter().enumerate() {
                let j = whole + i as i64;
                if j >= 0 && (j as usize) < n_internal {
                    sum[j as usize] += v;
                    peak = peak.max(v.abs());
                }
            }
            if let Some(amps) = amplitudes.as_mut() {
                amps.push(RayAmplitude {
                    shower_index: field.shower_index,
                    ray_index: field.ray_index,
                    peak,
                });
            }
        }

        let samples = resample(sum.as_slice().unwrap_or(&[]), self.internal_rate, self.detector_rate);
        log::trace!(
            "channel {channel_id}: {} field(s) -> {} samples at t0 = {start_time:.1} ns",
            fields.len(),
            samples.len()
        );
        VoltageTrace {
            channel_id,
            start_time,
            sampling_rate: self.detector_rate,
            samples,
            ray_amplitudes: amplitudes,
        }
    }
}

/// Pulse arrival time: centre of the field trace.
fn arrival(field: &ElectricFieldTrace) -> f64 {
    field.start_time + 0.5 * field.n_samples() as f64 / field.sampling_rate
}

/// V(f) = H_theta(f) E_theta(f) + H_phi(f) E_phi(f), back in the time domain.
fn field_voltage(field: &ElectricFieldTrace, response: &AntennaResponse) -> Array1<f64> {
    let n = field.n_samples();
    let fs = field.sampling_rate;
    let zenith = field.receive_vector.zenith();
    let azimuth = field.receive_vector.azimuth();
    let spec_theta = rfft(field.e_theta.as_slice().unwrap_or(&[]), fs);
    let spec_phi = rfft(field.e_phi.as_slice().unwrap_or(&[]), fs);
    let freqs = rfft_frequencies(n, fs);
    let spectrum: Vec<Complex64> = freqs
        .iter()
        .zip(spec_theta.iter().zip(spec_phi.iter()))
        .map(|(&f, (&et, &ep))| {
            let (h_theta, h_phi) = response.effective_length(zenith, azimuth, f);
            et * h_theta + ep * h_phi
        })
        .collect();
    irfft(&spectrum, n, fs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{AntennaModel, Bandpass};
    use nuray_math::vector::Vec3;
    use nuray_types::config::SimulationConfig;

    fn detector() -> DetectorDescription {
        DetectorDescription::from_json_str(
            r#"{
                "sampling_rate": 2.0,
                "n_samples": 256,
                "pre_trigger_time": 40.0,
                "channels": [{"id": 0, "position": {"x": 0.0, "y": 0.0, "z": -100.0},
                              "antenna_model": "isotropic",
                              "bandpass": {"low": 0.05, "high": 1.0, "order": 8}}]
            }"#,
        )
        .unwrap()
    }

    fn config(amp_per_ray: bool) -> ResolvedConfig {
        let json = format!(r#"{{"speedup": {{"amp_per_ray_solution": {amp_per_ray}}}}}"#);
        SimulationConfig::from_json_str(&json).unwrap().resolve().unwrap()
    }

    fn response() -> AntennaResponse {
        AntennaResponse::new(
            AntennaModel::Isotropic,
            Vec3::EZ,
            2.0,
            Bandpass { low: 0.05, high: 1.0, order: 8 },
        )
    }

    /// Gaussian pulse (sigma 1 ns) centred in a 5 GHz field trace.
    fn field(start_time: f64, ray_index: usize, amplitude: f64) -> ElectricFieldTrace {
        let n = 512;
        let fs = 5.0;
        let centre = 0.5 * n as f64 / fs;
        let pulse = Array1::from_shape_fn(n, |i| {
            let t = i as f64 / fs - centre;
            amplitude * (-0.5 * t * t).exp() * t
        });
        ElectricFieldTrace {
            channel_id: 0,
            shower_index: 0,
            ray_index,
            start_time,
            sampling_rate: fs,
            e_theta: pulse,
            e_phi: Array1::zeros(n),
            viewing_angle: 0.96,
            receive_vector: Vec3::from_spherical(1.2, 0.0),
        }
    }

    #[test]
    fn test_single_field_output_grid() {
        let conv = EfieldToVoltageConverter::new(&config(true), &detector());
        assert!((conv.internal_rate() - 10.0).abs() < 1e-9);
        let traces = conv.convert(0, &[field(1000.0, 0, 1e-3)], &response());
        assert_eq!(traces.len(), 1);
        let v = &traces[0];
        assert_eq!(v.sampling_rate, 2.0);
        assert_eq!(v.n_samples(), 256);
        // Arrival = 1000 + 51.2 ns, readout starts pre_trigger earlier
        assert!((v.start_time - (1051.2 - 40.0)).abs() < 1e-9);
        assert!(v.max_abs() > 0.0);
        assert_eq!(v.ray_amplitudes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_pulse_lands_at_pre_trigger_time() {
        let conv = EfieldToVoltageConverter::new(&config(false), &detector());
        let v = &conv.convert(0, &[field(1000.0, 0, 1e-3)], &response())[0];
        let (i_peak, _) = v
            .samples
            .iter()
            .enumerate()
            .fold((0, 0.0f64), |best, (i, s)| if s.abs() > best.1 { (i, s.abs()) } else { best });
        let t_peak = v.time_of(i_peak);
        assert!((t_peak - 1051.2).abs() < 3.0, "peak at {t_peak}");
        assert!(v.ray_amplitudes.is_none());
    }

    #[test]
    fn test_overlapping_fields_superpose() {
        let conv = EfieldToVoltageConverter::new(&config(true), &detector());
        let single = conv.convert(0, &[field(1000.0, 0, 1e-3)], &response());
        let double = conv.convert(0, &[field(1000.0, 0, 1e-3), field(1000.0, 1, 1e-3)], &response());
        assert_eq!(double.len(), 1);
        let ratio = double[0].max_abs() / single[0].max_abs();
        assert!((ratio - 2.0).abs() < 1e-9, "ratio {ratio}");
        assert_eq!(double[0].ray_amplitudes.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_distant_fields_yield_separate_traces() {
        let conv = EfieldToVoltageConverter::new(&config(true), &detector());
        let traces = conv.convert(0, &[field(5000.0, 1, 1e-3), field(1000.0, 0, 1e-3)], &response());
        assert_eq!(traces.len(), 2);
        assert!(traces[0].start_time < traces[1].start_time);
        assert_eq!(traces[0].n_samples(), traces[1].n_samples());
    }

    #[test]
    fn test_fractional_shift_preserves_amplitude() {
        let conv = EfieldToVoltageConverter::new(&config(true), &detector());
        let a = conv.convert(0, &[field(1000.0, 0, 1e-3)], &response());
        let b = conv.convert(0, &[field(1000.0, 0, 1e-3), field(1030.05, 1, 1e-3)], &response());
        assert_eq!(b.len(), 1);
        let amps = b[0].ray_amplitudes.as_ref().unwrap();
        let first = a[0].ray_amplitudes.as_ref().unwrap()[0].peak;
        assert!((amps[1].peak - first).abs() / first < 0.02);
    }

    #[test]
    fn test_group_arrivals_returns_sorted_indices() {
        let conv = EfieldToVoltageConverter::new(&config(true), &detector());
        let groups = conv.group_arrivals(&[300.0, 100.0, 200.0, 500.0]);
        assert_eq!(groups, vec![vec![1, 2], vec![0], vec![3]]);
    }

    #[test]
    fn test_span_wider_than_fields_keeps_pulse_time() {
        let conv = EfieldToVoltageConverter::new(&config(true), &detector());
        let f = field(1000.0, 0, 1e-3);
        let v = conv.convert_span(0, 1030.0, 1050.0, &[&f], &response());
        assert_eq!(v.start_time, 990.0);
        assert_eq!(v.n_samples(), 296);
        let narrow = &conv.convert(0, std::slice::from_ref(&f), &response())[0];
        assert!((v.max_abs() - narrow.max_abs()).abs() / narrow.max_abs() < 0.1);
    }
}
