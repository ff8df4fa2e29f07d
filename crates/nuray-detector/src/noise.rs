// ─────────────────────────────────────────────────────────────────────
// Nuray — Noise
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Thermal noise and recorded forced-trigger noise.
//!
//! Thermal RMS: Vrms = sqrt(k_B T R B_eff), R = 50 Ohm,
//! B_eff = integral of |B(f)|^2 df over the channel bandpass.
//!
//! Thermal noise is drawn in the frequency domain: every bin gets a complex
//! Gaussian amplitude (Rayleigh modulus, uniform phase) shaped by |B(f)|,
//! scaled so the expected RMS of the time trace is Vrms.

use crate::detector::{Bandpass, DetectorDescription};
use ndarray::Array1;
use num_complex::Complex64;
use nuray_math::fft::{irfft, rfft_frequencies};
use nuray_math::quadrature::GaussLegendre;
use nuray_types::constants::{K_BOLTZMANN, READOUT_IMPEDANCE};
use nuray_types::error::{NurayError, NurayResult};
use nuray_types::units::HZ;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Deserialize;
use std::path::Path;

/// Upper integration limit of B_eff in units of the high corner.
const BANDWIDTH_SPAN: f64 = 32.0;

/// Quadrature segments for B_eff.
const BANDWIDTH_SEGMENTS: usize = 256;

/// Effective bandwidth [GHz] of a bandpass.
pub fn effective_bandwidth(bandpass: &Bandpass) -> f64 {
    let gl = GaussLegendre::new(8);
    let f_max = BANDWIDTH_SPAN * bandpass.high;
    let step = f_max / BANDWIDTH_SEGMENTS as f64;
    (0..BANDWIDTH_SEGMENTS)
        .map(|i| {
            let a = i as f64 * step;
            gl.integrate(|f| bandpass.gain(f).powi(2), a, a + step)
        })
        .sum()
}

/// Thermal noise RMS [V] for temperature [K] through `bandpass`.
pub fn thermal_vrms(temperature: f64, bandpass: &Bandpass) -> f64 {
    let bandwidth_hz = effective_bandwidth(bandpass) / HZ;
    (K_BOLTZMANN * temperature * READOUT_IMPEDANCE * bandwidth_hz).sqrt()
}

/// Band-limited thermal noise of `n` samples at `sampling_rate` [GHz] with
/// expected RMS `vrms`.
pub fn thermal_noise<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    sampling_rate: f64,
    vrms: f64,
    bandpass: &Bandpass,
) -> Array1<f64> {
    if n < 2 || vrms <= 0.0 {
        return Array1::zeros(n);
    }
    let freqs = rfft_frequencies(n, sampling_rate);
    let last = freqs.len() - 1;
    let nyquist_bin = n % 2 == 0;
    let mut spectrum = Vec::with_capacity(freqs.len());
    let mut expected_power = 0.0;
    for (k, &f) in freqs.iter().enumerate() {
        // DC and the Nyquist bin cannot carry a random phase.
        if k == 0 || (nyquist_bin && k == last) {
            spectrum.push(Complex64::new(0.0, 0.0));
            continue;
        }
        let g = bandpass.gain(f);
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        spectrum.push(Complex64::new(re * g, im * g));
        // Bin and its mirror, each with E|X|^2 = 2 g^2
        expected_power += 4.0 * g * g;
    }
    if expected_power <= 0.0 {
        return Array1::zeros(n);
    }
    let norm = sampling_rate / n as f64;
    let scale = vrms / (norm * expected_power.sqrt());
    for bin in spectrum.iter_mut() {
        *bin *= scale;
    }
    irfft(&spectrum, n, sampling_rate)
}

#[derive(Debug, Deserialize)]
struct RecordedNoiseFile {
    sampling_rate: f64,
    /// events[event][channel][sample] [V]
    events: Vec<Vec<Vec<f64>>>,
}

/// Measured forced-trigger waveforms used in place of thermal noise.
///
/// JSON layout: `{"sampling_rate": 2.0, "events": [[[v, ...], ...], ...]}`.
#[derive(Debug, Clone)]
pub struct RecordedNoiseLibrary {
    sampling_rate: f64,
    events: Vec<Vec<Array1<f64>>>,
    n_channels: usize,
}

impl RecordedNoiseLibrary {
    pub fn from_file(path: impl AsRef<Path>) -> NurayResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let library = Self::from_json_str(&contents)?;
        log::info!(
            "loaded {} recorded noise events ({} channels) from {}",
            library.n_events(),
            library.n_channels(),
            path.display()
        );
        Ok(library)
    }

    pub fn from_json_str(json: &str) -> NurayResult<Self> {
        let file: RecordedNoiseFile = serde_json::from_str(json)?;
        if file.events.is_empty() {
            return Err(NurayError::ConfigError("recorded noise library has no events".into()));
        }
        let n_channels = file.events[0].len();
        if n_channels == 0 || file.events.iter().any(|e| e.len() != n_channels) {
            return Err(NurayError::ConfigError(
                "recorded noise events must all have the same, non-zero channel count".into(),
            ));
        }
        let events = file
            .events
            .into_iter()
            .map(|event| event.into_iter().map(Array1::from).collect())
            .collect();
        Ok(RecordedNoiseLibrary {
            sampling_rate: file.sampling_rate,
            events,
            n_channels,
        })
    }

    pub fn n_events(&self) -> usize {
        self.events.len()
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Recorded traces must share the digitizer rate.
    pub fn check_detector(&self, detector: &DetectorDescription) -> NurayResult<()> {
        if (self.sampling_rate - detector.sampling_rate).abs() > 1e-9 * detector.sampling_rate {
            return Err(NurayError::ConfigError(format!(
                "recorded noise sampled at {} GHz, detector at {} GHz",
                self.sampling_rate, detector.sampling_rate
            )));
        }
        Ok(())
    }

    /// A randomly chosen recorded trace for `channel_id`.
    ///
    /// Channel ids beyond the recorded channel count wrap around. Returns
    /// `None` (with a warning) when the recorded length differs from
    /// `n_samples`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, channel_id: usize, n_samples: usize) -> Option<Array1<f64>> {
        let event = &self.events[rng.gen_range(0..self.events.len())];
        let index = if channel_id >= self.n_channels {
            let wrapped = channel_id % self.n_channels;
            log::warn!(
                "channel {channel_id} not in recorded noise ({} channels), using channel {wrapped}",
                self.n_channels
            );
            wrapped
        } else {
            channel_id
        };
        let trace = &event[index];
        if trace.len() != n_samples {
            log::warn!(
                "recorded noise has {} samples, trace has {n_samples}; channel {channel_id} left without noise",
                trace.len()
            );
            return None;
        }
        Some(trace.clone())
    }
}
