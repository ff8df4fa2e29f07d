//! Band-limited resampling and fractional time shifts in the frequency domain.

use crate::fft::{irfft, rfft, rfft_frequencies};
use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Resample a trace from `from_rate` to `to_rate` [GHz] by truncating or
/// zero-padding its spectrum. The trace duration is preserved.
pub fn resample(trace: &[f64], from_rate: f64, to_rate: f64) -> Array1<f64> {
    let n = trace.len();
    if n == 0 || (from_rate - to_rate).abs() < f64::EPSILON * from_rate {
        return Array1::from(trace.to_vec());
    }
    let n_new = ((n as f64) * to_rate / from_rate).round().max(1.0) as usize;
    let spectrum = rfft(trace, from_rate);
    let mut resized = vec![Complex64::new(0.0, 0.0); n_new / 2 + 1];
    let keep = resized.len().min(spectrum.len());
    resized[..keep].copy_from_slice(&spectrum.as_slice().unwrap_or(&[])[..keep]);
    irfft(&resized, n_new, to_rate)
}

/// Multiply a one-sided spectrum by `exp(-i 2 pi f dt)`, delaying the
/// corresponding time trace by `dt` [ns] (cyclically).
pub fn apply_time_delay(spectrum: &mut Array1<Complex64>, frequencies: &Array1<f64>, dt: f64) {
    for (s, &f) in spectrum.iter_mut().zip(frequencies.iter()) {
        *s *= Complex64::from_polar(1.0, -2.0 * PI * f * dt);
    }
}

/// Delay a real trace by `dt` [ns] using a frequency-domain phase ramp.
pub fn delay_trace(trace: &[f64], sampling_rate: f64, dt: f64) -> Array1<f64> {
    let n = trace.len();
    let mut spectrum = rfft(trace, sampling_rate);
    let freqs = rfft_frequencies(n, sampling_rate);
    apply_time_delay(&mut spectrum, &freqs, dt);
    irfft(spectrum.as_slice().unwrap_or(&[]), n, sampling_rate)
}
