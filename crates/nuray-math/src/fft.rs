//! Real-signal FFT wrappers around rustfft.
//!
//! Convention: spectra approximate the continuous Fourier transform.
//! - Forward (`rfft`): sum over samples divided by the sampling rate,
//!   so a trace in V gives a spectrum in V/GHz.
//! - Inverse (`irfft`): multiplies back by the sampling rate.
//!
//! Only the non-negative frequency half (n/2 + 1 bins) is stored.

use ndarray::Array1;
use num_complex::Complex64;
use rustfft::FftPlanner;

/// Frequencies [GHz] of the `n / 2 + 1` bins of a trace with `n` samples.
pub fn rfft_frequencies(n: usize, sampling_rate: f64) -> Array1<f64> {
    let df = sampling_rate / n.max(1) as f64;
    Array1::from_shape_fn(n / 2 + 1, |k| k as f64 * df)
}

/// Forward real FFT of a time trace sampled at `sampling_rate` [GHz].
pub fn rfft(trace: &[f64], sampling_rate: f64) -> Array1<Complex64> {
    let n = trace.len();
    if n == 0 {
        return Array1::zeros(1);
    }
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex64> = trace.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    fft.process(&mut buffer);

    let norm = 1.0 / sampling_rate;
    Array1::from_shape_fn(n / 2 + 1, |k| buffer[k] * norm)
}

/// Inverse of [`rfft`]: rebuilds an `n`-sample real trace.
///
/// `spectrum` must hold at least `n / 2 + 1` bins; extra bins are ignored,
/// missing bins are treated as zero.
pub fn irfft(spectrum: &[Complex64], n: usize, sampling_rate: f64) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    let half = n / 2;
    let bin = |k: usize| spectrum.get(k).copied().unwrap_or_default();

    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    for (k, slot) in buffer.iter_mut().enumerate().take(half + 1) {
        *slot = bin(k);
    }
    for k in (half + 1)..n {
        buffer[k] = bin(n - k).conj();
    }
    // DC and (even-n) Nyquist bins of a real signal are real.
    buffer[0].im = 0.0;
    if n % 2 == 0 {
        buffer[half].im = 0.0;
    }

    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut buffer);

    let norm = sampling_rate / n as f64;
    buffer.iter().map(|c| c.re * norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rfft_roundtrip_even_and_odd() {
        for n in [64usize, 63] {
            let trace: Vec<f64> = (0..n).map(|i| (0.3 * i as f64).sin() + 0.1 * i as f64).collect();
            let spectrum = rfft(&trace, 2.0);
            assert_eq!(spectrum.len(), n / 2 + 1);
            let back = irfft(spectrum.as_slice().unwrap(), n, 2.0);
            for (a, b) in trace.iter().zip(back.iter()) {
                assert!((a - b).abs() < 1e-10, "roundtrip mismatch {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_rfft_dc_scaling() {
        // Constant 1 V over 10 ns sampled at 1 GHz -> DC bin = 10 V/GHz
        let trace = vec![1.0; 10];
        let spectrum = rfft(&trace, 1.0);
        assert!((spectrum[0].re - 10.0).abs() < 1e-12);
        assert!(spectrum[0].im.abs() < 1e-12);
    }

    #[test]
    fn test_single_tone_peak_bin() {
        let n = 128;
        let fs = 1.0;
        let f = 8.0 * fs / n as f64;
        let trace: Vec<f64> = (0..n).map(|i| (2.0 * PI * f * i as f64 / fs).cos()).collect();
        let spectrum = rfft(&trace, fs);
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 8);
        let freqs = rfft_frequencies(n, fs);
        assert!((freqs[peak] - f).abs() < 1e-14);
    }
}
