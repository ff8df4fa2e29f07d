// ─────────────────────────────────────────────────────────────────────
// Nuray — Property-Based Tests (proptest) for nuray-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for nuray-math using proptest.
//!
//! Covers: interpolation bounds, FFT inversion, time-delay composition,
//! Brent root accuracy, vector basis orthonormality.

use nuray_math::fft::{irfft, rfft};
use nuray_math::interp::{interp1d, interp2d};
use nuray_math::resample::delay_trace;
use nuray_math::roots::brent;
use nuray_math::vector::{spherical_basis, Vec3};
use ndarray::Array2;
use proptest::prelude::*;

// ── Interpolation ────────────────────────────────────────────────────

proptest! {
    /// Linear interpolation never leaves the [min, max] range of the data.
    #[test]
    fn interp1d_bounded(
        ys in prop::collection::vec(-100.0f64..100.0, 2..20),
        x in -5.0f64..30.0,
    ) {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        let v = interp1d(&xs, &ys, x);
        let lo = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }

    /// Bilinear interpolation reproduces the table at every node.
    #[test]
    fn interp2d_exact_at_nodes(ny in 2usize..8, nx in 2usize..8, seed in 0u64..1000) {
        let ys: Vec<f64> = (0..ny).map(|i| i as f64 * 10.0).collect();
        let xs: Vec<f64> = (0..nx).map(|i| 0.1 + i as f64 * 0.2).collect();
        let field = Array2::from_shape_fn((ny, nx), |(i, j)| ((i * 31 + j * 7) as u64 ^ seed) as f64);
        for i in 0..ny {
            for j in 0..nx {
                let v = interp2d(&field, &ys, &xs, ys[i], xs[j]);
                prop_assert!((v - field[[i, j]]).abs() < 1e-9);
            }
        }
    }
}

// ── FFT ──────────────────────────────────────────────────────────────

proptest! {
    /// irfft(rfft(x)) == x for arbitrary lengths and sampling rates.
    #[test]
    fn fft_inverts(
        trace in prop::collection::vec(-1.0f64..1.0, 1..256),
        fs in 0.5f64..10.0,
    ) {
        let n = trace.len();
        let spectrum = rfft(&trace, fs);
        let back = irfft(spectrum.as_slice().unwrap(), n, fs);
        for (a, b) in trace.iter().zip(back.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    /// Delaying by dt1 then dt2 equals delaying by dt1 + dt2.
    #[test]
    fn delays_compose(dt1 in -5.0f64..5.0, dt2 in -5.0f64..5.0) {
        let fs = 4.0;
        let trace: Vec<f64> = (0..256)
            .map(|i| (-0.5 * ((i as f64 / fs - 32.0) / 2.0).powi(2)).exp())
            .collect();
        let two_step = delay_trace(delay_trace(&trace, fs, dt1).as_slice().unwrap(), fs, dt2);
        let one_step = delay_trace(&trace, fs, dt1 + dt2);
        for (a, b) in two_step.iter().zip(one_step.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }
}

// ── Roots & Vectors ──────────────────────────────────────────────────

proptest! {
    /// Brent finds the root of a shifted cubic to the requested tolerance.
    #[test]
    fn brent_cubic_root(r in -3.0f64..3.0) {
        let root = brent(|x| (x - r).powi(3) + (x - r), -10.0, 10.0, 1e-12, 200);
        prop_assert!(root.is_some());
        prop_assert!((root.unwrap() - r).abs() < 1e-9);
    }

    /// The spherical basis is orthonormal and right-handed.
    #[test]
    fn spherical_basis_orthonormal(
        zenith in 0.01f64..3.13,
        azimuth in 0.0f64..6.28,
    ) {
        let [er, et, ep] = spherical_basis(zenith, azimuth);
        for v in [er, et, ep] {
            prop_assert!((v.norm() - 1.0).abs() < 1e-12);
        }
        prop_assert!(er.dot(&et).abs() < 1e-12);
        prop_assert!(er.dot(&ep).abs() < 1e-12);
        prop_assert!(et.dot(&ep).abs() < 1e-12);
        prop_assert!(er.cross(&et).distance(&ep) < 1e-12);
        prop_assert!(er.distance(&Vec3::from_spherical(zenith, azimuth)) < 1e-12);
    }
}
