// ─────────────────────────────────────────────────────────────────────
// Nuray — Attenuation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radio attenuation length of ice as a function of depth and frequency,
//! and the precomputed (depth, frequency) table used during tracing.

use ndarray::Array2;
use nuray_math::interp::interp2d;
use nuray_types::config::AttenuationModelKind;
use nuray_types::units::{GHZ, MHZ};

/// Depth spacing of the attenuation table [m].
pub const TABLE_DEPTH_STEP: f64 = 10.0;

/// Shortest attenuation length any model may return [m].
const MIN_LENGTH: f64 = 1.0;

/// Lowest frequency the SP1 fit is evaluated at [GHz].
const SP1_F_MIN: f64 = 1e-4 * GHZ;

/// South Pole ice temperature [deg C] at depth `z` [m] (z <= 0).
pub fn south_pole_temperature(z: f64) -> f64 {
    let d = z.abs();
    1.83415e-9 * d.powi(3) - 1.59061e-8 * d * d + 0.00267687 * d - 51.0696
}

/// Attenuation length [m] at depth `z` [m] and `frequency` [GHz].
///
/// - `Sp1`: South Pole, temperature-dependent log-log fit.
/// - `Gl1`: Summit Station bulk average, L = 1154 m - 0.81 m/MHz * f
///   (Avva et al., J. Glaciol. 61 (2015) 1005). Depth independent.
/// - `Mb1`: Moore's Bay bulk average, L = 460 m - 180 m/GHz * f
///   (Barwick et al., J. Glaciol. 51 (2005) 231). Depth independent.
///
/// The two linear fits were measured between roughly 75 MHz and 1 GHz.
/// Outside that range they are extrapolations and fall to the 1 m floor
/// above about 1.4 GHz (GL1) and 2.5 GHz (MB1).
pub fn attenuation_length(model: AttenuationModelKind, z: f64, frequency: f64) -> f64 {
    let length = match model {
        AttenuationModelKind::Sp1 => sp1(z, frequency),
        AttenuationModelKind::Gl1 => 1154.0 - 0.81 * frequency / MHZ,
        AttenuationModelKind::Mb1 => 460.0 - 180.0 * frequency / GHZ,
    };
    if length.is_finite() {
        length.max(MIN_LENGTH)
    } else {
        MIN_LENGTH
    }
}

/// Temperature-dependent two-segment log-log fit, knee at 1 GHz.
fn sp1(z: f64, frequency: f64) -> f64 {
    let t = south_pole_temperature(z);
    let w0 = (1e-4f64).ln();
    let w1 = 0.0;
    let w2 = (3.16f64).ln();
    let w = (frequency.max(SP1_F_MIN) / GHZ).ln();

    let b0 = -6.74890 + t * (0.026709 - t * 0.000884);
    let b1 = -6.22121 - t * (0.070927 + t * 0.001773);
    let b2 = -4.09468 - t * (0.002213 + t * 0.000332);

    let (a, slope) = if frequency < GHZ {
        ((b1 * w0 - b0 * w1) / (w0 - w1), (b1 - b0) / (w1 - w0))
    } else {
        ((b2 * w1 - b1 * w2) / (w1 - w2), (b2 - b1) / (w2 - w1))
    };
    1.0 / (a + slope * w).exp()
}

/// Attenuation lengths on a (depth, frequency) grid.
///
/// Built once per run; exact at grid nodes and bilinear in between.
#[derive(Debug, Clone)]
pub struct AttenuationLengthTable {
    /// Positive depths [m], increasing from the surface.
    depths: Vec<f64>,
    /// Reference frequencies [GHz], increasing.
    frequencies: Vec<f64>,
    /// lengths[[i_depth, i_freq]] [m]
    lengths: Array2<f64>,
}

impl AttenuationLengthTable {
    pub fn build(model: AttenuationModelKind, thickness: f64, frequencies: &[f64]) -> Self {
        let n_steps = (thickness / TABLE_DEPTH_STEP).ceil().max(1.0) as usize;
        let depths: Vec<f64> = (0..=n_steps)
            .map(|i| (i as f64 * TABLE_DEPTH_STEP).min(thickness))
            .collect();
        let lengths = Array2::from_shape_fn((depths.len(), frequencies.len()), |(i, j)| {
            attenuation_length(model, -depths[i], frequencies[j])
        });
        log::debug!(
            "attenuation table {:?}: {} depths x {} frequencies",
            model,
            depths.len(),
            frequencies.len()
        );
        AttenuationLengthTable {
            depths,
            frequencies: frequencies.to_vec(),
            lengths,
        }
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Attenuation length [m] at depth `z` [m] (z <= 0) and `frequency` [GHz].
    pub fn length(&self, z: f64, frequency: f64) -> f64 {
        interp2d(&self.lengths, &self.depths, &self.frequencies, -z, frequency)
    }

    /// Length at table node (`i_depth`, `i_freq`).
    pub fn node(&self, i_depth: usize, i_freq: usize) -> f64 {
        self.lengths[[i_depth, i_freq]]
    }

    pub fn depth_of(&self, i_depth: usize) -> f64 {
        self.depths[i_depth]
    }

    pub fn n_depths(&self) -> usize {
        self.depths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sp1_surface_length_plausible() {
        let l = attenuation_length(AttenuationModelKind::Sp1, 0.0, 0.3);
        assert!(l > 1000.0 && l < 3000.0, "L = {l}");
    }

    #[test]
    fn test_sp1_decreases_with_depth_and_frequency() {
        let m = AttenuationModelKind::Sp1;
        assert!(attenuation_length(m, -200.0, 0.3) > attenuation_length(m, -2500.0, 0.3));
        assert!(attenuation_length(m, -500.0, 0.1) > attenuation_length(m, -500.0, 0.8));
    }

    #[test]
    fn test_bulk_fits_depth_independent_and_floored() {
        let gl = AttenuationModelKind::Gl1;
        assert!((attenuation_length(gl, -100.0, 0.3) - 911.0).abs() < 1e-9);
        assert_eq!(attenuation_length(gl, -100.0, 0.3), attenuation_length(gl, -2900.0, 0.3));
        assert_eq!(attenuation_length(gl, -100.0, 1.5), MIN_LENGTH);
        let mb = AttenuationModelKind::Mb1;
        assert!((attenuation_length(mb, -300.0, 0.5) - 370.0).abs() < 1e-9);
        assert_eq!(attenuation_length(mb, -300.0, 3.0), MIN_LENGTH);
    }

    #[test]
    fn test_temperature_profile() {
        assert!((south_pole_temperature(0.0) + 51.0696).abs() < 1e-12);
        assert!(south_pole_temperature(-2500.0) > -20.0);
    }

    #[test]
    fn test_table_exact_at_nodes() {
        let freqs = [0.1, 0.3, 0.5, 1.2];
        for model in [AttenuationModelKind::Sp1, AttenuationModelKind::Gl1, AttenuationModelKind::Mb1] {
            let table = AttenuationLengthTable::build(model, 1000.0, &freqs);
            for i in [0, 7, table.n_depths() - 1] {
                let z = -table.depth_of(i);
                for (j, &f) in freqs.iter().enumerate() {
                    let direct = attenuation_length(model, z, f);
                    assert!((table.length(z, f) - direct).abs() < 1e-9 * direct);
                    assert_eq!(table.node(i, j), direct);
                }
            }
        }
    }

    #[test]
    fn test_table_bounded_between_nodes() {
        let freqs = [0.1, 0.4, 0.9];
        let table = AttenuationLengthTable::build(AttenuationModelKind::Sp1, 500.0, &freqs);
        let l = table.length(-105.0, 0.25);
        let corners = [
            table.length(-100.0, 0.1),
            table.length(-100.0, 0.4),
            table.length(-110.0, 0.1),
            table.length(-110.0, 0.4),
        ];
        let lo = corners.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(l >= lo && l <= hi);
    }
}
