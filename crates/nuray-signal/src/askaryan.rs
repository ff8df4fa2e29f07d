// ─────────────────────────────────────────────────────────────────────
// Nuray — Askaryan Emission
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Frequency-domain Askaryan field of a shower (ZHS / Alvarez-Muniz form).
//!
//! |E(f)| R = A0 (E / TeV) (f / f0) / (1 + (f / f0)^1.44)
//!           * exp(-ln 2 ((theta - theta_c) / dtheta)^2) * sin(theta) / sin(theta_c)
//!
//! with A0 = 2.53e-7 V/m/MHz and f0 = 1.15 GHz. The angular half-width
//! dtheta depends on the shower type, energy and frequency.

use nuray_types::config::SignalModelKind;
use nuray_types::constants::E_LPM_ICE;
use nuray_types::state::ShowerType;
use nuray_types::units::{DEG, GHZ, MHZ, TEV};
use std::f64::consts::LN_2;

/// Normalization [V/m/GHz] per TeV at 1 m (2.53e-7 V/m/MHz).
const AMPLITUDE_NORM: f64 = 2.53e-7 / MHZ;

/// One-sided spectrum convention.
const ONE_SIDED: f64 = 0.5;

/// Spectral turnover frequency.
const F0: f64 = 1.15 * GHZ;

/// Reference frequency of the angular-width parametrizations.
const F_REF: f64 = 500.0 * MHZ;

/// Energy above which EM showers are further elongated in the 2009 model [eV].
const LPM_ELONGATION_THRESHOLD: f64 = 1e19;

/// Cherenkov angle for refractive index `n`.
pub fn cherenkov_angle(n: f64) -> f64 {
    (1.0 / n).acos()
}

/// Angular half-width [rad] of the Cherenkov cone at `frequency` [GHz].
pub fn angular_width(kind: SignalModelKind, shower_type: ShowerType, energy: f64, frequency: f64) -> f64 {
    let scale = F_REF / frequency;
    match shower_type {
        ShowerType::Em => {
            let lpm = (E_LPM_ICE / (0.14 * energy + E_LPM_ICE)).powf(0.3);
            let mut width = 2.7 * DEG * scale * lpm;
            if kind == SignalModelKind::Alvarez2009 && energy > LPM_ELONGATION_THRESHOLD {
                width *= (LPM_ELONGATION_THRESHOLD / energy).powf(0.2);
            }
            width
        }
        ShowerType::Had => {
            let eps = (energy / TEV).max(1e-3).log10();
            let degrees = if eps <= 0.0 {
                2.07
            } else if eps < 2.0 {
                2.07 - 0.33 * eps + 0.075 * eps * eps
            } else if eps < 5.0 {
                1.74 - 0.0121 * eps
            } else if eps < 7.0 {
                4.23 - 0.785 * eps + 0.055 * eps * eps
            } else {
                let at7 = 4.23 - 0.785 * 7.0 + 0.055 * 49.0;
                at7 * (1.0 + (eps - 7.0) * 0.075)
            };
            degrees * DEG * scale
        }
    }
}

/// Spectral amplitude [V/m/GHz] at 1 m for a shower of `energy` [eV]
/// seen at `viewing_angle` [rad] in a medium of index `n`.
pub fn spectral_amplitude(
    kind: SignalModelKind,
    shower_type: ShowerType,
    energy: f64,
    viewing_angle: f64,
    n: f64,
    frequency: f64,
) -> f64 {
    if frequency <= 0.0 || energy <= 0.0 {
        return 0.0;
    }
    let theta_c = cherenkov_angle(n);
    let x = frequency / F0;
    let shape = x / (1.0 + x.powf(1.44));
    let width = angular_width(kind, shower_type, energy, frequency);
    let offset = (viewing_angle - theta_c) / width;
    let cone = (-LN_2 * offset * offset).exp();
    let projection = viewing_angle.sin() / theta_c.sin();
    ONE_SIDED * AMPLITUDE_NORM * (energy / TEV) * shape * cone * projection
}
