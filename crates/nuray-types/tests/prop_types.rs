// ─────────────────────────────────────────────────────────────────────
// Nuray — Property-Based Tests (proptest) for nuray-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for nuray-types using proptest.
//!
//! Covers: shower energy bookkeeping, Earth entry geometry,
//! custom polarization normalization, config validation.

use nuray_math::vector::Vec3;
use nuray_types::config::{PolarizationMode, SimulationConfig};
use nuray_types::constants::R_EARTH;
use nuray_types::error::NurayError;
use nuray_types::state::{Flavor, InteractionType, Trajectory};
use proptest::prelude::*;

fn flavor_strategy() -> impl Strategy<Value = Flavor> {
    (0usize..6).prop_map(|i| Flavor::ALL[i])
}

// ── Trajectory Invariants ────────────────────────────────────────────

proptest! {
    /// Shower energies always sum to y E (NC, non-electron CC) or E (CC nu_e).
    #[test]
    fn shower_energy_bookkeeping(
        flavor in flavor_strategy(),
        cc in any::<bool>(),
        y in 0.0f64..1.0,
        log_e in 15.0f64..21.0,
    ) {
        let energy = 10f64.powf(log_e);
        let interaction = if cc { InteractionType::Cc } else { InteractionType::Nc };
        let t = Trajectory::new(0, 0.5, 0.1, Vec3::new(0.0, 0.0, -1000.0), flavor, energy, interaction, y);
        let expected = if cc && flavor.is_electron() { energy } else { y * energy };
        prop_assert!((t.shower_energy_sum() - expected).abs() <= 1e-9 * energy);
    }

    /// The entry point lies on the Earth sphere for any in-ice vertex.
    #[test]
    fn entry_point_on_sphere(
        zenith in 0.0f64..std::f64::consts::PI,
        azimuth in 0.0f64..(2.0 * std::f64::consts::PI),
        depth in 1.0f64..2800.0,
    ) {
        let t = Trajectory::new(
            7, zenith, azimuth, Vec3::new(300.0, -200.0, -depth),
            Flavor::NuMu, 1e18, InteractionType::Cc, 0.2,
        );
        let centre = Vec3::new(0.0, 0.0, -R_EARTH);
        prop_assert!((t.entry_point.distance(&centre) - R_EARTH).abs() < 1e-2);
        // Entry point lies on the arrival side of the vertex
        let to_entry = t.entry_point - t.vertex;
        prop_assert!(to_entry.dot(&t.arrival_direction()) >= -1e-6);
    }
}

// ── Configuration ────────────────────────────────────────────────────

proptest! {
    /// Custom polarization always satisfies eTheta^2 + ePhi^2 = 1.
    #[test]
    fn custom_polarization_unit_norm(e_phi in 0.0f64..=1.0) {
        match PolarizationMode::custom(e_phi) {
            Ok(PolarizationMode::Custom { e_theta, e_phi }) => {
                prop_assert!((e_theta * e_theta + e_phi * e_phi - 1.0).abs() < 1e-14);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    /// ePhi outside [0, 1] is rejected at resolve time.
    #[test]
    fn out_of_range_e_phi_rejected(e_phi in 1.0001f64..10.0, negative in any::<bool>()) {
        let value = if negative { -e_phi } else { e_phi };
        let doc = format!(r#"{{"signal": {{"polarization": "custom", "ePhi": {value}}}}}"#);
        let cfg = SimulationConfig::from_json_str(&doc).unwrap();
        prop_assert!(matches!(cfg.resolve(), Err(NurayError::ConfigError(_))));
    }

    /// Any positive Vrms alone resolves.
    #[test]
    fn vrms_alone_resolves(vrms in 1e-7f64..1e-3) {
        let doc = format!(r#"{{"trigger": {{"noise_temperature": null, "Vrms": {vrms}}}}}"#);
        let cfg = SimulationConfig::from_json_str(&doc).unwrap();
        prop_assert!(cfg.resolve().is_ok());
    }
}
