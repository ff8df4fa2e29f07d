// ─────────────────────────────────────────────────────────────────────
// Nuray — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Speed of light in vacuum (m/ns).
pub const C_LIGHT: f64 = 0.299_792_458;

/// Boltzmann constant (J/K).
pub const K_BOLTZMANN: f64 = 1.380649e-23;

/// Avogadro number (1/mol). With target mass in g this is nucleons per gram.
pub const N_AVOGADRO: f64 = 6.02214076e23;

/// Mean Earth radius (m).
pub const R_EARTH: f64 = 6.371e6;

/// Characteristic impedance of the readout chain (Ohm).
pub const READOUT_IMPEDANCE: f64 = 50.0;

/// Refractive index of air at the surface.
pub const N_AIR: f64 = 1.000_293;

/// Landau-Pomeranchuk-Migdal energy in ice (eV).
pub const E_LPM_ICE: f64 = 2e15;
