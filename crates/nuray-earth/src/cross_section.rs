// ─────────────────────────────────────────────────────────────────────
// Nuray — Cross Sections
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Deep-inelastic neutrino-nucleon cross sections.
//!
//! Three parametrizations:
//! - Ghandi et al. (1998) power laws in E/GeV.
//! - Connolly, Thorne, Waters (2011) fit in log10(E/GeV).
//! - Cooper-Sarkar, Mertsch, Sarkar (2011) table, log-log interpolated.
//!
//! All results in cm^2.

use nuray_math::interp::interp1d_loglog;
use nuray_types::config::CrossSectionType;
use nuray_types::state::{Flavor, InteractionType};
use nuray_types::units::GEV;

/// 1 pb in cm^2.
const PICOBARN: f64 = 1e-36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Cc,
    Nc,
    Total,
}

impl From<InteractionType> for InteractionKind {
    fn from(t: InteractionType) -> Self {
        match t {
            InteractionType::Cc => InteractionKind::Cc,
            InteractionType::Nc => InteractionKind::Nc,
        }
    }
}

// ── Ghandi power laws: (normalization [cm^2], exponent) ──────────────

const GHANDI_NU_CC: (f64, f64) = (2.69e-36, 0.402);
const GHANDI_NU_NC: (f64, f64) = (1.06e-36, 0.408);
const GHANDI_NUBAR_CC: (f64, f64) = (2.53e-36, 0.404);
const GHANDI_NUBAR_NC: (f64, f64) = (0.98e-36, 0.410);
const GHANDI_TOTAL: (f64, f64) = (7.84e-36, 0.363);

// ── CTW: (c0, c1, c2, c3, c4) ────────────────────────────────────────

const CTW_NU_CC: [f64; 5] = [-1.826, -17.31, -6.406, 1.431, -17.91];
const CTW_NU_NC: [f64; 5] = [-1.826, -17.31, -6.448, 1.431, -18.61];
const CTW_NUBAR_CC: [f64; 5] = [-1.033, -15.95, -7.247, 1.569, -17.72];
const CTW_NUBAR_NC: [f64; 5] = [-1.033, -15.95, -7.296, 1.569, -18.30];

// ── CSMS table [GeV] -> [pb] ─────────────────────────────────────────

const CSMS_ENERGY_GEV: [f64; 32] = [
    5e1, 1e2, 2e2, 5e2, 1e3, 2e3, 5e3, 1e4, 2e4, 5e4, 1e5, 2e5, 5e5, 1e6, 2e6, 5e6, 1e7, 2e7,
    5e7, 1e8, 2e8, 5e8, 1e9, 2e9, 5e9, 1e10, 2e10, 5e10, 1e11, 2e11, 5e11, 1e12,
];
const CSMS_NU_CC: [f64; 32] = [
    0.32, 0.65, 1.3, 3.2, 6.2, 12.0, 27.0, 47.0, 77.0, 140.0, 210.0, 310.0, 490.0, 690.0, 950.0,
    1400.0, 1900.0, 2600.0, 3700.0, 4800.0, 6200.0, 8700.0, 11000.0, 14000.0, 19000.0, 24000.0,
    30000.0, 41000.0, 51000.0, 63000.0, 82000.0, 100000.0,
];
const CSMS_NU_NC: [f64; 32] = [
    0.10, 0.20, 0.41, 1.0, 2.0, 3.8, 8.6, 15.0, 25.0, 47.0, 71.0, 100.0, 170.0, 240.0, 330.0,
    510.0, 690.0, 930.0, 1400.0, 1800.0, 2400.0, 3400.0, 4400.0, 5600.0, 7700.0, 9800.0, 12000.0,
    17000.0, 21000.0, 27000.0, 35000.0, 43000.0,
];
const CSMS_NUBAR_CC: [f64; 32] = [
    0.15, 0.33, 0.69, 1.7, 3.3, 6.5, 15.0, 28.0, 49.0, 96.0, 150.0, 230.0, 380.0, 550.0, 790.0,
    1200.0, 1700.0, 2300.0, 3500.0, 4600.0, 6100.0, 8600.0, 11000.0, 14000.0, 19000.0, 24000.0,
    30000.0, 41000.0, 51000.0, 63000.0, 82000.0, 100000.0,
];
const CSMS_NUBAR_NC: [f64; 32] = [
    0.05, 0.12, 0.24, 0.61, 1.2, 2.4, 5.6, 10.0, 18.0, 35.0, 55.0, 85.0, 140.0, 210.0, 300.0,
    470.0, 650.0, 900.0, 1300.0, 1800.0, 2300.0, 3300.0, 4300.0, 5500.0, 7700.0, 9800.0, 12000.0,
    17000.0, 21000.0, 27000.0, 35000.0, 43000.0,
];

/// Cross-section parametrization, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossSectionModel {
    kind: CrossSectionType,
}

impl CrossSectionModel {
    pub fn new(kind: CrossSectionType) -> Self {
        CrossSectionModel { kind }
    }

    pub fn kind(&self) -> CrossSectionType {
        self.kind
    }

    /// Cross section [cm^2] for a neutrino of `energy` [eV].
    pub fn cross_section(&self, energy: f64, flavor: Flavor, kind: InteractionKind) -> f64 {
        let anti = flavor.is_antineutrino();
        let e_gev = energy / GEV;
        match kind {
            InteractionKind::Total => match self.kind {
                CrossSectionType::Ghandi => power_law(GHANDI_TOTAL, e_gev),
                _ => {
                    self.cross_section(energy, flavor, InteractionKind::Cc)
                        + self.cross_section(energy, flavor, InteractionKind::Nc)
                }
            },
            InteractionKind::Cc | InteractionKind::Nc => {
                let cc = kind == InteractionKind::Cc;
                match self.kind {
                    CrossSectionType::Ghandi => {
                        let coeffs = match (anti, cc) {
                            (false, true) => GHANDI_NU_CC,
                            (false, false) => GHANDI_NU_NC,
                            (true, true) => GHANDI_NUBAR_CC,
                            (true, false) => GHANDI_NUBAR_NC,
                        };
                        power_law(coeffs, e_gev)
                    }
                    CrossSectionType::Ctw => {
                        let coeffs = match (anti, cc) {
                            (false, true) => &CTW_NU_CC,
                            (false, false) => &CTW_NU_NC,
                            (true, true) => &CTW_NUBAR_CC,
                            (true, false) => &CTW_NUBAR_NC,
                        };
                        ctw(coeffs, e_gev)
                    }
                    CrossSectionType::Csms => {
                        let table = match (anti, cc) {
                            (false, true) => &CSMS_NU_CC,
                            (false, false) => &CSMS_NU_NC,
                            (true, true) => &CSMS_NUBAR_CC,
                            (true, false) => &CSMS_NUBAR_NC,
                        };
                        interp1d_loglog(&CSMS_ENERGY_GEV, table, e_gev) * PICOBARN
                    }
                }
            }
        }
    }

    /// Charged-current share of the total interaction rate.
    pub fn cc_fraction(&self, energy: f64, flavor: Flavor) -> f64 {
        let cc = self.cross_section(energy, flavor, InteractionKind::Cc);
        let nc = self.cross_section(energy, flavor, InteractionKind::Nc);
        cc / (cc + nc)
    }
}

fn power_law((norm, exponent): (f64, f64), e_gev: f64) -> f64 {
    norm * e_gev.powf(exponent)
}

fn ctw(c: &[f64; 5], e_gev: f64) -> f64 {
    let l = (e_gev.log10() - c[0]).ln();
    10f64.powf(c[1] + c[2] * l + c[3] * l * l + c[4] / l)
}
