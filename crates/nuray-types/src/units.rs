// ─────────────────────────────────────────────────────────────────────
// Nuray — Units
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Internal unit system.
//!
//! Base units: metre, nanosecond, gigahertz, electronvolt, volt, kelvin.
//! Multiply a literal by a constant to convert *into* internal units,
//! divide to convert *out*.

use std::f64::consts::PI;

pub const M: f64 = 1.0;
pub const CM: f64 = 1e-2;
pub const KM: f64 = 1e3;

pub const NS: f64 = 1.0;
pub const S: f64 = 1e9;

pub const GHZ: f64 = 1.0;
pub const MHZ: f64 = 1e-3;
pub const HZ: f64 = 1e-9;

pub const EV: f64 = 1.0;
pub const GEV: f64 = 1e9;
pub const TEV: f64 = 1e12;
pub const PEV: f64 = 1e15;
pub const EEV: f64 = 1e18;

pub const V: f64 = 1.0;
pub const MV: f64 = 1e-3;
pub const MICRO_V: f64 = 1e-6;

pub const OHM: f64 = 1.0;

pub const DEG: f64 = PI / 180.0;
