// ─────────────────────────────────────────────────────────────────────
// Nuray — Detector
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Station model: from electric fields at the antennas to triggered,
//! split digitizer events.

pub mod antenna;
pub mod converter;
pub mod detector;
pub mod noise;
pub mod splitter;
pub mod trigger;

pub use antenna::AntennaResponse;
pub use converter::EfieldToVoltageConverter;
pub use detector::{AntennaModel, Bandpass, ChannelDescription, DetectorDescription};
pub use noise::RecordedNoiseLibrary;
pub use splitter::EventSplitter;
pub use trigger::{TriggerDecision, TriggerSimulator};
