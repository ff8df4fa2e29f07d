// ─────────────────────────────────────────────────────────────────────
// Nuray — Simulation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Event generation, speedup cuts and the parallel per-trajectory pipeline.

pub mod generator;
pub mod output;
pub mod pipeline;
pub mod rng;
pub mod speedup;

pub use generator::{Cylinder, CylinderGenerator, EnergySpectrum};
pub use output::{write_events_file, write_events_json, CutReason, SimulationSummary, TrajectoryOutcome};
pub use pipeline::{RunOutput, Simulation, WorkerScratch};
pub use speedup::{CutStatistics, SpeedupController};
