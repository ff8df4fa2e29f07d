//! Serialized results of a run.

use crate::speedup::CutStatistics;
use nuray_types::error::NurayResult;
use nuray_types::state::Event;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutReason {
    /// Earth-survival weight below `minimum_weight_cut`.
    Weight,
}

/// Everything one trajectory produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryOutcome {
    pub trajectory_index: u64,
    pub weight: f64,
    /// Any of the events triggered.
    pub triggered: bool,
    pub cut: Option<CutReason>,
    pub events: Vec<Event>,
}

impl TrajectoryOutcome {
    pub fn cut(trajectory_index: u64, weight: f64, reason: CutReason) -> Self {
        TrajectoryOutcome {
            trajectory_index,
            weight,
            triggered: false,
            cut: Some(reason),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub n_trajectories: usize,
    pub n_triggered: usize,
    /// Sum of weights of triggered trajectories.
    pub triggered_weight_sum: f64,
    pub n_events: usize,
    pub cuts: CutStatistics,
}

impl SimulationSummary {
    pub fn from_outcomes(outcomes: &[TrajectoryOutcome], cuts: CutStatistics) -> Self {
        let triggered = outcomes.iter().filter(|o| o.triggered);
        SimulationSummary {
            n_trajectories: outcomes.len(),
            n_triggered: triggered.clone().count(),
            triggered_weight_sum: triggered.map(|o| o.weight).sum(),
            n_events: outcomes.iter().map(|o| o.events.len()).sum(),
            cuts,
        }
    }
}

/// One JSON object per event and line. Returns the number of events written.
pub fn write_events_json<W: Write>(writer: &mut W, outcomes: &[TrajectoryOutcome]) -> NurayResult<usize> {
    let mut written = 0;
    for event in outcomes.iter().flat_map(|o| o.events.iter()) {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

pub fn write_events_file(path: impl AsRef<Path>, outcomes: &[TrajectoryOutcome]) -> NurayResult<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_events_json(&mut writer, outcomes)
}
