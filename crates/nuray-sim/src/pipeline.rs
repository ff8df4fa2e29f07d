// ─────────────────────────────────────────────────────────────────────
// Nuray — Simulation Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-trajectory pipeline and the parallel runner.
//!
//! trajectory -> Earth survival weight -> weight cut -> per channel and
//! shower: distance cut, ray tracing, Cherenkov cut, signal -> readout
//! windows from all ray arrivals -> amplitude gate per window -> voltage
//! conversion -> event splitting -> noise and trigger per event.
//!
//! Shared state is read-only; each rayon worker owns a [`WorkerScratch`]
//! (ray-solution cache and cut counters). Noise is drawn from streams keyed
//! by (seed, trajectory, event, channel), so results do not depend on the
//! thread count.

use crate::output::{CutReason, SimulationSummary, TrajectoryOutcome};
use crate::rng::{stream, StreamPurpose};
use crate::speedup::{CutStatistics, SpeedupController};
use nuray_detector::{
    AntennaResponse, DetectorDescription, EfieldToVoltageConverter, EventSplitter, RecordedNoiseLibrary,
    TriggerSimulator,
};
use nuray_earth::EarthAttenuationModel;
use nuray_math::vector::Vec3;
use nuray_propagation::cache::RaySolutionCache;
use nuray_propagation::RayTracingEngine;
use nuray_signal::SignalModel;
use nuray_types::config::ResolvedConfig;
use nuray_types::error::NurayResult;
use nuray_types::state::{ElectricFieldTrace, Event, Trajectory, VoltageTrace};
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Antenna {
    channel_id: usize,
    position: Vec3,
    response: AntennaResponse,
}

/// A ray reaching one channel. `field` is `None` when the Cherenkov cut
/// skipped the signal computation.
#[derive(Debug)]
struct RayArrival {
    /// Pulse arrival [ns].
    arrival: f64,
    field: Option<ElectricFieldTrace>,
}

/// One readout window of a channel. `voltage` is `None` when the amplitude
/// gate (or the Cherenkov cut on every ray) skipped the conversion.
#[derive(Debug)]
struct Readout {
    start_time: f64,
    voltage: Option<VoltageTrace>,
    fields: Vec<ElectricFieldTrace>,
}

/// Mutable per-worker state.
#[derive(Debug, Default)]
pub struct WorkerScratch {
    cache: RaySolutionCache,
    stats: CutStatistics,
}

impl WorkerScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &CutStatistics {
        &self.stats
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    /// In trajectory order.
    pub outcomes: Vec<TrajectoryOutcome>,
    pub summary: SimulationSummary,
}

pub struct Simulation {
    config: ResolvedConfig,
    detector: DetectorDescription,
    earth: EarthAttenuationModel,
    propagation: RayTracingEngine,
    signal: SignalModel,
    converter: EfieldToVoltageConverter,
    trigger: TriggerSimulator,
    splitter: EventSplitter,
    speedup: SpeedupController,
    antennas: Vec<Antenna>,
}

impl Simulation {
    pub fn new(
        config: ResolvedConfig,
        detector: DetectorDescription,
        noise_library: Option<RecordedNoiseLibrary>,
    ) -> NurayResult<Self> {
        detector.validate()?;
        let propagation = RayTracingEngine::from_config(&config)?;
        let trigger = TriggerSimulator::new(&config, &detector, noise_library.map(Arc::new))?;

        // Field traces cover one readout window at the internal rate
        let n_field = (detector.readout_window() * config.sampling_rate).ceil() as usize;
        let signal = SignalModel::new(&config, n_field + n_field % 2);

        let antennas = detector
            .channels
            .iter()
            .map(|ch| Antenna {
                channel_id: ch.id,
                position: ch.position,
                response: AntennaResponse::for_channel(ch),
            })
            .collect();

        log::info!(
            "simulation ready: {} channels, ice {:?}, signal {:?}, trigger {:?}, noise {}",
            detector.channels.len(),
            config.propagation.ice_model,
            config.signal.model,
            trigger.logic(),
            if trigger.noise_enabled() { "on" } else { "off" }
        );

        Ok(Simulation {
            earth: EarthAttenuationModel::from_config(&config),
            converter: EfieldToVoltageConverter::new(&config, &detector),
            splitter: EventSplitter::from_config(&config),
            speedup: SpeedupController::new(&config),
            propagation,
            signal,
            trigger,
            antennas,
            config,
            detector,
        })
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn detector(&self) -> &DetectorDescription {
        &self.detector
    }

    pub fn propagation(&self) -> &RayTracingEngine {
        &self.propagation
    }

    pub fn trigger(&self) -> &TriggerSimulator {
        &self.trigger
    }

    /// Run every trajectory in parallel on the current rayon pool.
    pub fn run(&self, trajectories: &[Trajectory]) -> NurayResult<RunOutput> {
        log::info!(
            "simulating {} trajectories on {} threads",
            trajectories.len(),
            rayon::current_num_threads()
        );
        let (mut indexed, cuts) = trajectories
            .par_iter()
            .enumerate()
            .fold(
                || (Vec::new(), WorkerScratch::new()),
                |(mut acc, mut scratch), (i, trajectory)| {
                    acc.push((i, self.simulate_trajectory(trajectory, &mut scratch)));
                    (acc, scratch)
                },
            )
            .map(|(acc, scratch)| (acc, *scratch.stats()))
            .reduce(
                || (Vec::new(), CutStatistics::default()),
                |(mut a, mut stats_a), (b, stats_b)| {
                    a.extend(b);
                    stats_a.merge(&stats_b);
                    (a, stats_a)
                },
            );
        indexed.sort_by_key(|(i, _)| *i);
        let outcomes = indexed
            .into_iter()
            .map(|(_, outcome)| outcome)
            .collect::<NurayResult<Vec<_>>>()?;

        let summary = SimulationSummary::from_outcomes(&outcomes, cuts);
        log::info!(
            "done: {}/{} trajectories triggered, {} events, {} weight-cut",
            summary.n_triggered,
            summary.n_trajectories,
            summary.n_events,
            summary.cuts.weight_cut
        );
        Ok(RunOutput { outcomes, summary })
    }

    /// Full pipeline for one trajectory.
    pub fn simulate_trajectory(
        &self,
        trajectory: &Trajectory,
        scratch: &mut WorkerScratch,
    ) -> NurayResult<TrajectoryOutcome> {
        scratch.stats.trajectories += 1;
        let weight = self.earth.survival_probability(trajectory)?;
        if !self.speedup.passes_weight(weight, &mut scratch.stats) {
            log::debug!("trajectory {}: weight {weight:.3e} below cut", trajectory.index);
            return Ok(TrajectoryOutcome::cut(trajectory.index, weight, CutReason::Weight));
        }

        scratch.cache.clear();
        let hits_before = scratch.cache.hits();
        let mut readouts = Vec::new();
        for antenna in &self.antennas {
            let arrivals = self.channel_arrivals(trajectory, antenna, scratch);
            readouts.extend(self.channel_readouts(antenna, arrivals, &mut scratch.stats));
        }
        scratch.stats.ray_cache_hits += (scratch.cache.hits() - hits_before) as u64;

        let events: Vec<Event> = self
            .splitter
            .split(readouts, |r| r.start_time)
            .into_iter()
            .enumerate()
            .filter_map(|(event_index, readouts)| self.build_event(trajectory, weight, event_index, readouts))
            .collect();
        let triggered = events.iter().any(|e| e.triggered);
        log::debug!(
            "trajectory {}: weight {weight:.3e}, {} event(s), triggered = {triggered}",
            trajectory.index,
            events.len()
        );
        Ok(TrajectoryOutcome {
            trajectory_index: trajectory.index,
            weight,
            triggered,
            cut: None,
            events,
        })
    }

    /// Every ray from the trajectory's showers to one antenna, with the
    /// field of those inside the Cherenkov window.
    fn channel_arrivals(
        &self,
        trajectory: &Trajectory,
        antenna: &Antenna,
        scratch: &mut WorkerScratch,
    ) -> Vec<RayArrival> {
        let mut arrivals = Vec::new();
        for (shower_index, shower) in trajectory.showers.iter().enumerate() {
            if !self
                .speedup
                .passes_distance(&trajectory.showers, shower_index, antenna.position, &mut scratch.stats)
            {
                continue;
            }
            let rays = scratch.cache.get_or_trace(
                &self.propagation,
                shower.vertex,
                antenna.channel_id,
                antenna.position,
                self.speedup.redo_raytracing(),
            );
            if rays.is_empty() {
                scratch.stats.no_ray_solution += 1;
                continue;
            }
            let n_vertex = self.propagation.ice().n(shower.vertex.z);
            for (ray_index, ray) in rays.iter().enumerate() {
                let viewing_angle = shower.axis.angle_to(&ray.launch_vector);
                let field = self
                    .speedup
                    .passes_cherenkov(viewing_angle, n_vertex, &mut scratch.stats)
                    .then(|| {
                        self.signal
                            .electric_field(shower, shower_index, ray, ray_index, antenna.channel_id, n_vertex)
                    });
                arrivals.push(RayArrival {
                    arrival: ray.travel_time,
                    field,
                });
            }
        }
        arrivals
    }

    /// Readout windows of one channel. Windows are set by every ray
    /// arrival; the amplitude gate then decides per window whether the
    /// superposed fields are converted.
    fn channel_readouts(
        &self,
        antenna: &Antenna,
        arrivals: Vec<RayArrival>,
        stats: &mut CutStatistics,
    ) -> Vec<Readout> {
        let times: Vec<f64> = arrivals.iter().map(|a| a.arrival).collect();
        let groups = self.converter.group_arrivals(&times);
        let mut slots: Vec<Option<ElectricFieldTrace>> = arrivals.into_iter().map(|a| a.field).collect();
        let vrms = self.trigger.vrms(antenna.channel_id);

        groups
            .into_iter()
            .filter_map(|group| {
                let first = times[*group.first()?];
                let last = times[*group.last()?];
                let fields: Vec<ElectricFieldTrace> = group.iter().filter_map(|&i| slots[i].take()).collect();
                let estimate: f64 = fields
                    .iter()
                    .map(|f| {
                        let h = antenna
                            .response
                            .peak_effective_length(f.receive_vector.zenith(), f.receive_vector.azimuth());
                        f.peak_amplitude() * h
                    })
                    .sum();
                let convert = !fields.is_empty() && self.speedup.passes_amplitude(estimate, vrms, stats);
                let voltage = convert.then(|| {
                    let refs: Vec<&ElectricFieldTrace> = fields.iter().collect();
                    self.converter
                        .convert_span(antenna.channel_id, first, last, &refs, &antenna.response)
                });
                Some(Readout {
                    start_time: self.converter.readout_start(first),
                    voltage,
                    fields,
                })
            })
            .collect()
    }

    /// Noise, trigger and output selection for one split event. `None` when
    /// no readout of the event was converted.
    fn build_event(
        &self,
        trajectory: &Trajectory,
        weight: f64,
        event_index: usize,
        readouts: Vec<Readout>,
    ) -> Option<Event> {
        if readouts.iter().all(|r| r.voltage.is_none()) {
            return None;
        }
        let output = self.config.output;

        let mut voltages = Vec::with_capacity(readouts.len());
        let mut sim_voltages = Vec::new();
        let mut fields = Vec::new();
        let mut gated = Vec::new();
        let mut rngs: BTreeMap<usize, StdRng> = BTreeMap::new();
        for readout in readouts {
            let Some(mut voltage) = readout.voltage else {
                gated.extend(readout.fields);
                continue;
            };
            if output.sim_channel_traces {
                sim_voltages.push(voltage.clone());
            }
            let channel_id = voltage.channel_id;
            let rng = rngs.entry(channel_id).or_insert_with(|| {
                stream(
                    self.config.seed,
                    trajectory.index,
                    StreamPurpose::Noise { event: event_index },
                    channel_id as u64,
                )
            });
            self.trigger.add_noise(rng, &mut voltage);
            voltages.push(voltage);
            fields.extend(readout.fields);
        }

        let decision = self.trigger.evaluate(&voltages);
        let sim_fields = output.sim_electric_field_traces.then(|| {
            let mut all = fields.clone();
            all.extend(gated);
            all
        });

        Some(Event {
            event_index,
            trajectory_index: trajectory.index,
            weight,
            triggered: decision.triggered,
            trigger_time: decision.trigger_time,
            channel_traces: output.channel_traces.then_some(voltages),
            electric_field_traces: output.electric_field_traces.then_some(fields),
            sim_channel_traces: output.sim_channel_traces.then_some(sim_voltages),
            sim_electric_field_traces: sim_fields,
        })
    }
}
