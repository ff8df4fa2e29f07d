// ─────────────────────────────────────────────────────────────────────
// Nuray — Trigger Simulator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Noise injection and trigger decision for one readout.

use crate::detector::{Bandpass, DetectorDescription};
use crate::noise::{thermal_noise, thermal_vrms, RecordedNoiseLibrary};
use nuray_types::config::{NoiseLevel, ResolvedConfig, TriggerLogicKind};
use nuray_types::error::{NurayError, NurayResult};
use nuray_types::state::VoltageTrace;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerDecision {
    pub triggered: bool,
    /// Time at which the coincidence condition was met [ns].
    pub trigger_time: Option<f64>,
}

impl TriggerDecision {
    pub const NOT_TRIGGERED: TriggerDecision = TriggerDecision {
        triggered: false,
        trigger_time: None,
    };
}

#[derive(Debug, Clone)]
struct ChannelNoise {
    vrms: f64,
    bandpass: Bandpass,
}

#[derive(Debug, Clone)]
pub struct TriggerSimulator {
    noise: bool,
    logic: TriggerLogicKind,
    channels: BTreeMap<usize, ChannelNoise>,
    library: Option<Arc<RecordedNoiseLibrary>>,
}

impl TriggerSimulator {
    /// Resolves the per-channel noise RMS. A "detector" noise temperature
    /// needs every channel to carry its own temperature.
    pub fn new(
        config: &ResolvedConfig,
        detector: &DetectorDescription,
        library: Option<Arc<RecordedNoiseLibrary>>,
    ) -> NurayResult<Self> {
        if let Some(lib) = library.as_deref() {
            lib.check_detector(detector)?;
        }
        let mut channels = BTreeMap::new();
        for ch in &detector.channels {
            let vrms = match config.noise_level {
                NoiseLevel::Vrms(v) => v,
                NoiseLevel::Temperature(t) => thermal_vrms(t, &ch.bandpass),
                NoiseLevel::DetectorTemperature => {
                    let t = ch.noise_temperature.ok_or_else(|| {
                        NurayError::ConfigError(format!(
                            "noise_temperature = \"detector\" but channel {} has none",
                            ch.id
                        ))
                    })?;
                    thermal_vrms(t, &ch.bandpass)
                }
            };
            if !(vrms.is_finite() && vrms > 0.0) {
                return Err(NurayError::ConfigError(format!(
                    "channel {} noise RMS must be > 0, got {vrms}",
                    ch.id
                )));
            }
            log::debug!("channel {}: Vrms = {:.3e} V", ch.id, vrms);
            channels.insert(
                ch.id,
                ChannelNoise {
                    vrms,
                    bandpass: ch.bandpass,
                },
            );
        }
        Ok(TriggerSimulator {
            noise: config.noise,
            logic: config.trigger,
            channels,
            library,
        })
    }

    pub fn logic(&self) -> TriggerLogicKind {
        self.logic
    }

    pub fn noise_enabled(&self) -> bool {
        self.noise
    }

    /// Noise RMS of `channel_id` [V]; zero for unknown channels.
    pub fn vrms(&self, channel_id: usize) -> f64 {
        self.channels.get(&channel_id).map_or(0.0, |c| c.vrms)
    }

    /// Add noise to `trace` in place. No-op when noise is disabled.
    pub fn add_noise<R: Rng + ?Sized>(&self, rng: &mut R, trace: &mut VoltageTrace) {
        if !self.noise {
            return;
        }
        let Some(channel) = self.channels.get(&trace.channel_id) else {
            log::warn!("no noise model for channel {}", trace.channel_id);
            return;
        };
        let n = trace.n_samples();
        let noise = match self.library.as_deref() {
            Some(lib) => match lib.sample(rng, trace.channel_id, n) {
                Some(recorded) => recorded,
                None => return,
            },
            None => thermal_noise(rng, n, trace.sampling_rate, channel.vrms, &channel.bandpass),
        };
        trace.samples += &noise;
    }

    /// Trigger decision over the traces of one readout.
    pub fn evaluate(&self, traces: &[VoltageTrace]) -> TriggerDecision {
        // Earliest firing time per channel
        let mut fired: BTreeMap<usize, f64> = BTreeMap::new();
        for trace in traces {
            let vrms = self.vrms(trace.channel_id);
            if vrms <= 0.0 {
                continue;
            }
            let t = match self.logic {
                TriggerLogicKind::SimpleThreshold { threshold, .. } => first_above(trace, threshold * vrms),
                TriggerLogicKind::HighLow { high, low, window, .. } => {
                    high_low_time(trace, high * vrms, low * vrms, window)
                }
            };
            if let Some(t) = t {
                fired
                    .entry(trace.channel_id)
                    .and_modify(|best| *best = best.min(t))
                    .or_insert(t);
            }
        }

        let mut times: Vec<f64> = fired.into_values().collect();
        times.sort_by(f64::total_cmp);
        let trigger_time = match self.logic {
            TriggerLogicKind::SimpleThreshold { n_channels, .. } => times.get(n_channels.max(1) - 1).copied(),
            TriggerLogicKind::HighLow { window, n_channels, .. } => coincidence(&times, n_channels.max(1), window),
        };
        TriggerDecision {
            triggered: trigger_time.is_some(),
            trigger_time,
        }
    }
}

fn first_above(trace: &VoltageTrace, level: f64) -> Option<f64> {
    trace
        .samples
        .iter()
        .position(|v| v.abs() > level)
        .map(|i| trace.time_of(i))
}

/// Earliest time at which a sample above `high` and a sample below `low`
/// have both occurred within `window` of each other.
fn high_low_time(trace: &VoltageTrace, high: f64, low: f64, window: f64) -> Option<f64> {
    let highs: Vec<f64> = crossing_times(trace, |v| v > high);
    let lows: Vec<f64> = crossing_times(trace, |v| v < low);
    let mut best: Option<f64> = None;
    for &h in &highs {
        // First low at or after h - window
        let i = lows.partition_point(|&l| l < h - window);
        let Some(&l) = lows.get(i) else { continue };
        if l > h + window {
            continue;
        }
        let t = h.max(l);
        best = Some(best.map_or(t, |b: f64| b.min(t)));
    }
    best
}

fn crossing_times(trace: &VoltageTrace, pred: impl Fn(f64) -> bool) -> Vec<f64> {
    trace
        .samples
        .iter()
        .enumerate()
        .filter(|&(_, &v)| pred(v))
        .map(|(i, _)| trace.time_of(i))
        .collect()
}

/// Completion time of the earliest `n` sorted times spanning at most `window`.
fn coincidence(times: &[f64], n: usize, window: f64) -> Option<f64> {
    (n - 1..times.len())
        .find(|&j| times[j] - times[j + 1 - n] <= window)
        .map(|j| times[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use nuray_types::config::SimulationConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn detector() -> DetectorDescription {
        DetectorDescription::from_json_str(
            r#"{
                "sampling_rate": 1.0,
                "n_samples": 64,
                "pre_trigger_time": 10.0,
                "channels": [
                    {"id": 0, "position": {"x": 0.0, "y": 0.0, "z": -100.0},
                     "antenna_model": "vpol_dipole", "noise_temperature": 300.0,
                     "bandpass": {"low": 0.08, "high": 0.45}},
                    {"id": 1, "position": {"x": 0.0, "y": 0.0, "z": -105.0},
                     "antenna_model": "vpol_dipole",
                     "bandpass": {"low": 0.08, "high": 0.45}}
                ]
            }"#,
        )
        .unwrap()
    }

    fn simulator(patch: &str) -> TriggerSimulator {
        let config = SimulationConfig::from_json_str(patch).unwrap().resolve().unwrap();
        TriggerSimulator::new(&config, &detector(), None).unwrap()
    }

    fn trace(channel_id: usize, spikes: &[(usize, f64)]) -> VoltageTrace {
        let mut samples = Array1::zeros(64);
        for &(i, v) in spikes {
            samples[i] = v;
        }
        VoltageTrace {
            channel_id,
            start_time: 100.0,
            sampling_rate: 1.0,
            samples,
            ray_amplitudes: None,
        }
    }

    #[test]
    fn test_vrms_setting_used_verbatim() {
        let sim = simulator(r#"{"trigger": {"noise_temperature": null, "Vrms": 0.01}}"#);
        assert_eq!(sim.vrms(0), 0.01);
        assert_eq!(sim.vrms(1), 0.01);
        assert_eq!(sim.vrms(9), 0.0);
    }

    #[test]
    fn test_detector_temperature_requires_every_channel() {
        let config = SimulationConfig::from_json_str(r#"{"trigger": {"noise_temperature": "detector"}}"#)
            .unwrap()
            .resolve()
            .unwrap();
        let err = TriggerSimulator::new(&config, &detector(), None).unwrap_err();
        assert!(matches!(err, NurayError::ConfigError(_)));
    }

    #[test]
    fn test_simple_threshold_single_channel() {
        let sim = simulator(r#"{"trigger": {"noise_temperature": null, "Vrms": 1.0, "threshold": 3.0}}"#);
        let below = sim.evaluate(&[trace(0, &[(20, 2.9)])]);
        assert_eq!(below, TriggerDecision::NOT_TRIGGERED);
        let above = sim.evaluate(&[trace(0, &[(20, -3.1)])]);
        assert!(above.triggered);
        assert_eq!(above.trigger_time, Some(120.0));
    }

    #[test]
    fn test_simple_threshold_two_channel_coincidence() {
        let sim = simulator(
            r#"{"trigger": {"noise_temperature": null, "Vrms": 1.0, "number_coincidences": 2}}"#,
        );
        assert!(!sim.evaluate(&[trace(0, &[(20, 5.0)])]).triggered);
        let both = sim.evaluate(&[trace(0, &[(20, 5.0)]), trace(1, &[(30, 5.0)])]);
        assert_eq!(both.trigger_time, Some(130.0));
    }

    #[test]
    fn test_high_low_needs_both_polarities() {
        let sim = simulator(
            r#"{"trigger": {"noise_temperature": null, "Vrms": 1.0, "logic": "high_low",
                            "threshold": 3.0, "coincidence_window": 5.0}}"#,
        );
        assert!(!sim.evaluate(&[trace(0, &[(20, 5.0)])]).triggered);
        // Low 4 ns after high: fires at the low crossing
        let bipolar = sim.evaluate(&[trace(0, &[(20, 5.0), (24, -5.0)])]);
        assert_eq!(bipolar.trigger_time, Some(124.0));
        // Too far apart
        assert!(!sim.evaluate(&[trace(0, &[(20, 5.0), (40, -5.0)])]).triggered);
    }

    #[test]
    fn test_noise_disabled_leaves_trace() {
        let sim = simulator(r#"{"noise": false}"#);
        let mut t = trace(0, &[(3, 1.0)]);
        let before = t.clone();
        sim.add_noise(&mut StdRng::seed_from_u64(1), &mut t);
        assert_eq!(t, before);
    }

    #[test]
    fn test_noise_enabled_changes_trace() {
        let sim = simulator(r#"{"noise": true, "trigger": {"noise_temperature": null, "Vrms": 0.5}}"#);
        let mut t = trace(0, &[]);
        sim.add_noise(&mut StdRng::seed_from_u64(1), &mut t);
        assert!(t.max_abs() > 0.0);
    }

    #[test]
    fn test_coincidence_window() {
        assert_eq!(coincidence(&[0.0, 10.0, 12.0], 2, 5.0), Some(12.0));
        assert_eq!(coincidence(&[0.0, 10.0, 20.0], 2, 5.0), None);
        assert_eq!(coincidence(&[1.0], 1, 0.0), Some(1.0));
        assert_eq!(coincidence(&[], 1, 0.0), None);
    }
}
