// ─────────────────────────────────────────────────────────────────────
// Nuray — Detector Description
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Station layout loaded from JSON.
//!
//! ```json
//! {
//!   "sampling_rate": 2.0,
//!   "n_samples": 512,
//!   "pre_trigger_time": 50.0,
//!   "channels": [
//!     {"id": 0, "position": {"x": 0.0, "y": 0.0, "z": -100.0},
//!      "antenna_model": "vpol_dipole",
//!      "bandpass": {"low": 0.08, "high": 0.8, "order": 4}}
//!   ]
//! }
//! ```

use nuray_math::vector::Vec3;
use nuray_types::error::{NurayError, NurayResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_order() -> u32 {
    4
}

fn default_antenna_length() -> f64 {
    1.0
}

fn default_pre_trigger_time() -> f64 {
    50.0
}

/// Butterworth-magnitude bandpass [GHz].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bandpass {
    pub low: f64,
    pub high: f64,
    #[serde(default = "default_order")]
    pub order: u32,
}

impl Bandpass {
    /// |B(f)| of a high-pass at `low` cascaded with a low-pass at `high`.
    pub fn gain(&self, frequency: f64) -> f64 {
        if frequency <= 0.0 {
            return 0.0;
        }
        let two_n = 2 * self.order as i32;
        let high_pass = 1.0 / (1.0 + (self.low / frequency).powi(two_n)).sqrt();
        let low_pass = 1.0 / (1.0 + (frequency / self.high).powi(two_n)).sqrt();
        high_pass * low_pass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntennaModel {
    VpolDipole,
    HpolDipole,
    Isotropic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescription {
    pub id: usize,
    /// Antenna feed point [m].
    pub position: Vec3,
    pub antenna_model: AntennaModel,
    /// Dipole axis. Defaults to +z for vpol and +x for hpol.
    #[serde(default)]
    pub orientation: Option<Vec3>,
    /// Physical antenna length [m].
    #[serde(default = "default_antenna_length")]
    pub antenna_length: f64,
    /// Used when the noise temperature is set to "detector" [K].
    #[serde(default)]
    pub noise_temperature: Option<f64>,
    pub bandpass: Bandpass,
}

impl ChannelDescription {
    /// Unit dipole axis.
    pub fn axis(&self) -> Vec3 {
        match self.orientation {
            Some(axis) => axis.normalized(),
            None => match self.antenna_model {
                AntennaModel::HpolDipole => Vec3::new(1.0, 0.0, 0.0),
                AntennaModel::VpolDipole | AntennaModel::Isotropic => Vec3::EZ,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorDescription {
    #[serde(default)]
    pub station_id: usize,
    /// Digitizer sampling rate [GHz].
    pub sampling_rate: f64,
    /// Samples per readout.
    pub n_samples: usize,
    /// Time between the first pulse and the start of a readout [ns].
    #[serde(default = "default_pre_trigger_time")]
    pub pre_trigger_time: f64,
    pub channels: Vec<ChannelDescription>,
}

impl DetectorDescription {
    pub fn from_file(path: impl AsRef<Path>) -> NurayResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> NurayResult<Self> {
        let detector: DetectorDescription = serde_json::from_str(json)?;
        detector.validate()?;
        Ok(detector)
    }

    pub fn validate(&self) -> NurayResult<()> {
        let fail = |msg: String| Err(NurayError::ConfigError(msg));
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return fail(format!("detector sampling_rate must be > 0, got {}", self.sampling_rate));
        }
        if self.n_samples < 2 {
            return fail(format!("detector n_samples must be >= 2, got {}", self.n_samples));
        }
        if !(self.pre_trigger_time >= 0.0 && self.pre_trigger_time < self.readout_window()) {
            return fail(format!(
                "pre_trigger_time {} outside readout window [0, {})",
                self.pre_trigger_time,
                self.readout_window()
            ));
        }
        if self.channels.is_empty() {
            return fail("detector has no channels".to_string());
        }
        let mut seen = HashSet::new();
        for ch in &self.channels {
            if !seen.insert(ch.id) {
                return fail(format!("duplicate channel id {}", ch.id));
            }
            if !ch.position.is_finite() {
                return fail(format!("channel {} has a non-finite position", ch.id));
            }
            let bp = &ch.bandpass;
            if !(bp.low >= 0.0 && bp.high > bp.low && bp.order >= 1) {
                return fail(format!(
                    "channel {} bandpass must satisfy 0 <= low < high and order >= 1",
                    ch.id
                ));
            }
            if !(ch.antenna_length > 0.0) {
                return fail(format!("channel {} antenna_length must be > 0", ch.id));
            }
            if matches!(ch.orientation, Some(axis) if axis.norm() < 1e-12) {
                return fail(format!("channel {} orientation is a zero vector", ch.id));
            }
        }
        Ok(())
    }

    /// Readout duration [ns].
    pub fn readout_window(&self) -> f64 {
        self.n_samples as f64 / self.sampling_rate
    }

    pub fn channel(&self, id: usize) -> Option<&ChannelDescription> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn channel_ids(&self) -> Vec<usize> {
        self.channels.iter().map(|c| c.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CHANNELS: &str = r#"{
        "sampling_rate": 2.0,
        "n_samples": 256,
        "channels": [
            {"id": 0, "position": {"x": 0.0, "y": 0.0, "z": -100.0},
             "antenna_model": "vpol_dipole",
             "bandpass": {"low": 0.08, "high": 0.8}},
            {"id": 1, "position": {"x": 0.0, "y": 0.0, "z": -95.0},
             "antenna_model": "hpol_dipole", "noise_temperature": 280.0,
             "bandpass": {"low": 0.1, "high": 0.6, "order": 6}}
        ]
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let det = DetectorDescription::from_json_str(TWO_CHANNELS).unwrap();
        assert_eq!(det.channels.len(), 2);
        assert_eq!(det.pre_trigger_time, 50.0);
        assert_eq!(det.channels[0].bandpass.order, 4);
        assert_eq!(det.channels[0].antenna_length, 1.0);
        assert_eq!(det.channel(1).unwrap().noise_temperature, Some(280.0));
        assert!((det.readout_window() - 128.0).abs() < 1e-12);
        assert_eq!(det.channel(1).unwrap().axis(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let json = TWO_CHANNELS.replace("\"id\": 1", "\"id\": 0");
        assert!(matches!(
            DetectorDescription::from_json_str(&json),
            Err(NurayError::ConfigError(_))
        ));
    }

    #[test]
    fn test_inverted_bandpass_rejected() {
        let json = TWO_CHANNELS.replace("\"low\": 0.1, \"high\": 0.6", "\"low\": 0.6, \"high\": 0.1");
        assert!(DetectorDescription::from_json_str(&json).is_err());
    }

    #[test]
    fn test_pre_trigger_beyond_window_rejected() {
        let json = TWO_CHANNELS.replace("\"n_samples\": 256", "\"n_samples\": 256, \"pre_trigger_time\": 200.0");
        assert!(DetectorDescription::from_json_str(&json).is_err());
    }

    #[test]
    fn test_bandpass_shape() {
        let bp = Bandpass { low: 0.1, high: 0.5, order: 4 };
        assert_eq!(bp.gain(0.0), 0.0);
        // -3 dB at each corner (other filter nearly transparent)
        assert!((bp.gain(0.1) - 0.5f64.sqrt()).abs() < 1e-3);
        assert!((bp.gain(0.5) - 0.5f64.sqrt()).abs() < 1e-3);
        assert!(bp.gain(0.25) > 0.99);
        assert!(bp.gain(5.0) < 2e-4);
    }
}
