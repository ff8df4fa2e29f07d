// ─────────────────────────────────────────────────────────────────────
// Nuray — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{NurayError, NurayResult};
use crate::state::ShowerType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Top-level simulation configuration.
/// Maps 1:1 to the nested key/value simulation document; every key has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub weights: WeightsConfig,
    /// Add thermal noise to the channel traces.
    pub noise: bool,
    /// Internal sampling rate of the electric field simulation [GHz].
    pub sampling_rate: f64,
    /// Gap between trace start times that opens a new event [ns].
    pub split_event_time_diff: f64,
    pub seed: u64,
    pub speedup: SpeedupConfig,
    pub propagation: PropagationConfig,
    pub signal: SignalConfig,
    pub trigger: TriggerConfig,
    pub output: OutputConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            weights: WeightsConfig::default(),
            noise: false,
            sampling_rate: 5.0,
            split_event_time_diff: 1000.0,
            seed: 1235,
            speedup: SpeedupConfig::default(),
            propagation: PropagationConfig::default(),
            signal: SignalConfig::default(),
            trigger: TriggerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// Earth density model. `null` means no absorption (weight 1).
    pub weight_mode: Option<String>,
    pub cross_section_type: String,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        WeightsConfig {
            weight_mode: Some("core_mantle_crust".to_string()),
            cross_section_type: "ctw".to_string(),
        }
    }
}

/// Early-termination cuts. All angles in rad, lengths in m, times in ns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedupConfig {
    pub minimum_weight_cut: f64,
    /// Maximum |viewing angle - Cherenkov angle| that is still simulated.
    #[serde(rename = "delta_C_cut")]
    pub delta_c_cut: f64,
    pub redo_raytracing: bool,
    /// Minimum peak field in units of the field-equivalent noise RMS.
    pub min_efield_amplitude: f64,
    pub amp_per_ray_solution: bool,
    pub distance_cut: bool,
    /// Ascending coefficients of log10(max distance / m) in log10(E / eV).
    pub distance_cut_coefficients: Vec<f64>,
    pub distance_cut_sum_length: f64,
    pub time_res_efieldconverter: f64,
}

impl Default for SpeedupConfig {
    fn default() -> Self {
        SpeedupConfig {
            minimum_weight_cut: 1e-5,
            delta_c_cut: 0.698,
            redo_raytracing: false,
            min_efield_amplitude: 2.0,
            amp_per_ray_solution: true,
            distance_cut: false,
            distance_cut_coefficients: vec![-334.3, 57.39, -3.561, 0.0963, -0.000_958_8],
            distance_cut_sum_length: 5.0,
            time_res_efieldconverter: 0.1,
        }
    }
}

impl SpeedupConfig {
    /// Every cut switched off; reproduces the complete (slow) simulation.
    pub fn disabled() -> Self {
        SpeedupConfig {
            minimum_weight_cut: 0.0,
            delta_c_cut: std::f64::consts::PI,
            min_efield_amplitude: 0.0,
            distance_cut: false,
            ..SpeedupConfig::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    pub module: String,
    pub ice_model: String,
    pub attenuation_model: String,
    pub attenuate_ice: bool,
    /// Number of reference frequencies for path attenuation.
    pub n_freq: usize,
    pub focusing: bool,
    pub focusing_limit: f64,
    /// Maximum number of bottom reflections.
    pub n_reflections: u32,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        PropagationConfig {
            module: "analytic".to_string(),
            ice_model: "southpole_2015".to_string(),
            attenuation_model: "SP1".to_string(),
            attenuate_ice: true,
            n_freq: 25,
            focusing: false,
            focusing_limit: 2.0,
            n_reflections: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub model: String,
    pub zerosignal: bool,
    pub polarization: String,
    #[serde(rename = "ePhi")]
    pub e_phi: f64,
    /// `null` keeps each shower's own type.
    pub shower_type: Option<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            model: "Alvarez2009".to_string(),
            zerosignal: false,
            polarization: "auto".to_string(),
            e_phi: 0.1,
            shower_type: None,
        }
    }
}

/// `noise_temperature` is either a number in Kelvin or the literal "detector".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoiseTemperatureSetting {
    Kelvin(f64),
    Named(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub noise_temperature: Option<NoiseTemperatureSetting>,
    #[serde(rename = "Vrms")]
    pub vrms: Option<f64>,
    pub logic: String,
    /// Threshold in units of the channel Vrms.
    pub threshold: f64,
    /// Low threshold for `high_low`; defaults to `-threshold`.
    pub low_threshold: Option<f64>,
    pub coincidence_window: f64,
    pub number_coincidences: usize,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            noise_temperature: Some(NoiseTemperatureSetting::Kelvin(300.0)),
            vrms: None,
            logic: "simple_threshold".to_string(),
            threshold: 3.0,
            low_threshold: None,
            coincidence_window: 5.0,
            number_coincidences: 1,
        }
    }
}

/// Trace groups retained in each emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Detector-level channel traces (with noise).
    pub channel_traces: bool,
    /// Electric fields at the antennas, one per channel and readout window.
    pub electric_field_traces: bool,
    /// Noiseless simulated channel traces.
    pub sim_channel_traces: bool,
    /// Per-ray-solution simulated electric fields.
    pub sim_electric_field_traces: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            channel_traces: true,
            electric_field_traces: true,
            sim_channel_traces: false,
            sim_electric_field_traces: false,
        }
    }
}

// ── Resolved (typed) configuration ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMode {
    /// No absorption, weight 1.
    Unity,
    /// Reuse the weight stored on the trajectory.
    Existing,
    /// Single constant density.
    Simple,
    /// Three-layer radial profile.
    CoreMantleCrust,
    /// Preliminary Reference Earth Model.
    Prem,
}

impl FromStr for WeightMode {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "null" | "none" => Ok(WeightMode::Unity),
            "existing" => Ok(WeightMode::Existing),
            "simple" => Ok(WeightMode::Simple),
            "core_mantle_crust" => Ok(WeightMode::CoreMantleCrust),
            "prem" => Ok(WeightMode::Prem),
            other => Err(unknown("weights.weight_mode", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossSectionType {
    Ghandi,
    Ctw,
    Csms,
}

impl FromStr for CrossSectionType {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ghandi" | "gandhi" => Ok(CrossSectionType::Ghandi),
            "ctw" => Ok(CrossSectionType::Ctw),
            "csms" => Ok(CrossSectionType::Csms),
            other => Err(unknown("weights.cross_section_type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationModule {
    Analytic,
}

impl FromStr for PropagationModule {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "analytic" => Ok(PropagationModule::Analytic),
            other => Err(unknown("propagation.module", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceModelKind {
    SouthPoleSimple,
    SouthPole2015,
    GreenlandSimple,
    MooresBaySimple,
    Homogeneous,
}

impl FromStr for IceModelKind {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "southpole_simple" => Ok(IceModelKind::SouthPoleSimple),
            "southpole_2015" => Ok(IceModelKind::SouthPole2015),
            "greenland_simple" => Ok(IceModelKind::GreenlandSimple),
            "mooresbay_simple" => Ok(IceModelKind::MooresBaySimple),
            "homogeneous" => Ok(IceModelKind::Homogeneous),
            other => Err(unknown("propagation.ice_model", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttenuationModelKind {
    /// South Pole, temperature-profile based.
    Sp1,
    /// Greenland Summit.
    Gl1,
    /// Moore's Bay ice shelf.
    Mb1,
}

impl FromStr for AttenuationModelKind {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SP1" => Ok(AttenuationModelKind::Sp1),
            "GL1" => Ok(AttenuationModelKind::Gl1),
            "MB1" => Ok(AttenuationModelKind::Mb1),
            other => Err(unknown("propagation.attenuation_model", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalModelKind {
    Alvarez2000,
    Alvarez2009,
}

impl FromStr for SignalModelKind {
    type Err = NurayError;
    fn from_str(s: &str) -> NurayResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "alvarez2000" => Ok(SignalModelKind::Alvarez2000),
            "alvarez2009" => Ok(SignalModelKind::Alvarez2009),
            other => Err(unknown("signal.model", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolarizationMode {
    /// Derived from shower axis and launch direction.
    Auto,
    /// Fixed split: (eTheta, ePhi) with eTheta = sqrt(1 - ePhi^2).
    Custom { e_theta: f64, e_phi: f64 },
}

impl PolarizationMode {
    pub fn custom(e_phi: f64) -> NurayResult<Self> {
        if !(0.0..=1.0).contains(&e_phi) {
            return Err(NurayError::ConfigError(format!(
                "signal.ePhi must lie in [0, 1], got {e_phi}"
            )));
        }
        Ok(PolarizationMode::Custom {
            e_theta: (1.0 - e_phi * e_phi).sqrt(),
            e_phi,
        })
    }
}

/// Source of the channel noise RMS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseLevel {
    /// Global noise temperature [K].
    Temperature(f64),
    /// Per-channel noise temperature from the detector description.
    DetectorTemperature,
    /// Fixed RMS [V].
    Vrms(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerLogicKind {
    /// |V| above `threshold` Vrms on at least `n_channels` channels.
    SimpleThreshold { threshold: f64, n_channels: usize },
    /// High and low crossings within `window` ns on at least `n_channels`.
    HighLow {
        high: f64,
        low: f64,
        window: f64,
        n_channels: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationSettings {
    pub module: PropagationModule,
    pub ice_model: IceModelKind,
    pub attenuation_model: AttenuationModelKind,
    pub attenuate_ice: bool,
    pub n_freq: usize,
    pub focusing: bool,
    pub focusing_limit: f64,
    pub n_reflections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSettings {
    pub model: SignalModelKind,
    pub zerosignal: bool,
    pub polarization: PolarizationMode,
    pub shower_type: Option<ShowerType>,
}

/// Validated configuration with every model name bound to a variant.
/// Built once at startup and handed to each component constructor.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub weight_mode: WeightMode,
    pub cross_section: CrossSectionType,
    pub noise: bool,
    pub sampling_rate: f64,
    pub split_event_time_diff: f64,
    pub seed: u64,
    pub speedup: SpeedupConfig,
    pub propagation: PropagationSettings,
    pub signal: SignalSettings,
    pub noise_level: NoiseLevel,
    pub trigger: TriggerLogicKind,
    pub output: OutputConfig,
}

fn unknown(key: &str, value: &str) -> NurayError {
    NurayError::ConfigError(format!("unknown value '{value}' for {key}"))
}

fn require(cond: bool, message: impl Into<String>) -> NurayResult<()> {
    if cond {
        Ok(())
    } else {
        Err(NurayError::ConfigError(message.into()))
    }
}

impl SimulationConfig {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> NurayResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> NurayResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        Ok(config)
    }

    /// Validate and bind model names to typed variants.
    pub fn resolve(&self) -> NurayResult<ResolvedConfig> {
        let weight_mode = match &self.weights.weight_mode {
            None => WeightMode::Unity,
            Some(name) => name.parse()?,
        };
        let cross_section = self.weights.cross_section_type.parse()?;

        require(
            self.sampling_rate.is_finite() && self.sampling_rate > 0.0,
            "sampling_rate must be finite and > 0",
        )?;
        require(
            self.split_event_time_diff.is_finite() && self.split_event_time_diff > 0.0,
            "split_event_time_diff must be finite and > 0",
        )?;

        let speedup = self.speedup.clone();
        require(
            (0.0..=1.0).contains(&speedup.minimum_weight_cut),
            "speedup.minimum_weight_cut must lie in [0, 1]",
        )?;
        require(speedup.delta_c_cut >= 0.0, "speedup.delta_C_cut must be >= 0")?;
        require(
            speedup.min_efield_amplitude >= 0.0,
            "speedup.min_efield_amplitude must be >= 0",
        )?;
        require(
            speedup.time_res_efieldconverter > 0.0,
            "speedup.time_res_efieldconverter must be > 0",
        )?;
        require(
            speedup.distance_cut_sum_length >= 0.0,
            "speedup.distance_cut_sum_length must be >= 0",
        )?;
        if speedup.distance_cut {
            require(
                speedup.distance_cut_coefficients.len() == 5,
                format!(
                    "speedup.distance_cut_coefficients must hold 5 values (4th-order polynomial), got {}",
                    speedup.distance_cut_coefficients.len()
                ),
            )?;
        }

        let p = &self.propagation;
        let propagation = PropagationSettings {
            module: p.module.parse()?,
            ice_model: p.ice_model.parse()?,
            attenuation_model: p.attenuation_model.parse()?,
            attenuate_ice: p.attenuate_ice,
            n_freq: p.n_freq,
            focusing: p.focusing,
            focusing_limit: p.focusing_limit,
            n_reflections: p.n_reflections,
        };
        require(p.n_freq >= 2, "propagation.n_freq must be >= 2")?;
        require(
            p.focusing_limit.is_finite() && p.focusing_limit > 0.0,
            "propagation.focusing_limit must be finite and > 0",
        )?;

        let s = &self.signal;
        let polarization = match s.polarization.to_ascii_lowercase().as_str() {
            "auto" => PolarizationMode::Auto,
            "custom" => PolarizationMode::custom(s.e_phi)?,
            other => return Err(unknown("signal.polarization", other)),
        };
        let shower_type = match s.shower_type.as_deref() {
            None => None,
            Some(name) if name.eq_ignore_ascii_case("null") || name.eq_ignore_ascii_case("none") => {
                None
            }
            Some(name) => Some(name.parse::<ShowerType>()?),
        };
        let signal = SignalSettings {
            model: s.model.parse()?,
            zerosignal: s.zerosignal,
            polarization,
            shower_type,
        };

        let noise_level = self.resolve_noise_level()?;
        let trigger = self.resolve_trigger_logic()?;

        Ok(ResolvedConfig {
            weight_mode,
            cross_section,
            noise: self.noise,
            sampling_rate: self.sampling_rate,
            split_event_time_diff: self.split_event_time_diff,
            seed: self.seed,
            speedup,
            propagation,
            signal,
            noise_level,
            trigger,
            output: self.output,
        })
    }

    fn resolve_noise_level(&self) -> NurayResult<NoiseLevel> {
        match (&self.trigger.noise_temperature, self.trigger.vrms) {
            (Some(_), Some(_)) => Err(NurayError::ConfigError(
                "trigger.noise_temperature and trigger.Vrms are mutually exclusive".to_string(),
            )),
            (None, None) => Err(NurayError::ConfigError(
                "one of trigger.noise_temperature or trigger.Vrms must be set".to_string(),
            )),
            (None, Some(vrms)) => {
                require(vrms.is_finite() && vrms > 0.0, "trigger.Vrms must be finite and > 0")?;
                Ok(NoiseLevel::Vrms(vrms))
            }
            (Some(NoiseTemperatureSetting::Kelvin(t)), None) => {
                require(
                    t.is_finite() && *t > 0.0,
                    "trigger.noise_temperature must be finite and > 0",
                )?;
                Ok(NoiseLevel::Temperature(*t))
            }
            (Some(NoiseTemperatureSetting::Named(name)), None) => {
                if name.eq_ignore_ascii_case("detector") {
                    Ok(NoiseLevel::DetectorTemperature)
                } else {
                    Err(unknown("trigger.noise_temperature", name))
                }
            }
        }
    }

    fn resolve_trigger_logic(&self) -> NurayResult<TriggerLogicKind> {
        let t = &self.trigger;
        require(
            t.threshold.is_finite() && t.threshold > 0.0,
            "trigger.threshold must be finite and > 0",
        )?;
        require(
            t.number_coincidences >= 1,
            "trigger.number_coincidences must be >= 1",
        )?;
        match t.logic.to_ascii_lowercase().as_str() {
            "simple_threshold" => Ok(TriggerLogicKind::SimpleThreshold {
                threshold: t.threshold,
                n_channels: t.number_coincidences,
            }),
            "high_low" => {
                let low = t.low_threshold.unwrap_or(-t.threshold);
                require(low < 0.0, "trigger.low_threshold must be < 0")?;
                require(
                    t.coincidence_window >= 0.0,
                    "trigger.coincidence_window must be >= 0",
                )?;
                Ok(TriggerLogicKind::HighLow {
                    high: t.threshold,
                    low,
                    window: t.coincidence_window,
                    n_channels: t.number_coincidences,
                })
            }
            other => Err(unknown("trigger.logic", other)),
        }
    }
}
