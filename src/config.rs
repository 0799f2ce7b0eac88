//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::battery::BatteryParams;
use crate::env::clock::{EpisodeLength, STEPS_PER_HOUR};
use crate::env::engine::EnvConfig;
use crate::env::precision::Precision;
use crate::error::EnvError;
use crate::policy::PolicyKind;
use crate::timeseries::{SyntheticProfile, TimeSeries};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Episode windowing, lag, verbosity, decimal precision.
    #[serde(default)]
    pub environment: EnvConfig,
    /// Battery technical parameters.
    #[serde(default)]
    pub battery: BatteryParams,
    /// Price and demand source.
    #[serde(default)]
    pub series: SeriesConfig,
    /// Scripted driver and episode count.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Experience replay settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Where the price/demand series comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesConfig {
    /// CSV file with `electricity_price` and `electricity_demand` columns.
    /// When absent a synthetic series is generated.
    pub path: Option<PathBuf>,
    /// Seed of the synthetic noise.
    pub seed: u64,
    /// Shape of the synthetic series.
    pub synthetic: SyntheticProfile,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed: 42,
            synthetic: SyntheticProfile::default(),
        }
    }
}

/// Scripted driver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// `"idle"`, `"random"`, or `"threshold"`.
    pub policy: PolicyKind,
    /// Number of episodes to run (must be > 0).
    pub episodes: usize,
    /// Seed of the random policy.
    pub seed: u64,
    /// Threshold policy: charge at or below this price ($/MWh).
    pub charge_below: f64,
    /// Threshold policy: discharge at or above this price ($/MWh).
    pub discharge_above: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Threshold,
            episodes: 1,
            seed: 42,
            charge_below: 45.0,
            discharge_above: 75.0,
        }
    }
}

/// Experience replay parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    /// Most recent experiences eligible for random batches.
    pub length: usize,
    /// Discount rate of the returns, in `[0, 1]`.
    pub discount_rate: f64,
    /// Experiences per random batch.
    pub batch_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            length: 10_000,
            discount_rate: 0.9,
            batch_size: 64,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_mwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: a 2 MW / 4 MWh battery over two
    /// synthetic days, one day per episode.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the high-volatility preset: wide, noisy price swings.
    pub fn high_volatility() -> Self {
        Self {
            series: SeriesConfig {
                synthetic: SyntheticProfile {
                    base_price: 70.0,
                    price_amplitude: 80.0,
                    price_noise_std: 25.0,
                    ..SyntheticProfile::default()
                },
                ..SeriesConfig::default()
            },
            agent: AgentConfig {
                charge_below: 30.0,
                discharge_above: 110.0,
                ..AgentConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the small-battery preset: 0.5 MW / 1 MWh, lossier cells.
    pub fn small_battery() -> Self {
        Self {
            battery: BatteryParams::new(0.5, 1.0).with_efficiency(0.85),
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_volatility", "small_battery"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_volatility" => Ok(Self::high_volatility()),
            "small_battery" => Ok(Self::small_battery()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Loads the series this scenario describes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::TimeSeries`] if the CSV cannot be loaded.
    pub fn build_series(&self) -> Result<TimeSeries, EnvError> {
        match &self.series.path {
            Some(path) => TimeSeries::from_csv_path(path),
            None => Ok(TimeSeries::synthetic(
                &self.series.synthetic,
                self.series.seed,
            )),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Whether a CSV
    /// series is long enough is only known once it is loaded.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let env = &self.environment;
        if env.episode_length == EpisodeLength::Steps(0) {
            errors.push(ConfigError::new("environment.episode_length", "must be >= 1"));
        }
        if env.episode_start < env.lag {
            errors.push(ConfigError::new(
                "environment.episode_start",
                "must be >= environment.lag",
            ));
        }
        if Precision::new(env.precision).is_err() {
            errors.push(ConfigError::new(
                "environment.precision",
                format!(
                    "must be in [{}, {}]",
                    Precision::MIN_DIGITS,
                    Precision::MAX_DIGITS
                ),
            ));
        }

        let bat = &self.battery;
        if !(bat.power_rating_mw > 0.0) {
            errors.push(ConfigError::new("battery.power_rating_mw", "must be > 0"));
        }
        if !(bat.capacity_mwh > 0.0) {
            errors.push(ConfigError::new("battery.capacity_mwh", "must be > 0"));
        }
        if !(bat.round_trip_efficiency > 0.0 && bat.round_trip_efficiency <= 1.0) {
            errors.push(ConfigError::new(
                "battery.round_trip_efficiency",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(bat.initial_charge_mwh >= 0.0 && bat.initial_charge_mwh <= bat.capacity_mwh) {
            errors.push(ConfigError::new(
                "battery.initial_charge_mwh",
                "must be in [0.0, battery.capacity_mwh]",
            ));
        }

        if self.series.path.is_none() {
            let syn = &self.series.synthetic;
            if syn.days == 0 {
                errors.push(ConfigError::new("series.synthetic.days", "must be > 0"));
            }
            if syn.price_noise_std < 0.0 || syn.demand_noise_std < 0.0 {
                errors.push(ConfigError::new(
                    "series.synthetic",
                    "noise standard deviations must be >= 0",
                ));
            }
            let rows = syn.days * 24 * STEPS_PER_HOUR as usize;
            if let EpisodeLength::Steps(n) = env.episode_length
                && env.episode_start + n > rows
            {
                errors.push(ConfigError::new(
                    "environment.episode_length",
                    format!(
                        "episode_start + episode_length must be <= {rows} synthetic rows"
                    ),
                ));
            }
        }

        let agent = &self.agent;
        if agent.episodes == 0 {
            errors.push(ConfigError::new("agent.episodes", "must be > 0"));
        }
        if agent.policy == PolicyKind::Threshold && agent.charge_below >= agent.discharge_above {
            errors.push(ConfigError::new(
                "agent.charge_below",
                "must be < agent.discharge_above",
            ));
        }

        let mem = &self.memory;
        if mem.length == 0 {
            errors.push(ConfigError::new("memory.length", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&mem.discount_rate) {
            errors.push(ConfigError::new("memory.discount_rate", "must be in [0.0, 1.0]"));
        }
        if mem.batch_size == 0 {
            errors.push(ConfigError::new("memory.batch_size", "must be > 0"));
        }

        errors
    }
}
