//! Electricity price and site demand series driving the environment.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::env::clock::STEPS_PER_HOUR;
use crate::env::space::ContinuousSpace;
use crate::error::EnvError;

/// One step of external market state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    /// Electricity price ($/MWh).
    #[serde(alias = "C_electricity_price_[$/MWh]")]
    pub electricity_price: f64,
    /// Site electricity demand (MW).
    #[serde(alias = "C_electricity_demand_[MW]")]
    pub electricity_demand: f64,
}

/// An ordered, non-empty series of [`MarketRow`]s at five-minute resolution.
///
/// Read-only once built; environments share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    rows: Vec<MarketRow>,
}

impl TimeSeries {
    /// Wraps existing rows.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::TimeSeries`] if `rows` is empty or holds a
    /// non-finite value.
    pub fn new(rows: Vec<MarketRow>) -> Result<Self, EnvError> {
        if rows.is_empty() {
            return Err(EnvError::TimeSeries("series has no rows".into()));
        }
        if let Some(i) = rows
            .iter()
            .position(|r| !r.electricity_price.is_finite() || !r.electricity_demand.is_finite())
        {
            return Err(EnvError::TimeSeries(format!(
                "row {i} holds a non-finite price or demand"
            )));
        }
        Ok(Self { rows })
    }

    /// Loads a series from a CSV file with price and demand columns.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::TimeSeries`] if the file cannot be opened, a row
    /// fails to parse, or the file holds no rows.
    pub fn from_csv_path(path: &Path) -> Result<Self, EnvError> {
        let file = File::open(path).map_err(|e| {
            EnvError::TimeSeries(format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_reader(file)
    }

    /// Parses CSV from any reader. Columns beyond price and demand are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::TimeSeries`] on malformed rows or an empty body.
    pub fn from_reader(reader: impl Read) -> Result<Self, EnvError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = rdr
            .deserialize::<MarketRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rows)
    }

    /// Generates a deterministic synthetic series.
    pub fn synthetic(profile: &SyntheticProfile, seed: u64) -> Self {
        let steps_per_day = 24 * STEPS_PER_HOUR as usize;
        let total = profile.days.max(1) * steps_per_day;
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = (0..total)
            .map(|t| {
                let day_pos = (t % steps_per_day) as f64 / steps_per_day as f64;
                let angle = 2.0 * std::f64::consts::PI * day_pos;
                let price = profile.base_price
                    + profile.price_amplitude * (angle + profile.price_phase_rad).sin()
                    + gaussian_noise(&mut rng, profile.price_noise_std);
                let demand = profile.base_demand_mw
                    + profile.demand_amplitude_mw * (angle + profile.demand_phase_rad).sin()
                    + gaussian_noise(&mut rng, profile.demand_noise_std);
                MarketRow {
                    electricity_price: price,
                    electricity_demand: demand.max(0.0),
                }
            })
            .collect();
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`; construction rejects empty series.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&MarketRow> {
        self.rows.get(index)
    }

    /// All rows in order.
    pub fn rows(&self) -> &[MarketRow] {
        &self.rows
    }

    /// `[min, max]` of the price column.
    pub fn price_range(&self) -> ContinuousSpace {
        range(self.rows.iter().map(|r| r.electricity_price))
    }

    /// `[min, max]` of the demand column.
    pub fn demand_range(&self) -> ContinuousSpace {
        range(self.rows.iter().map(|r| r.electricity_demand))
    }
}

fn range(values: impl Iterator<Item = f64>) -> ContinuousSpace {
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    ContinuousSpace::new(low, high)
}

/// Zero-mean Gaussian sample via Box-Muller.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * std_dev
}

/// Shape of a synthetic daily price and demand cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticProfile {
    /// Number of days to generate.
    pub days: usize,
    /// Mean price ($/MWh).
    pub base_price: f64,
    /// Daily price swing ($/MWh).
    pub price_amplitude: f64,
    /// Price phase offset (radians).
    pub price_phase_rad: f64,
    /// Price noise standard deviation ($/MWh).
    pub price_noise_std: f64,
    /// Mean site demand (MW).
    pub base_demand_mw: f64,
    /// Daily demand swing (MW).
    pub demand_amplitude_mw: f64,
    /// Demand phase offset (radians).
    pub demand_phase_rad: f64,
    /// Demand noise standard deviation (MW).
    pub demand_noise_std: f64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            days: 2,
            base_price: 60.0,
            price_amplitude: 35.0,
            price_phase_rad: -1.8,
            price_noise_std: 8.0,
            base_demand_mw: 3.0,
            demand_amplitude_mw: 1.2,
            demand_phase_rad: -1.6,
            demand_noise_std: 0.15,
        }
    }
}
