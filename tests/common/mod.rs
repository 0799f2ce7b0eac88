//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use battery_env::env::battery::BatteryParams;
use battery_env::env::clock::EpisodeLength;
use battery_env::timeseries::{MarketRow, TimeSeries};
use battery_env::{BatteryEnv, EnvConfig};

/// Tolerance of the energy-balance invariants.
pub const EPS: f64 = 1e-4;

/// `rows` identical rows at `price` $/MWh and `demand` MW.
pub fn flat_series(rows: usize, price: f64, demand: f64) -> Arc<TimeSeries> {
    let rows = (0..rows)
        .map(|_| MarketRow {
            electricity_price: price,
            electricity_demand: demand,
        })
        .collect();
    Arc::new(TimeSeries::new(rows).expect("fixture series is valid"))
}

/// Price rising by 1 $/MWh per step from `start`, constant 3 MW demand.
pub fn ramp_series(rows: usize, start: f64) -> Arc<TimeSeries> {
    let rows = (0..rows)
        .map(|i| MarketRow {
            electricity_price: start + i as f64,
            electricity_demand: 3.0,
        })
        .collect();
    Arc::new(TimeSeries::new(rows).expect("fixture series is valid"))
}

/// 2 MW / 4 MWh battery with perfect efficiency.
pub fn lossless_params() -> BatteryParams {
    BatteryParams::new(2.0, 4.0).with_efficiency(1.0)
}

/// Episode settings with `length` steps and no lag.
pub fn env_config(length: usize) -> EnvConfig {
    EnvConfig {
        episode_length: EpisodeLength::Steps(length),
        ..EnvConfig::default()
    }
}

/// A reset environment over a flat 50 $/MWh, 3 MW series.
pub fn started_env(params: BatteryParams, length: usize) -> BatteryEnv {
    let mut env = BatteryEnv::new(params, env_config(length), flat_series(length, 50.0, 3.0))
        .expect("fixture environment is valid");
    env.reset();
    env
}
