//! Grid-connected battery storage environment for reinforcement learning.

/// REST API over a finished run.
#[cfg(feature = "api")]
pub mod api;
pub mod config;
/// Battery physics, reward, spaces, and the episode engine.
pub mod env;
pub mod error;
pub mod io;
pub mod memory;
pub mod policy;
pub mod recorder;
pub mod runner;
pub mod timeseries;
/// Live terminal UI.
#[cfg(feature = "tui")]
pub mod tui;

pub use env::{Action, BatteryEnv, EnvConfig, Observation, StepInfo, StepOutcome};
pub use error::EnvError;
