//! Error taxonomy for the battery environment.

use thiserror::Error;

/// Failures raised by the environment and its collaborators.
///
/// Every variant except [`EnvError::EnergyBalanceViolation`] is a caller
/// error detected before any state is mutated. An energy-balance violation
/// means the decimal pipeline produced an inconsistent result and must not
/// be retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    /// An action component fell outside its `[low, high]` space.
    #[error("action[{index}] = {value} is outside [{low}, {high}]")]
    InvalidAction {
        index: usize,
        value: f64,
        low: f64,
        high: f64,
    },

    /// Construction parameters violate a physical or indexing constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The stored-energy ledger did not balance within tolerance.
    #[error(
        "energy balance violated at step {step}: charge residual {charge_residual}, rate residual {rate_residual}"
    )]
    EnergyBalanceViolation {
        step: usize,
        charge_residual: String,
        rate_residual: String,
    },

    /// `step` was called after the episode reached its terminal step.
    #[error("episode {episode} is already done; call reset first")]
    EpisodeAlreadyDone { episode: usize },

    /// `step` was called before the first `reset`.
    #[error("episode has not started; call reset first")]
    EpisodeNotStarted,

    /// The price/demand series could not be loaded.
    #[error("time series: {0}")]
    TimeSeries(String),
}

impl From<csv::Error> for EnvError {
    fn from(err: csv::Error) -> Self {
        Self::TimeSeries(err.to_string())
    }
}

impl From<std::io::Error> for EnvError {
    fn from(err: std::io::Error) -> Self {
        Self::TimeSeries(err.to_string())
    }
}
