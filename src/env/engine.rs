//! The battery environment: episode lifecycle around the physics step.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::battery::{BatteryModel, BatteryParams};
use super::clock::{EpisodeClock, EpisodeLength};
use super::precision::{Precision, to_f64};
use super::reward::step_cost;
use super::space::{ActionSpace, ContinuousSpace, ObservationSpace, reward_space};
use super::types::{Action, EpisodeStatus, Observation, StepInfo, StepOutcome};
use crate::error::EnvError;
use crate::timeseries::TimeSeries;

/// Episode windowing and diagnostics settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Steps by which the observation trails the true state.
    pub lag: usize,
    /// Steps per episode, or `"maximum"` for the rest of the series.
    pub episode_length: EpisodeLength,
    /// Index of the first series row of every episode.
    pub episode_start: usize,
    /// Diagnostic volume: 0 is silent, 1 logs every step.
    pub verbose: u8,
    /// Significant digits of the decimal charge/rate pipeline.
    pub precision: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            lag: 0,
            episode_length: EpisodeLength::default(),
            episode_start: 0,
            verbose: 0,
            precision: Precision::MAX_DIGITS,
        }
    }
}

/// Spaces derived at reset from the series and the battery parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spaces {
    pub action: ActionSpace,
    pub observation: ObservationSpace,
    pub reward: ContinuousSpace,
}

/// A grid-connected battery driven one five-minute step at a time.
///
/// One instance is one sequential trajectory. Parallel rollouts build one
/// environment each; the series and parameters may be shared, the stored
/// charge and logs may not.
#[derive(Debug, Clone)]
pub struct BatteryEnv {
    params: BatteryParams,
    model: BatteryModel,
    config: EnvConfig,
    series: Arc<TimeSeries>,
    spaces: Spaces,
    clock: EpisodeClock,
    charge: Decimal,
    status: EpisodeStatus,
    episode: usize,
    info: Vec<StepInfo>,
}

impl BatteryEnv {
    /// Builds an environment over `series`.
    ///
    /// The environment starts in [`EpisodeStatus::NotStarted`]; call
    /// [`BatteryEnv::reset`] before the first step.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfiguration`] if the battery parameters
    /// are invalid, the precision is out of range, `episode_start < lag`, or
    /// the episode window does not fit inside the series.
    pub fn new(
        params: BatteryParams,
        config: EnvConfig,
        series: Arc<TimeSeries>,
    ) -> Result<Self, EnvError> {
        let precision = Precision::new(config.precision)?;
        let model = BatteryModel::new(&params, precision)?;

        if config.episode_start < config.lag {
            return Err(EnvError::InvalidConfiguration(format!(
                "episode_start ({}) must be >= lag ({})",
                config.episode_start, config.lag
            )));
        }
        let available = series.len().saturating_sub(config.episode_start);
        let length = config.episode_length.resolve(available);
        if length == 0 {
            return Err(EnvError::InvalidConfiguration(
                "episode_length must be >= 1".into(),
            ));
        }
        if length > available {
            return Err(EnvError::InvalidConfiguration(format!(
                "episode of {length} steps from row {} exceeds series of {} rows",
                config.episode_start,
                series.len()
            )));
        }

        let spaces = derive_spaces(&params, &series);
        Ok(Self {
            params,
            model,
            config,
            series,
            spaces,
            clock: EpisodeClock::new(length),
            charge: model.initial_charge(),
            status: EpisodeStatus::NotStarted,
            episode: 0,
            info: Vec::with_capacity(length),
        })
    }

    /// Starts a fresh episode and returns its first observation.
    ///
    /// Rewinds the step counter, restores the initial charge, rederives the
    /// spaces, and clears the info log.
    pub fn reset(&mut self) -> Observation {
        if self.status != EpisodeStatus::NotStarted {
            self.episode += 1;
        }
        self.spaces = derive_spaces(&self.params, &self.series);
        self.clock.rewind();
        self.charge = self.model.initial_charge();
        self.info.clear();
        self.status = EpisodeStatus::Running;
        self.observation_at(0, self.charge_f64())
    }

    /// Advances the episode by one step.
    ///
    /// On the terminal step the reward is forced to zero, `done` is set, and
    /// no next observation is returned.
    ///
    /// # Errors
    ///
    /// - [`EnvError::EpisodeNotStarted`] before the first reset.
    /// - [`EnvError::EpisodeAlreadyDone`] after the terminal step.
    /// - [`EnvError::InvalidAction`] if a component is outside `[0, power_rating]`.
    /// - [`EnvError::EnergyBalanceViolation`] if the ledger fails to balance.
    ///
    /// State is unchanged whenever an error is returned.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome, EnvError> {
        match self.status {
            EpisodeStatus::NotStarted => return Err(EnvError::EpisodeNotStarted),
            EpisodeStatus::Done => {
                return Err(EnvError::EpisodeAlreadyDone {
                    episode: self.episode,
                });
            }
            EpisodeStatus::Running => {}
        }

        let step = self.clock.current();
        let old_charge_f64 = self.charge_f64();
        let state = self.state_at(step, old_charge_f64);
        let observation = self.observation_at(step, old_charge_f64);

        let t = self.model.transition(self.charge, action, step)?;
        let cost = step_cost(
            state.electricity_price,
            state.electricity_demand,
            to_f64(t.gross_rate),
        );

        if self.config.verbose > 0 {
            debug!(
                episode = self.episode,
                step,
                charge_rate = action.charge_rate,
                discharge_rate = action.discharge_rate,
                old_charge = %t.old_charge,
                new_charge = %t.new_charge,
                rate = %t.rate,
                losses = %t.losses,
                "battery step"
            );
        }

        self.charge = t.new_charge;
        let new_charge_f64 = to_f64(t.new_charge);

        let done = self.clock.is_last();
        let (reward, next_state, next_observation) = if done {
            self.status = EpisodeStatus::Done;
            if self.config.verbose > 0 {
                info!(episode = self.episode, steps = step + 1, "episode finished");
            }
            (0.0, None, None)
        } else {
            let next_state = self.state_at(step + 1, new_charge_f64);
            let next_observation = self.observation_at(step + 1, new_charge_f64);
            self.clock.advance();
            (cost.reward, Some(next_state), Some(next_observation))
        };

        let info = StepInfo {
            episode: self.episode,
            step,
            state,
            observation,
            action,
            reward,
            next_state,
            next_observation,
            bau_cost: cost.bau_cost,
            rl_cost: cost.rl_cost,
            electricity_price: state.electricity_price,
            electricity_demand: state.electricity_demand,
            net_charge: to_f64(t.net_charge),
            unbounded_new_charge: to_f64(t.unbounded_new_charge),
            bounded_new_charge: to_f64(t.bounded_new_charge),
            unbounded_rate: to_f64(t.unbounded_rate),
            gross_rate: to_f64(t.gross_rate),
            rate: to_f64(t.rate),
            losses: to_f64(t.losses),
            adjusted_demand: cost.adjusted_demand,
            old_charge: to_f64(t.old_charge),
            new_charge: new_charge_f64,
            net_stored: to_f64(t.net_stored),
        };
        self.info.push(info.clone());

        Ok(StepOutcome {
            observation: next_observation,
            reward,
            done,
            info,
        })
    }

    /// Current lifecycle state.
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// Index of the current episode (0 for the first reset).
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Index of the next step to be taken.
    pub fn current_step(&self) -> usize {
        self.clock.current()
    }

    /// Resolved number of steps per episode.
    pub fn episode_length(&self) -> usize {
        self.clock.length()
    }

    /// Stored charge (MWh).
    pub fn charge(&self) -> f64 {
        self.charge_f64()
    }

    /// Technical parameters this environment was built with.
    pub fn params(&self) -> &BatteryParams {
        &self.params
    }

    /// Episode settings this environment was built with.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Action, observation, and reward spaces.
    pub fn spaces(&self) -> &Spaces {
        &self.spaces
    }

    /// The current episode's records in step order.
    pub fn info(&self) -> &[StepInfo] {
        &self.info
    }

    fn charge_f64(&self) -> f64 {
        to_f64(self.charge)
    }

    fn row_observation(&self, row: usize, charge: f64) -> Observation {
        // `new` guarantees every row of the episode window exists.
        let market = self.series.rows()[row];
        Observation {
            electricity_price: market.electricity_price,
            electricity_demand: market.electricity_demand,
            charge,
        }
    }

    fn state_at(&self, step: usize, charge: f64) -> Observation {
        self.row_observation(self.config.episode_start + step, charge)
    }

    fn observation_at(&self, step: usize, charge: f64) -> Observation {
        self.row_observation(self.config.episode_start + step - self.config.lag, charge)
    }
}

fn derive_spaces(params: &BatteryParams, series: &TimeSeries) -> Spaces {
    let price = series.price_range();
    let demand = series.demand_range();
    Spaces {
        action: ActionSpace::for_power_rating(params.power_rating_mw),
        observation: ObservationSpace {
            electricity_price: price,
            electricity_demand: demand,
            charge: ContinuousSpace::new(0.0, params.capacity_mwh),
        },
        reward: reward_space(price, demand, params.power_rating_mw),
    }
}
