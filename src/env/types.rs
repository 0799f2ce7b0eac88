//! Core environment types: actions, observations, per-step records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An agent's request for one step: `(charge_rate, discharge_rate)` in MW.
///
/// Both components are non-negative; the environment nets them out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Requested charging rate (MW, >= 0).
    pub charge_rate: f64,
    /// Requested discharging rate (MW, >= 0).
    pub discharge_rate: f64,
}

impl Action {
    /// The no-op action `(0, 0)`.
    pub const IDLE: Self = Self {
        charge_rate: 0.0,
        discharge_rate: 0.0,
    };

    pub fn new(charge_rate: f64, discharge_rate: f64) -> Self {
        Self {
            charge_rate,
            discharge_rate,
        }
    }

    /// Components in action-space order.
    pub fn components(&self) -> [f64; 2] {
        [self.charge_rate, self.discharge_rate]
    }
}

/// Market row plus the battery's stored charge.
///
/// Used for both the true state (current row) and the agent's observation
/// (row delayed by the configured lag).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Electricity price ($/MWh).
    pub electricity_price: f64,
    /// Site electricity demand (MW).
    pub electricity_demand: f64,
    /// Stored charge (MWh).
    pub charge: f64,
}

impl Observation {
    /// Features in observation-space order.
    pub fn to_array(&self) -> [f64; 3] {
        [self.electricity_price, self.electricity_demand, self.charge]
    }
}

/// Lifecycle of one environment instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeStatus {
    /// Constructed, never reset.
    NotStarted,
    /// Accepting steps.
    Running,
    /// Terminal step taken; only `reset` is allowed.
    Done,
}

/// Complete record of one step, including every intermediate physics value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepInfo {
    pub episode: usize,
    /// Index of the step this record describes (zero-based).
    pub step: usize,
    pub state: Observation,
    pub observation: Observation,
    pub action: Action,
    /// Reward returned to the agent (zero on the terminal step).
    pub reward: f64,
    /// Absent on the terminal step.
    pub next_state: Option<Observation>,
    /// Absent on the terminal step.
    pub next_observation: Option<Observation>,
    /// Site cost with no battery action ($ per step).
    pub bau_cost: f64,
    /// Site cost including the gross battery rate ($ per step).
    pub rl_cost: f64,
    pub electricity_price: f64,
    pub electricity_demand: f64,
    pub net_charge: f64,
    pub unbounded_new_charge: f64,
    pub bounded_new_charge: f64,
    pub unbounded_rate: f64,
    /// Realised rate before losses (MW).
    pub gross_rate: f64,
    /// Realised rate net of losses (MW).
    pub rate: f64,
    pub losses: f64,
    pub adjusted_demand: f64,
    pub old_charge: f64,
    pub new_charge: f64,
    pub net_stored: f64,
}

impl fmt::Display for StepInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ep={:>3} t={:>4} | price={:>8.2} demand={:>6.2} | action=({:.3}, {:.3}) \
             rate={:>7.3} losses={:.4} | charge {:.4} -> {:.4} | reward={:>9.3}",
            self.episode,
            self.step,
            self.electricity_price,
            self.electricity_demand,
            self.action.charge_rate,
            self.action.discharge_rate,
            self.rate,
            self.losses,
            self.old_charge,
            self.new_charge,
            self.reward,
        )
    }
}

/// What `step` hands back to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Next observation; `None` once the episode is done.
    pub observation: Option<Observation>,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A fully populated record for formatting and export tests.
    pub fn step_info(step: usize) -> StepInfo {
        let obs = Observation {
            electricity_price: 50.0,
            electricity_demand: 3.0,
            charge: 1.0,
        };
        StepInfo {
            episode: 0,
            step,
            state: obs,
            observation: obs,
            action: Action::new(1.2, 0.0),
            reward: -12.75,
            next_state: Some(obs),
            next_observation: Some(obs),
            bau_cost: 12.5,
            rl_cost: 12.75,
            electricity_price: 50.0,
            electricity_demand: 3.0,
            net_charge: 0.1,
            unbounded_new_charge: 1.1,
            bounded_new_charge: 1.1,
            unbounded_rate: 1.2,
            gross_rate: 1.2,
            rate: 1.08,
            losses: 0.01,
            adjusted_demand: 4.2,
            old_charge: 1.0,
            new_charge: 1.09,
            net_stored: 0.09,
        }
    }
}
