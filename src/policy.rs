//! Scripted drivers that choose actions for the environment.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::env::space::ActionSpace;
use crate::env::types::{Action, Observation};

/// Chooses an action from the agent's (possibly lagged) observation.
pub trait Policy {
    /// Returns an action inside `action_space`.
    ///
    /// # Arguments
    ///
    /// * `observation` - What the agent sees this step
    /// * `action_space` - Bounds every component must respect
    fn act(&mut self, observation: &Observation, action_space: &ActionSpace) -> Action;

    /// Short name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Never touches the battery: the business-as-usual baseline.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _observation: &Observation, _action_space: &ActionSpace) -> Action {
        Action::IDLE
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Samples each component uniformly from its space.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation, action_space: &ActionSpace) -> Action {
        let [charge, discharge] = action_space
            .components()
            .map(|s| s.low + self.rng.random::<f64>() * s.width());
        Action::new(charge, discharge)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Charges flat out when power is cheap, discharges flat out when it is dear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    /// Charge at full rate at or below this price ($/MWh).
    pub charge_below: f64,
    /// Discharge at full rate at or above this price ($/MWh).
    pub discharge_above: f64,
}

impl ThresholdPolicy {
    pub fn new(charge_below: f64, discharge_above: f64) -> Self {
        Self {
            charge_below,
            discharge_above,
        }
    }
}

impl Policy for ThresholdPolicy {
    fn act(&mut self, observation: &Observation, action_space: &ActionSpace) -> Action {
        let price = observation.electricity_price;
        if price <= self.charge_below {
            Action::new(action_space.charge.high, 0.0)
        } else if price >= self.discharge_above {
            Action::new(0.0, action_space.discharge.high)
        } else {
            Action::IDLE
        }
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

/// Policy selector as written in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Idle,
    Random,
    Threshold,
}

/// Concrete policy chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyPolicy {
    Idle(IdlePolicy),
    Random(RandomPolicy),
    Threshold(ThresholdPolicy),
}

impl AnyPolicy {
    /// Builds the policy named by `kind`.
    pub fn build(kind: PolicyKind, seed: u64, charge_below: f64, discharge_above: f64) -> Self {
        match kind {
            PolicyKind::Idle => Self::Idle(IdlePolicy),
            PolicyKind::Random => Self::Random(RandomPolicy::new(seed)),
            PolicyKind::Threshold => {
                Self::Threshold(ThresholdPolicy::new(charge_below, discharge_above))
            }
        }
    }
}

impl Policy for AnyPolicy {
    fn act(&mut self, observation: &Observation, action_space: &ActionSpace) -> Action {
        match self {
            Self::Idle(p) => p.act(observation, action_space),
            Self::Random(p) => p.act(observation, action_space),
            Self::Threshold(p) => p.act(observation, action_space),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle(p) => p.name(),
            Self::Random(p) => p.name(),
            Self::Threshold(p) => p.name(),
        }
    }
}
