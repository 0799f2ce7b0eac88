//! Cost-based reward for one step.

use crate::env::clock::STEPS_PER_HOUR;

/// Site costs for one step and the reward derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCost {
    /// Cost had the battery done nothing ($).
    pub bau_cost: f64,
    /// Demand plus the gross battery rate (MW).
    pub adjusted_demand: f64,
    /// Cost including the battery's gross draw ($).
    pub rl_cost: f64,
    /// `-rl_cost`.
    pub reward: f64,
}

/// Prices one step of site demand with the battery's gross rate applied.
///
/// The gross rate (before losses) is charged so that round-trip inefficiency
/// shows up as real energy bought by the site.
///
/// # Examples
///
/// ```
/// use battery_env::env::reward::step_cost;
///
/// let cost = step_cost(60.0, 3.0, 0.0);
/// assert_eq!(cost.reward, -15.0);
/// assert_eq!(cost.bau_cost, cost.rl_cost);
/// ```
pub fn step_cost(price: f64, demand: f64, gross_rate: f64) -> StepCost {
    let steps = f64::from(STEPS_PER_HOUR);
    let bau_cost = (demand / steps) * price;
    let adjusted_demand = demand + gross_rate;
    let rl_cost = (adjusted_demand / steps) * price;
    StepCost {
        bau_cost,
        adjusted_demand,
        rl_cost,
        reward: -rl_cost,
    }
}
