//! Bounded continuous spaces for actions, observations, and rewards.

use serde::Serialize;

use crate::env::clock::STEPS_PER_HOUR;

/// A closed interval `[low, high]` on the real line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContinuousSpace {
    pub low: f64,
    pub high: f64,
}

impl ContinuousSpace {
    /// Creates a space spanning `[low, high]`.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Returns `true` when `value` lies inside the interval (NaN never does).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Maps `value` onto `[0, 1]` relative to the interval.
    ///
    /// A degenerate space (`low == high`) normalises everything to `0.0`.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.high - self.low;
        if range == 0.0 {
            return 0.0;
        }
        (value - self.low) / range
    }

    /// Width of the interval.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// The two non-negative action components: charge rate and discharge rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionSpace {
    pub charge: ContinuousSpace,
    pub discharge: ContinuousSpace,
}

impl ActionSpace {
    /// Both components bounded by `[0, power_rating]`.
    pub fn for_power_rating(power_rating_mw: f64) -> Self {
        let bound = ContinuousSpace::new(0.0, power_rating_mw);
        Self {
            charge: bound,
            discharge: bound,
        }
    }

    /// Component spaces in action order.
    pub fn components(&self) -> [ContinuousSpace; 2] {
        [self.charge, self.discharge]
    }
}

/// Bounds of each observation feature, in observation order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationSpace {
    pub electricity_price: ContinuousSpace,
    pub electricity_demand: ContinuousSpace,
    pub charge: ContinuousSpace,
}

impl ObservationSpace {
    /// Component spaces in the order produced by `Observation::to_array`.
    pub fn components(&self) -> [ContinuousSpace; 3] {
        [self.electricity_price, self.electricity_demand, self.charge]
    }
}

/// Derives the reward bounds from the series extremes and the power rating.
///
/// The reward is `-(adjusted_demand / STEPS_PER_HOUR) * price`, with adjusted
/// demand ranging over `[min_demand - power_rating, max_demand + power_rating]`.
/// The bounds are the extremes over the four corners of that rectangle.
pub fn reward_space(
    price: ContinuousSpace,
    demand: ContinuousSpace,
    power_rating_mw: f64,
) -> ContinuousSpace {
    let steps = f64::from(STEPS_PER_HOUR);
    let adjusted = [demand.low - power_rating_mw, demand.high + power_rating_mw];
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for a in adjusted {
        for p in [price.low, price.high] {
            let reward = -(a / steps) * p;
            low = low.min(reward);
            high = high.max(reward);
        }
    }
    ContinuousSpace::new(low, high)
}
