//! Battery technical parameters and the single-step state transition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::env::clock::STEPS_PER_HOUR;
use crate::env::precision::{Precision, to_decimal, to_f64};
use crate::env::types::Action;
use crate::error::EnvError;

/// Absolute tolerance of the energy-balance check (MWh and MW).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Immutable technical parameters of one battery.
///
/// Shared read-only between simulators; never mutated by a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryParams {
    /// Maximum charge or discharge rate (MW).
    pub power_rating_mw: f64,
    /// Maximum stored energy (MWh).
    pub capacity_mwh: f64,
    /// Fraction of charged energy recoverable, in `(0, 1]`.
    pub round_trip_efficiency: f64,
    /// Stored energy at reset (MWh), in `[0, capacity]`.
    pub initial_charge_mwh: f64,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self::new(2.0, 4.0)
    }
}

impl BatteryParams {
    /// Creates parameters with the default 90% efficiency and an empty battery.
    pub fn new(power_rating_mw: f64, capacity_mwh: f64) -> Self {
        Self {
            power_rating_mw,
            capacity_mwh,
            round_trip_efficiency: 0.9,
            initial_charge_mwh: 0.0,
        }
    }

    /// Sets the round-trip efficiency.
    pub fn with_efficiency(mut self, round_trip_efficiency: f64) -> Self {
        self.round_trip_efficiency = round_trip_efficiency;
        self
    }

    /// Sets the charge at reset.
    pub fn with_initial_charge(mut self, initial_charge_mwh: f64) -> Self {
        self.initial_charge_mwh = initial_charge_mwh;
        self
    }

    /// Checks every physical constraint on the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfiguration`] naming the first violation.
    pub fn validate(&self) -> Result<(), EnvError> {
        let invalid = |msg: String| Err(EnvError::InvalidConfiguration(msg));
        if !(self.power_rating_mw.is_finite() && self.power_rating_mw > 0.0) {
            return invalid(format!(
                "power_rating must be > 0, got {}",
                self.power_rating_mw
            ));
        }
        if !(self.capacity_mwh.is_finite() && self.capacity_mwh > 0.0) {
            return invalid(format!("capacity must be > 0, got {}", self.capacity_mwh));
        }
        if !(self.round_trip_efficiency > 0.0 && self.round_trip_efficiency <= 1.0) {
            return invalid(format!(
                "round_trip_efficiency must be in (0, 1], got {}",
                self.round_trip_efficiency
            ));
        }
        if !(self.initial_charge_mwh >= 0.0 && self.initial_charge_mwh <= self.capacity_mwh) {
            return invalid(format!(
                "initial_charge must be in [0, {}], got {}",
                self.capacity_mwh, self.initial_charge_mwh
            ));
        }
        Ok(())
    }
}

/// Every intermediate quantity of one transition, in decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Stored energy before the step (MWh).
    pub old_charge: Decimal,
    /// Requested energy transfer, `(charge - discharge) / STEPS_PER_HOUR` (MWh).
    pub net_charge: Decimal,
    /// `old_charge + net_charge` before any clamp (MWh).
    pub unbounded_new_charge: Decimal,
    /// Unbounded charge clamped to `[0, capacity]` (MWh).
    pub bounded_new_charge: Decimal,
    /// Rate implied by the capacity-clamped delta (MW).
    pub unbounded_rate: Decimal,
    /// Implied rate clamped to the power rating (MW), before losses.
    pub gross_rate: Decimal,
    /// Energy lost on the charging leg (MWh).
    pub losses: Decimal,
    /// Stored energy after the step (MWh).
    pub new_charge: Decimal,
    /// `new_charge - old_charge` (MWh).
    pub net_stored: Decimal,
    /// Rate actually realised net of losses (MW).
    pub rate: Decimal,
}

/// Decimal view of [`BatteryParams`] that performs transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryModel {
    power_rating: Decimal,
    capacity: Decimal,
    efficiency: Decimal,
    initial_charge: Decimal,
    precision: Precision,
}

impl BatteryModel {
    /// Validates `params` and converts them into the decimal domain.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidConfiguration`] if a parameter is out of
    /// range or not representable as a decimal.
    pub fn new(params: &BatteryParams, precision: Precision) -> Result<Self, EnvError> {
        params.validate()?;
        let convert = |name: &str, value: f64| {
            to_decimal(value).ok_or_else(|| {
                EnvError::InvalidConfiguration(format!("{name} is not representable: {value}"))
            })
        };
        let capacity = convert("capacity", params.capacity_mwh)?;
        // Stored charge always sits on the rounding grid, so idling is exact.
        let initial_charge = precision
            .round(convert("initial_charge", params.initial_charge_mwh)?)
            .min(capacity);
        Ok(Self {
            power_rating: convert("power_rating", params.power_rating_mw)?,
            capacity,
            efficiency: convert("round_trip_efficiency", params.round_trip_efficiency)?,
            initial_charge,
            precision,
        })
    }

    /// Stored energy at reset.
    pub fn initial_charge(&self) -> Decimal {
        self.initial_charge
    }

    /// Maximum stored energy.
    pub fn capacity(&self) -> Decimal {
        self.capacity
    }

    /// Maximum charge or discharge rate.
    pub fn power_rating(&self) -> Decimal {
        self.power_rating
    }

    /// Rounding applied to every intermediate value.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Checks both action components against `[0, power_rating]`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidAction`] for the first component outside
    /// its bounds or not a finite number.
    pub fn validate_action(&self, action: Action) -> Result<[Decimal; 2], EnvError> {
        let mut out = [Decimal::ZERO; 2];
        for (index, value) in action.components().into_iter().enumerate() {
            let rejected = EnvError::InvalidAction {
                index,
                value,
                low: 0.0,
                high: to_f64(self.power_rating),
            };
            let decimal = to_decimal(value).ok_or_else(|| rejected.clone())?;
            if decimal < Decimal::ZERO || decimal > self.power_rating {
                return Err(rejected);
            }
            out[index] = decimal;
        }
        Ok(out)
    }

    /// Computes the next stored charge for one step.
    ///
    /// Capacity is clamped first, then the rate implied by the clamped charge
    /// is clamped to the power rating. Losses apply only while charging. The
    /// result is checked against the energy balance before it is returned,
    /// which catches a precision too coarse for the battery's size.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidAction`] if the action is out of bounds and
    /// [`EnvError::EnergyBalanceViolation`] if the ledger does not balance.
    pub fn transition(
        &self,
        old_charge: Decimal,
        action: Action,
        step: usize,
    ) -> Result<Transition, EnvError> {
        let [charge_rate, discharge_rate] = self.validate_action(action)?;
        let p = self.precision;
        let steps = Decimal::from(STEPS_PER_HOUR);

        let net_charge = p.round((charge_rate - discharge_rate) / steps);
        let unbounded_new_charge = p.round(old_charge + net_charge);
        let bounded_new_charge = unbounded_new_charge.clamp(Decimal::ZERO, self.capacity);

        let unbounded_rate = p.round((bounded_new_charge - old_charge) * steps);
        let gross_rate = unbounded_rate.clamp(-self.power_rating, self.power_rating);

        let losses = if gross_rate > Decimal::ZERO {
            p.round(p.round(gross_rate * (Decimal::ONE - self.efficiency)) / steps)
        } else {
            Decimal::ZERO
        };

        let delivered = p.round(gross_rate / steps);
        // Rounding residue can leave the sum a hair outside the physical range.
        let new_charge =
            p.round(p.round(old_charge + delivered) - losses).clamp(Decimal::ZERO, self.capacity);
        let net_stored = p.round(new_charge - old_charge);
        let rate = p.round(net_stored * steps);

        // The reported figures must agree with each other and with the
        // unrounded ledger of what was drawn and lost.
        let ledger_charge = old_charge + gross_rate / steps - losses;
        let charge_residual = (new_charge - p.round(old_charge + net_stored))
            .abs()
            .max((new_charge - ledger_charge).abs());
        let mut rate_residual = (rate - p.round(steps * net_stored)).abs();
        if bounded_new_charge == unbounded_new_charge {
            // No bound applied, so the request must be delivered in full.
            rate_residual =
                rate_residual.max((unbounded_rate - (charge_rate - discharge_rate)).abs());
        }
        if charge_residual >= BALANCE_TOLERANCE || rate_residual >= BALANCE_TOLERANCE {
            return Err(EnvError::EnergyBalanceViolation {
                step,
                charge_residual: charge_residual.to_string(),
                rate_residual: rate_residual.to_string(),
            });
        }

        Ok(Transition {
            old_charge,
            net_charge,
            unbounded_new_charge,
            bounded_new_charge,
            unbounded_rate,
            gross_rate,
            losses,
            new_charge,
            net_stored,
            rate,
        })
    }
}
