//! Post-hoc episode metrics computed from the step records.

use std::fmt;

use serde::Serialize;

use super::clock::STEPS_PER_HOUR;
use super::types::StepInfo;

/// Aggregate figures for one episode.
///
/// Derived from the `StepInfo` records alone, so a summary always agrees
/// with the exported log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    /// Sum of returned rewards (the terminal step contributes zero).
    pub total_reward: f64,
    /// Site cost with the battery idle ($).
    pub bau_cost: f64,
    /// Site cost with the battery's gross rate applied ($).
    pub rl_cost: f64,
    /// `bau_cost - rl_cost`; positive when the battery saved money.
    pub savings: f64,
    /// Energy lost to round-trip inefficiency (MWh).
    pub losses_mwh: f64,
    /// Energy drawn from the grid into the battery, before losses (MWh).
    pub charged_mwh: f64,
    /// Energy returned to the site (MWh).
    pub discharged_mwh: f64,
    /// Throughput over twice the capacity.
    pub equivalent_cycles: f64,
    /// Charge after the last step (MWh).
    pub final_charge: f64,
}

impl EpisodeSummary {
    /// Computes the summary of one episode's records.
    ///
    /// # Arguments
    ///
    /// * `records` - Every `StepInfo` of one episode, in step order
    /// * `capacity_mwh` - Battery capacity for the cycle count
    pub fn from_records(records: &[StepInfo], capacity_mwh: f64) -> Self {
        let steps = f64::from(STEPS_PER_HOUR);
        let mut summary = Self {
            episode: records.first().map_or(0, |r| r.episode),
            steps: records.len(),
            total_reward: 0.0,
            bau_cost: 0.0,
            rl_cost: 0.0,
            savings: 0.0,
            losses_mwh: 0.0,
            charged_mwh: 0.0,
            discharged_mwh: 0.0,
            equivalent_cycles: 0.0,
            final_charge: records.last().map_or(0.0, |r| r.new_charge),
        };

        for r in records {
            summary.total_reward += r.reward;
            summary.bau_cost += r.bau_cost;
            summary.rl_cost += r.rl_cost;
            summary.losses_mwh += r.losses;
            if r.gross_rate > 0.0 {
                summary.charged_mwh += r.gross_rate / steps;
            } else {
                summary.discharged_mwh += -r.gross_rate / steps;
            }
        }

        summary.savings = summary.bau_cost - summary.rl_cost;
        if capacity_mwh > 0.0 {
            summary.equivalent_cycles =
                (summary.charged_mwh + summary.discharged_mwh) / (2.0 * capacity_mwh);
        }
        summary
    }
}

impl fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Episode {} ({} steps) ---", self.episode, self.steps)?;
        writeln!(f, "Total reward:          {:.3}", self.total_reward)?;
        writeln!(f, "BAU cost:              ${:.2}", self.bau_cost)?;
        writeln!(f, "Battery cost:          ${:.2}", self.rl_cost)?;
        writeln!(f, "Savings:               ${:.2}", self.savings)?;
        writeln!(
            f,
            "Charged / discharged:  {:.3} / {:.3} MWh ({:.2} equiv. cycles)",
            self.charged_mwh, self.discharged_mwh, self.equivalent_cycles
        )?;
        writeln!(f, "Losses:                {:.4} MWh", self.losses_mwh)?;
        write!(f, "Final charge:          {:.4} MWh", self.final_charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::types::fixtures::step_info;

    #[test]
    fn sums_costs_and_losses() {
        let records = vec![step_info(0), step_info(1)];
        let s = EpisodeSummary::from_records(&records, 4.0);
        assert_eq!(s.steps, 2);
        assert!((s.bau_cost - 25.0).abs() < 1e-9);
        assert!((s.rl_cost - 25.5).abs() < 1e-9);
        assert!((s.savings + 0.5).abs() < 1e-9);
        assert!((s.losses_mwh - 0.02).abs() < 1e-9);
        assert!((s.total_reward + 25.5).abs() < 1e-9);
    }

    #[test]
    fn splits_charge_and_discharge_throughput() {
        let mut discharge = step_info(1);
        discharge.gross_rate = -2.4;
        let records = vec![step_info(0), discharge];
        let s = EpisodeSummary::from_records(&records, 1.0);
        assert!((s.charged_mwh - 0.1).abs() < 1e-9);
        assert!((s.discharged_mwh - 0.2).abs() < 1e-9);
        assert!((s.equivalent_cycles - 0.15).abs() < 1e-9);
    }

    #[test]
    fn final_charge_is_last_new_charge() {
        let mut last = step_info(1);
        last.new_charge = 2.5;
        let s = EpisodeSummary::from_records(&[step_info(0), last], 4.0);
        assert_eq!(s.final_charge, 2.5);
    }

    #[test]
    fn empty_records() {
        let s = EpisodeSummary::from_records(&[], 4.0);
        assert_eq!(s.steps, 0);
        assert_eq!(s.total_reward, 0.0);
        assert_eq!(s.equivalent_cycles, 0.0);
    }

    #[test]
    fn display_lists_savings() {
        let s = EpisodeSummary::from_records(&[step_info(0)], 4.0);
        assert!(s.to_string().contains("Savings"));
    }
}
