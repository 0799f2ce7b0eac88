//! Property tests: physical invariants hold for every valid action sequence.

mod common;

use proptest::prelude::*;

use battery_env::env::battery::BatteryParams;
use battery_env::env::clock::STEPS_PER_HOUR;
use battery_env::{Action, StepInfo};

const STEPS: f64 = STEPS_PER_HOUR as f64;

fn params() -> impl Strategy<Value = BatteryParams> {
    (0.1f64..10.0, 0.1f64..10_000.0, 0.5f64..=1.0, 0.0f64..=1.0).prop_map(
        |(power, capacity, efficiency, fill)| {
            BatteryParams::new(power, capacity)
                .with_efficiency(efficiency)
                .with_initial_charge(capacity * fill)
        },
    )
}

/// Action components as fractions of the power rating.
fn fractions(len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 1..=len)
}

fn run(params: BatteryParams, fractions: &[(f64, f64)]) -> Vec<StepInfo> {
    let mut env = common::started_env(params, fractions.len());
    let p = params.power_rating_mw;
    fractions
        .iter()
        .map(|&(c, d)| {
            env.step(Action::new(c * p, d * p))
                .expect("in-bounds action")
                .info
        })
        .collect()
}

proptest! {
    #[test]
    fn charge_stays_within_capacity(params in params(), fr in fractions(48)) {
        for info in run(params, &fr) {
            prop_assert!(info.new_charge >= 0.0);
            prop_assert!(info.new_charge <= params.capacity_mwh + common::EPS);
        }
    }

    #[test]
    fn rate_respects_power_rating(params in params(), fr in fractions(48)) {
        for info in run(params, &fr) {
            prop_assert!(info.gross_rate.abs() <= params.power_rating_mw + common::EPS);
            prop_assert!(info.rate.abs() <= params.power_rating_mw + common::EPS);
        }
    }

    #[test]
    fn energy_is_conserved(params in params(), fr in fractions(48)) {
        let records = run(params, &fr);
        for info in &records {
            let charge_residual = info.new_charge - (info.old_charge + info.net_stored);
            prop_assert!(charge_residual.abs() <= common::EPS);
            let rate_residual = info.rate - STEPS * info.net_stored;
            // The rate carries the rounding of a multiplication by 12.
            prop_assert!(rate_residual.abs() <= STEPS * common::EPS);
        }
        for pair in records.windows(2) {
            prop_assert_eq!(pair[0].new_charge, pair[1].old_charge);
        }
    }

    #[test]
    fn losses_only_on_charge(params in params(), fr in fractions(48)) {
        for info in run(params, &fr) {
            if info.gross_rate <= 0.0 {
                prop_assert_eq!(info.losses, 0.0);
            } else if params.round_trip_efficiency < 1.0 {
                let drawn = info.old_charge + info.gross_rate / STEPS;
                // Topping up next to capacity shrinks the gross rate towards
                // the float resolution of the stored charge.
                if info.gross_rate > 1e-6 {
                    prop_assert!(info.losses > 0.0);
                }
                if info.losses > 1e-9 {
                    prop_assert!(info.new_charge < drawn);
                } else {
                    prop_assert!(info.new_charge <= drawn + common::EPS);
                }
            }
        }
    }

    #[test]
    fn unbounded_request_is_delivered(params in params(), fr in fractions(48)) {
        for (info, &(c, d)) in run(params, &fr).iter().zip(&fr) {
            if info.unbounded_new_charge == info.bounded_new_charge {
                let requested = c * params.power_rating_mw - d * params.power_rating_mw;
                prop_assert!((info.gross_rate - requested).abs() <= common::EPS);
            }
        }
    }

    #[test]
    fn idle_is_a_no_op(params in params(), n in 1usize..24) {
        let mut env = common::started_env(params, n);
        for _ in 0..n {
            let out = env.step(Action::IDLE).expect("idle is valid");
            prop_assert_eq!(out.info.new_charge, out.info.old_charge);
            prop_assert_eq!(out.info.rate, 0.0);
            prop_assert_eq!(out.info.bau_cost, out.info.rl_cost);
        }
    }

    #[test]
    fn out_of_range_action_leaves_state(params in params(), excess in 1.001f64..5.0) {
        let mut env = common::started_env(params, 4);
        env.step(Action::new(params.power_rating_mw * 0.5, 0.0)).expect("valid");
        let before = env.charge();
        let step = env.current_step();
        let bad = Action::new(params.power_rating_mw * excess, 0.0);
        prop_assert!(env.step(bad).is_err());
        prop_assert_eq!(env.charge(), before);
        prop_assert_eq!(env.current_step(), step);
    }
}
