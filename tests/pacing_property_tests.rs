//! Property-based tests for the pacing engine.
//!
//! These use proptest to verify the invariants the dashboard and alert
//! pipeline rely on: measured paces are finite and non-negative, expected
//! delivery never exceeds the goal, unmeasured campaigns stay neutral, and
//! more delivery never makes a campaign look worse.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use influence_api::models::{PaceStatus, PacingBasis};
use influence_api::services::pacing::{evaluate_pacing, PaceThresholds, PacingInput};

// Strategies for generating test data
fn goal_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000
}

fn duration_strategy() -> impl Strategy<Value = i32> {
    1i32..1_000
}

fn units_strategy() -> impl Strategy<Value = i64> {
    0i64..20_000_000
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
}

/// A fully-specified campaign and an evaluation date strictly after launch.
fn measured_scenario() -> impl Strategy<Value = (PacingInput, NaiveDate)> {
    (
        goal_strategy(),
        duration_strategy(),
        units_strategy(),
        units_strategy(),
        1i64..2_000,
    )
        .prop_map(|(goal, duration, allocation, placement, elapsed)| {
            (
                PacingInput {
                    goal: Some(goal),
                    start_date: Some(start_date()),
                    duration_days: Some(duration),
                    allocation_units: allocation,
                    placement_units: placement,
                },
                start_date() + Duration::days(elapsed),
            )
        })
}

fn thresholds_strategy() -> impl Strategy<Value = PaceThresholds> {
    (0.05f64..0.5, 0.5f64..0.95)
        .prop_map(|(critical, warning)| PaceThresholds { warning, critical })
}

fn rank(status: PaceStatus) -> u8 {
    match status {
        PaceStatus::Critical => 0,
        PaceStatus::Behind => 1,
        PaceStatus::OnTrack => 2,
    }
}

// Property: measured evaluations stay within their numeric envelope
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn measured_pace_is_finite_and_non_negative(
        (input, today) in measured_scenario(),
        thresholds in thresholds_strategy(),
    ) {
        let report = evaluate_pacing(&input, thresholds, today);

        prop_assert_eq!(report.basis, PacingBasis::Measured);
        prop_assert!(report.pace.is_finite(), "pace must be finite, got {}", report.pace);
        prop_assert!(report.pace >= 0.0, "pace must be non-negative, got {}", report.pace);
        prop_assert!(report.elapsed_days >= 1);
    }

    #[test]
    fn expected_delivery_never_exceeds_the_goal(
        (input, today) in measured_scenario(),
        thresholds in thresholds_strategy(),
    ) {
        let report = evaluate_pacing(&input, thresholds, today);
        let goal = input.goal.unwrap() as f64;

        prop_assert!(report.expected_units > 0.0);
        prop_assert!(
            report.expected_units <= goal,
            "expected {} exceeds goal {}",
            report.expected_units,
            goal
        );
    }

    #[test]
    fn finished_flights_are_measured_against_the_full_goal(
        goal in goal_strategy(),
        duration in duration_strategy(),
        delivered in units_strategy(),
        days_past_end in 0i64..1_000,
    ) {
        let input = PacingInput {
            goal: Some(goal),
            start_date: Some(start_date()),
            duration_days: Some(duration),
            allocation_units: delivered,
            placement_units: 0,
        };
        let today = start_date() + Duration::days(i64::from(duration) + days_past_end);

        let report = evaluate_pacing(&input, PaceThresholds::default(), today);
        prop_assert_eq!(report.expected_units, goal as f64);
    }

    #[test]
    fn actual_units_is_the_larger_delivery_total(
        (input, today) in measured_scenario(),
    ) {
        let report = evaluate_pacing(&input, PaceThresholds::default(), today);
        prop_assert_eq!(
            report.actual_units,
            input.allocation_units.max(input.placement_units)
        );
    }

    #[test]
    fn status_always_agrees_with_the_classifier(
        (input, today) in measured_scenario(),
        thresholds in thresholds_strategy(),
    ) {
        let report = evaluate_pacing(&input, thresholds, today);
        prop_assert_eq!(
            report.status,
            PaceStatus::classify(report.pace, thresholds.warning, thresholds.critical)
        );
    }
}

// Property: delivery level maps onto the status bands
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn delivering_expected_or_more_is_on_track(
        goal in goal_strategy(),
        duration in duration_strategy(),
        elapsed in 1i64..2_000,
        thresholds in thresholds_strategy(),
    ) {
        // Hand the campaign its whole goal up front; pace can never dip
        // below 1.0 whatever the window looks like.
        let input = PacingInput {
            goal: Some(goal),
            start_date: Some(start_date()),
            duration_days: Some(duration),
            allocation_units: goal,
            placement_units: 0,
        };
        let today = start_date() + Duration::days(elapsed);

        let report = evaluate_pacing(&input, thresholds, today);
        prop_assert!(report.pace >= 1.0);
        prop_assert_eq!(report.status, PaceStatus::OnTrack);
    }

    #[test]
    fn zero_delivery_on_a_live_flight_is_critical(
        goal in goal_strategy(),
        duration in duration_strategy(),
        elapsed in 1i64..2_000,
        thresholds in thresholds_strategy(),
    ) {
        let input = PacingInput {
            goal: Some(goal),
            start_date: Some(start_date()),
            duration_days: Some(duration),
            allocation_units: 0,
            placement_units: 0,
        };
        let today = start_date() + Duration::days(elapsed);

        let report = evaluate_pacing(&input, thresholds, today);
        prop_assert_eq!(report.pace, 0.0);
        prop_assert_eq!(report.status, PaceStatus::Critical);
    }

    #[test]
    fn more_delivery_never_makes_pacing_worse(
        goal in goal_strategy(),
        duration in duration_strategy(),
        base in units_strategy(),
        extra in 0i64..1_000_000,
        elapsed in 1i64..2_000,
        thresholds in thresholds_strategy(),
    ) {
        let today = start_date() + Duration::days(elapsed);
        let evaluate = |units: i64| {
            evaluate_pacing(
                &PacingInput {
                    goal: Some(goal),
                    start_date: Some(start_date()),
                    duration_days: Some(duration),
                    allocation_units: units,
                    placement_units: 0,
                },
                thresholds,
                today,
            )
        };

        let before = evaluate(base);
        let after = evaluate(base + extra);

        prop_assert!(after.pace >= before.pace);
        prop_assert!(
            rank(after.status) >= rank(before.status),
            "delivery increase dropped status from {:?} to {:?}",
            before.status,
            after.status
        );
    }
}

// Property: incomplete inputs are neutral, with the gap reported in order
proptest! {
    #[test]
    fn missing_goal_wins_over_other_gaps(
        duration in proptest::option::of(duration_strategy()),
        has_start in any::<bool>(),
        delivered in units_strategy(),
    ) {
        let input = PacingInput {
            goal: None,
            start_date: has_start.then(start_date),
            duration_days: duration,
            allocation_units: delivered,
            placement_units: 0,
        };

        let report = evaluate_pacing(&input, PaceThresholds::default(), start_date());
        prop_assert_eq!(report.basis, PacingBasis::MissingGoal);
    }

    #[test]
    fn unmeasured_reports_are_neutral(
        goal in proptest::option::of(goal_strategy()),
        duration in proptest::option::of(duration_strategy()),
        has_start in any::<bool>(),
        delivered in units_strategy(),
        elapsed in 1i64..2_000,
    ) {
        let input = PacingInput {
            goal,
            start_date: has_start.then(start_date),
            duration_days: duration,
            allocation_units: delivered,
            placement_units: 0,
        };

        let report = evaluate_pacing(&input, PaceThresholds::default(), start_date() + Duration::days(elapsed));
        if !report.basis.is_measured() {
            prop_assert_eq!(report.pace, 1.0);
            prop_assert_eq!(report.status, PaceStatus::OnTrack);
        } else {
            // Everything was present after all.
            prop_assert!(goal.is_some() && has_start && duration.is_some());
        }
    }

    #[test]
    fn flights_never_pace_before_launch(
        goal in goal_strategy(),
        duration in duration_strategy(),
        delivered in units_strategy(),
        days_early in 0i64..1_000,
    ) {
        let input = PacingInput {
            goal: Some(goal),
            start_date: Some(start_date()),
            duration_days: Some(duration),
            allocation_units: delivered,
            placement_units: 0,
        };
        let today = start_date() - Duration::days(days_early);

        let report = evaluate_pacing(&input, PaceThresholds::default(), today);
        prop_assert_eq!(report.basis, PacingBasis::NotStarted);
        prop_assert_eq!(report.status, PaceStatus::OnTrack);
        prop_assert!(report.elapsed_days <= 0);
    }
}
