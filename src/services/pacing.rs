use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config;
use crate::models::{PaceStatus, PacingBasis};

/// Raw campaign numbers the pacing engine works from. Delivered totals are
/// tracked separately per source because vendor counts and playlist counts
/// overlap: a stream delivered through a placement usually shows up in the
/// vendor's total too, so the two sums are alternatives, not addends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingInput {
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
    pub allocation_units: i64,
    pub placement_units: i64,
}

impl PacingInput {
    /// The delivered figure used against the goal: the larger of the vendor
    /// allocation total and the playlist placement total.
    pub fn actual_units(&self) -> i64 {
        self.allocation_units.max(self.placement_units)
    }
}

/// Warning and critical cutoffs as fractions of expected delivery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceThresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for PaceThresholds {
    fn default() -> Self {
        Self {
            warning: config::DEFAULT_PACE_WARNING_THRESHOLD,
            critical: config::DEFAULT_PACE_CRITICAL_THRESHOLD,
        }
    }
}

/// Outcome of one pacing evaluation.
///
/// When `basis` is anything other than `Measured`, the campaign could not be
/// measured and `pace` holds the neutral value `1.0`. Callers surface those
/// campaigns through the data-gaps report instead of pace alerts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PacingReport {
    pub pace: f64,
    pub expected_units: f64,
    pub actual_units: i64,
    pub elapsed_days: i64,
    pub basis: PacingBasis,
    pub status: PaceStatus,
}

impl PacingReport {
    fn unmeasured(basis: PacingBasis, actual_units: i64, elapsed_days: i64) -> Self {
        Self {
            pace: 1.0,
            expected_units: 0.0,
            actual_units,
            elapsed_days,
            basis,
            status: PaceStatus::OnTrack,
        }
    }
}

/// Evaluate a campaign's delivery pace as of `today`.
///
/// Expected delivery is linear interpolation toward the goal:
/// `(goal / duration_days) * elapsed_days`, with elapsed days clamped to the
/// duration so expected never exceeds the goal. Pace is `actual / expected`.
pub fn evaluate_pacing(
    input: &PacingInput,
    thresholds: PaceThresholds,
    today: NaiveDate,
) -> PacingReport {
    let actual = input.actual_units();

    let goal = match input.goal {
        Some(goal) if goal > 0 => goal,
        _ => return PacingReport::unmeasured(PacingBasis::MissingGoal, actual, 0),
    };

    let start_date = match input.start_date {
        Some(date) => date,
        None => return PacingReport::unmeasured(PacingBasis::MissingStartDate, actual, 0),
    };

    let duration_days = match input.duration_days {
        Some(days) if days > 0 => i64::from(days),
        _ => return PacingReport::unmeasured(PacingBasis::MissingDuration, actual, 0),
    };

    let elapsed_days = (today - start_date).num_days();
    if elapsed_days <= 0 {
        return PacingReport::unmeasured(PacingBasis::NotStarted, actual, elapsed_days);
    }

    // Clamp to the window end so a finished campaign is measured against the
    // full goal, exactly, without float drift.
    let expected_units = if elapsed_days >= duration_days {
        goal as f64
    } else {
        (goal as f64 / duration_days as f64) * elapsed_days as f64
    };

    let pace = actual as f64 / expected_units;
    let status = PaceStatus::classify(pace, thresholds.warning, thresholds.critical);

    PacingReport {
        pace,
        expected_units,
        actual_units: actual,
        elapsed_days,
        basis: PacingBasis::Measured,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(goal: i64, duration: i32, allocation: i64, placement: i64) -> PacingInput {
        PacingInput {
            goal: Some(goal),
            start_date: Some(day(2026, 3, 1)),
            duration_days: Some(duration),
            allocation_units: allocation,
            placement_units: placement,
        }
    }

    #[test]
    fn halfway_through_at_eighty_percent_is_on_track() {
        // 100k goal over 30 days, 15 elapsed: expected 50k. 40k delivered is
        // exactly 80% of expected, which sits on the boundary and stays clean.
        let report = evaluate_pacing(
            &input(100_000, 30, 40_000, 0),
            PaceThresholds::default(),
            day(2026, 3, 16),
        );

        assert_eq!(report.basis, PacingBasis::Measured);
        assert_eq!(report.elapsed_days, 15);
        assert_eq!(report.expected_units, 50_000.0);
        assert_eq!(report.pace, 0.8);
        assert_eq!(report.status, PaceStatus::OnTrack);
    }

    #[test]
    fn just_under_warning_threshold_is_behind() {
        let report = evaluate_pacing(
            &input(100_000, 30, 39_999, 0),
            PaceThresholds::default(),
            day(2026, 3, 16),
        );

        assert_eq!(report.status, PaceStatus::Behind);
    }

    #[test]
    fn below_half_of_expected_is_critical() {
        let report = evaluate_pacing(
            &input(100_000, 30, 24_000, 0),
            PaceThresholds::default(),
            day(2026, 3, 16),
        );

        assert!(report.pace < 0.5);
        assert_eq!(report.status, PaceStatus::Critical);
    }

    #[test]
    fn actual_is_max_of_allocation_and_placement_totals() {
        let report = evaluate_pacing(
            &input(100_000, 30, 30_000, 45_000),
            PaceThresholds::default(),
            day(2026, 3, 16),
        );

        assert_eq!(report.actual_units, 45_000);
    }

    #[test]
    fn missing_goal_is_neutral_with_basis() {
        let mut no_goal = input(100_000, 30, 10_000, 0);
        no_goal.goal = None;

        let report = evaluate_pacing(&no_goal, PaceThresholds::default(), day(2026, 3, 16));
        assert_eq!(report.basis, PacingBasis::MissingGoal);
        assert_eq!(report.pace, 1.0);
        assert_eq!(report.status, PaceStatus::OnTrack);
    }

    #[test]
    fn zero_goal_counts_as_missing() {
        let mut zero_goal = input(0, 30, 10_000, 0);
        zero_goal.goal = Some(0);

        let report = evaluate_pacing(&zero_goal, PaceThresholds::default(), day(2026, 3, 16));
        assert_eq!(report.basis, PacingBasis::MissingGoal);
    }

    #[test]
    fn missing_start_date_is_neutral_with_basis() {
        let mut no_start = input(100_000, 30, 10_000, 0);
        no_start.start_date = None;

        let report = evaluate_pacing(&no_start, PaceThresholds::default(), day(2026, 3, 16));
        assert_eq!(report.basis, PacingBasis::MissingStartDate);
        assert_eq!(report.status, PaceStatus::OnTrack);
    }

    #[test]
    fn missing_duration_is_neutral_with_basis() {
        let mut no_duration = input(100_000, 30, 10_000, 0);
        no_duration.duration_days = None;

        let report = evaluate_pacing(&no_duration, PaceThresholds::default(), day(2026, 3, 16));
        assert_eq!(report.basis, PacingBasis::MissingDuration);
    }

    #[test]
    fn start_day_itself_is_not_started() {
        let report = evaluate_pacing(
            &input(100_000, 30, 0, 0),
            PaceThresholds::default(),
            day(2026, 3, 1),
        );

        assert_eq!(report.basis, PacingBasis::NotStarted);
        assert_eq!(report.status, PaceStatus::OnTrack);
    }

    #[test]
    fn future_start_date_is_not_started() {
        let report = evaluate_pacing(
            &input(100_000, 30, 0, 0),
            PaceThresholds::default(),
            day(2026, 2, 20),
        );

        assert_eq!(report.basis, PacingBasis::NotStarted);
        assert!(report.elapsed_days < 0);
    }

    #[test]
    fn expected_caps_at_goal_after_window_ends() {
        // 45 days into a 30-day window: expected stays pinned at the goal.
        let report = evaluate_pacing(
            &input(100_000, 30, 100_000, 0),
            PaceThresholds::default(),
            day(2026, 4, 15),
        );

        assert_eq!(report.expected_units, 100_000.0);
        assert_eq!(report.pace, 1.0);
        assert_eq!(report.status, PaceStatus::OnTrack);
    }

    #[test]
    fn overdelivery_pushes_pace_above_one() {
        let report = evaluate_pacing(
            &input(100_000, 30, 80_000, 0),
            PaceThresholds::default(),
            day(2026, 3, 16),
        );

        assert!(report.pace > 1.0);
        assert_eq!(report.status, PaceStatus::OnTrack);
    }
}
