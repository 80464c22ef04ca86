//! Milestone and weekly-goal evaluation
//!
//! Stateless re-derivation from the last-30-days record window on each
//! request; no achievement flags are persisted here. Records must be
//! ordered by date descending, so `records[6]` is the oldest day of the
//! most recent week.

use chrono::NaiveDate;
use serde::Serialize;

use super::activity::{ActivityRecord, TransportMode};
use super::footprint::compute_footprint;

/// Records per comparison week
const WEEK: usize = 7;

/// A long-running logging achievement
#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub id: &'static str,
    pub title: &'static str,
    pub achieved: bool,
    /// Date the milestone was crossed; the boundary record's date for the
    /// streak milestones, not today
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_on: Option<NaiveDate>,
}

/// A weekly sustainability goal over the most recent 7 records
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyGoal {
    pub id: &'static str,
    pub title: &'static str,
    pub completed: bool,
    /// Measured reduction percentage, only for the footprint-reduction goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_percent: Option<f64>,
}

/// Evaluate logging milestones over a date-descending record window
pub fn evaluate_milestones(records: &[ActivityRecord]) -> Vec<Milestone> {
    let first_week = Milestone {
        id: "first_week",
        title: "First Week Complete",
        achieved: records.len() >= WEEK,
        achieved_on: records.get(WEEK - 1).map(|r| r.date),
    };

    let consistent = Milestone {
        id: "consistent_logger",
        title: "Consistent Logger",
        achieved: records.len() >= 30,
        achieved_on: if records.len() >= 30 {
            records.get(29).map(|r| r.date)
        } else {
            None
        },
    };

    let reduction = ten_percent_reduction(records);

    vec![first_week, consistent, reduction]
}

/// "10% Reduction": recent-week average at most 90% of the previous week's
///
/// Needs at least 14 records; otherwise it stays un-achieved.
fn ten_percent_reduction(records: &[ActivityRecord]) -> Milestone {
    let mut achieved = false;
    let mut achieved_on = None;

    if records.len() >= WEEK * 2 {
        let recent_avg = average_total(&records[..WEEK]);
        let previous_avg = average_total(&records[WEEK..WEEK * 2]);
        if recent_avg <= previous_avg * 0.9 {
            achieved = true;
            achieved_on = records.first().map(|r| r.date);
        }
    }

    Milestone {
        id: "ten_percent_reduction",
        title: "10% Reduction",
        achieved,
        achieved_on,
    }
}

/// Evaluate the weekly sustainability goals
///
/// Goals are only evaluated once a full week of records exists; with fewer
/// records every goal is reported uncompleted.
pub fn evaluate_weekly_goals(records: &[ActivityRecord]) -> Vec<WeeklyGoal> {
    if records.len() < WEEK {
        return vec![
            goal("reduce_car_usage", "Reduce Car Usage", false, None),
            goal("footprint_reduction", "Reduce Footprint by 5%", false, None),
            goal("eco_day", "Use an Eco-Friendly Transport Day", false, None),
        ];
    }

    let week = &records[..WEEK];

    let car_days = week
        .iter()
        .filter(|r| {
            r.transportation
                .as_ref()
                .is_some_and(|t| t.mode == TransportMode::Car)
        })
        .count();

    let eco_day = week.iter().any(|r| {
        r.transportation
            .as_ref()
            .is_some_and(|t| t.mode.is_eco())
    });

    let (reduction_done, reduction_pct) = footprint_reduction(records);

    vec![
        goal("reduce_car_usage", "Reduce Car Usage", car_days <= 6, None),
        goal(
            "footprint_reduction",
            "Reduce Footprint by 5%",
            reduction_done,
            reduction_pct,
        ),
        goal("eco_day", "Use an Eco-Friendly Transport Day", eco_day, None),
    ]
}

/// Footprint-reduction goal: at least a 5% drop against the previous week
///
/// Requires the previous-week slice to be fully populated.
fn footprint_reduction(records: &[ActivityRecord]) -> (bool, Option<f64>) {
    if records.len() < WEEK * 2 {
        return (false, None);
    }

    let recent_avg = average_total(&records[..WEEK]);
    let previous_avg = average_total(&records[WEEK..WEEK * 2]);
    if previous_avg == 0.0 {
        return (false, Some(0.0));
    }

    let reduction = (previous_avg - recent_avg) / previous_avg * 100.0;
    (reduction >= 5.0, Some(reduction))
}

fn average_total(records: &[ActivityRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records
        .iter()
        .map(|r| compute_footprint(r).total)
        .sum::<f64>()
        / records.len() as f64
}

fn goal(
    id: &'static str,
    title: &'static str,
    completed: bool,
    reduction_percent: Option<f64>,
) -> WeeklyGoal {
    WeeklyGoal {
        id,
        title,
        completed,
        reduction_percent,
    }
}
