//! Goal progress and pacing.
//!
//! Percentages are total functions: an absent or non-positive goal yields
//! `0.0` for group figures and `None` for personal ones, never a division
//! by zero.

use super::aggregator::{ordered_sum, per_person_rollup};
use crate::models::{ActivityRecord, Goals, LeaderboardEntry, Pacing};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// `100 * total / goal`, or `0.0` when there is no usable goal.
pub fn goal_progress_percent(total_km: f64, goal_km: Option<f64>) -> f64 {
    match goal_km {
        Some(goal) if goal.is_finite() && goal > 0.0 => 100.0 * total_km / goal,
        _ => 0.0,
    }
}

/// Progress of the whole roster against the shared goal.
pub fn collective_goal_progress(total_km: f64, goals: &Goals) -> f64 {
    goal_progress_percent(total_km, goals.collective_km)
}

/// Sum of the personal goals of the selected people. People without a goal
/// contribute nothing, and a name listed twice counts once.
pub fn selection_goal_km(selected: &[String], goals: &Goals) -> f64 {
    let people: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
    ordered_sum(
        people
            .into_iter()
            .filter_map(|person| goals.for_person(person))
            .collect(),
    )
}

/// Progress of a subset of people against the sum of their personal goals.
pub fn selection_goal_progress(total_km: f64, selected: &[String], goals: &Goals) -> f64 {
    goal_progress_percent(total_km, Some(selection_goal_km(selected, goals)))
}

/// A person's progress towards their own goal.
///
/// Returns `None` when the person has no goal, which is distinct from
/// `Some(0.0)` for a goal with no distance logged yet.
pub fn per_person_goal_progress(person: &str, total_km: f64, goals: &Goals) -> Option<f64> {
    goals
        .for_person(person)
        .filter(|goal| goal.is_finite() && *goal > 0.0)
        .map(|goal| 100.0 * total_km / goal)
}

/// Number of days in the calendar year.
pub fn year_length(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// 1-based ordinal day within the year.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Share of the year elapsed by `today`, as a percentage.
///
/// This is where an evenly paced group would stand against a yearly goal.
pub fn expected_progress_percent(today: NaiveDate) -> f64 {
    100.0 * day_of_year(today) as f64 / year_length(today.year()) as f64
}

/// Expected progress for a view of one calendar year, seen from `today`.
///
/// A year that has ended is expected to be complete and one that has not
/// started yet to be at zero. Without a year the current one is assumed.
pub fn expected_progress_in_year(year: Option<i32>, today: NaiveDate) -> f64 {
    match year {
        Some(year) if year < today.year() => 100.0,
        Some(year) if year > today.year() => 0.0,
        _ => expected_progress_percent(today),
    }
}

fn pacing_from(actual_percent: f64, expected_percent: f64) -> Pacing {
    Pacing {
        actual_percent,
        expected_percent,
        delta_percent: actual_percent - expected_percent,
    }
}

/// Compare actual progress with an even pace through the current year.
///
/// A positive `delta_percent` means ahead of schedule.
pub fn pacing(actual_percent: f64, today: NaiveDate) -> Pacing {
    pacing_from(actual_percent, expected_progress_percent(today))
}

/// Like [`pacing`], but for a view restricted to `year`.
pub fn pacing_for_year(actual_percent: f64, year: Option<i32>, today: NaiveDate) -> Pacing {
    pacing_from(actual_percent, expected_progress_in_year(year, today))
}

/// People ranked by total distance.
///
/// Equal totals are ordered by name so the ranking does not depend on the
/// order records were registered in. Ranks run 1..n without gaps.
pub fn leaderboard(records: &[ActivityRecord], goals: &Goals) -> Vec<LeaderboardEntry> {
    let mut totals = per_person_rollup(records);
    totals.sort_by(|a, b| {
        b.total_km
            .total_cmp(&a.total_km)
            .then_with(|| a.person.cmp(&b.person))
    });

    totals
        .into_iter()
        .enumerate()
        .map(|(i, total)| LeaderboardEntry {
            rank: i + 1,
            progress_percent: per_person_goal_progress(&total.person, total.total_km, goals),
            person: total.person,
            total_km: total.total_km,
            activity_count: total.activity_count,
        })
        .collect()
}
