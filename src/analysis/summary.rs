//! Assembles every statistic for one view of the data.

use super::aggregator::{
    cumulative_by_date, filter_people, filter_year, monthly_rollup, most_recent,
    per_activity_rollup, total_distance, total_minutes, weekly_rollup,
};
use super::progress::{
    collective_goal_progress, leaderboard, pacing_for_year, selection_goal_km,
    selection_goal_progress,
};
use crate::models::{ActivityRecord, GoalMode, Goals, MotivationalTier, StatsSummary};
use chrono::NaiveDate;
use tracing::debug;

/// Parameters for a statistics view.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// People to include. Empty means the whole roster.
    pub selection: Vec<String>,
    /// Restrict to one calendar year.
    pub year: Option<i32>,
    /// Reference date for expected pacing.
    pub today: NaiveDate,
    /// Number of recent activities to include.
    pub recent_limit: usize,
}

/// Whether the selection amounts to the whole roster.
///
/// With an open roster only an empty selection means everyone.
fn is_full_roster(selection: &[String], roster: &[String]) -> bool {
    selection.is_empty()
        || (!roster.is_empty() && roster.iter().all(|name| selection.contains(name)))
}

/// Compute the full statistics summary for a record snapshot.
///
/// The whole roster is measured against the collective goal. A subset of
/// people is measured against the sum of their personal goals.
pub fn build_summary(
    records: &[ActivityRecord],
    goals: &Goals,
    roster: &[String],
    request: &SummaryRequest,
) -> StatsSummary {
    let mut view = filter_people(records, &request.selection);
    if let Some(year) = request.year {
        view = filter_year(&view, year);
    }
    debug!(
        "Summarizing {} of {} records (selection: {:?}, year: {:?})",
        view.len(),
        records.len(),
        request.selection,
        request.year
    );

    let total_km = total_distance(&view);
    let (goal_mode, goal_km, actual) = if is_full_roster(&request.selection, roster) {
        (
            GoalMode::Collective,
            goals.collective_km,
            collective_goal_progress(total_km, goals),
        )
    } else {
        let goal_km = Some(selection_goal_km(&request.selection, goals)).filter(|km| *km > 0.0);
        (
            GoalMode::Selection,
            goal_km,
            selection_goal_progress(total_km, &request.selection, goals),
        )
    };

    StatsSummary {
        generated_on: request.today,
        selection: request.selection.clone(),
        year: request.year,
        activity_count: view.len(),
        total_km,
        total_minutes: total_minutes(&view),
        goal_mode,
        goal_km,
        pacing: pacing_for_year(actual, request.year, request.today),
        tier: MotivationalTier::from_progress(actual),
        leaderboard: leaderboard(&view, goals),
        per_activity: per_activity_rollup(&view),
        monthly: monthly_rollup(&view),
        weekly: weekly_rollup(&view),
        cumulative: cumulative_by_date(&view),
        recent: most_recent(&view, request.recent_limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn roster() -> Vec<String> {
        ["Kaia", "Eirik", "Silje"].iter().map(|s| s.to_string()).collect()
    }

    fn goals() -> Goals {
        Goals {
            collective_km: Some(100.0),
            individual_km: [("Kaia".to_string(), 40.0), ("Eirik".to_string(), 10.0)]
                .into_iter()
                .collect(),
        }
    }

    fn records() -> Vec<ActivityRecord> {
        vec![
            ActivityRecord::new(date(2025, 1, 10), "Kaia", ActivityType::Run, 5.0, 30).unwrap(),
            ActivityRecord::new(date(2025, 1, 10), "Kaia", ActivityType::Run, 3.0, 20).unwrap(),
            ActivityRecord::new(date(2025, 2, 1), "Eirik", ActivityType::Walk, 2.0, 25).unwrap(),
            ActivityRecord::new(date(2024, 6, 1), "Silje", ActivityType::Run, 15.0, 80).unwrap(),
        ]
    }

    fn request(selection: &[&str], year: Option<i32>) -> SummaryRequest {
        SummaryRequest {
            selection: selection.iter().map(|s| s.to_string()).collect(),
            year,
            today: date(2025, 2, 1),
            recent_limit: 10,
        }
    }

    #[test]
    fn test_full_roster_uses_collective_goal() {
        let summary = build_summary(&records(), &goals(), &roster(), &request(&[], None));

        assert_eq!(summary.goal_mode, GoalMode::Collective);
        assert_eq!(summary.goal_km, Some(100.0));
        assert_eq!(summary.total_km, 25.0);
        assert_eq!(summary.pacing.actual_percent, 25.0);
        assert_eq!(summary.tier, MotivationalTier::Building);
        assert_eq!(summary.activity_count, 4);
        assert_eq!(summary.total_minutes, 155);
        assert_eq!(summary.leaderboard[0].person, "Silje");
        assert_eq!(summary.recent[0].person(), "Eirik");

        // Selecting every name is the same as selecting nobody
        let everyone = build_summary(
            &records(),
            &goals(),
            &roster(),
            &request(&["Silje", "Kaia", "Eirik"], None),
        );
        assert_eq!(everyone.goal_mode, GoalMode::Collective);
    }

    #[test]
    fn test_subset_uses_individual_goals() {
        let summary = build_summary(
            &records(),
            &goals(),
            &roster(),
            &request(&["Kaia", "Eirik"], None),
        );

        assert_eq!(summary.goal_mode, GoalMode::Selection);
        assert_eq!(summary.goal_km, Some(50.0));
        assert_eq!(summary.total_km, 10.0);
        assert_eq!(summary.pacing.actual_percent, 20.0);
        assert_eq!(summary.leaderboard.len(), 2);
    }

    #[test]
    fn test_subset_without_goals_reports_zero() {
        let summary = build_summary(&records(), &goals(), &roster(), &request(&["Silje"], None));

        assert_eq!(summary.goal_mode, GoalMode::Selection);
        assert_eq!(summary.goal_km, None);
        assert_eq!(summary.pacing.actual_percent, 0.0);
        assert_eq!(summary.leaderboard[0].progress_percent, None);
    }

    #[test]
    fn test_year_filter() {
        let summary = build_summary(&records(), &goals(), &roster(), &request(&[], Some(2025)));

        assert_eq!(summary.activity_count, 3);
        assert_eq!(summary.total_km, 10.0);
        assert_eq!(summary.cumulative.len(), 2);
        assert_eq!(summary.cumulative[0].cumulative_km, 8.0);
        assert_eq!(summary.monthly.len(), 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let summary = build_summary(&[], &goals(), &roster(), &request(&[], None));

        assert_eq!(summary.total_km, 0.0);
        assert_eq!(summary.pacing.actual_percent, 0.0);
        assert_eq!(summary.tier, MotivationalTier::Low);
        assert!(summary.leaderboard.is_empty());
        assert!(summary.cumulative.is_empty());
    }

    #[test]
    fn test_duplicate_names_in_selection() {
        let records = vec![
            ActivityRecord::new(date(2025, 1, 10), "Kaia", ActivityType::Run, 10.0, 60).unwrap(),
        ];
        let single = build_summary(&records, &goals(), &roster(), &request(&["Kaia"], None));
        let twice = build_summary(
            &records,
            &goals(),
            &roster(),
            &request(&["Kaia", "Kaia"], None),
        );

        assert_eq!(single.goal_km, Some(40.0));
        assert_eq!(twice.goal_km, Some(40.0));
        assert_eq!(twice.pacing.actual_percent, 25.0);
        assert_eq!(twice.pacing, single.pacing);
    }

    #[test]
    fn test_open_roster_subset_uses_individual_goals() {
        let records = vec![
            ActivityRecord::new(date(2025, 1, 10), "Kaia", ActivityType::Run, 10.0, 60).unwrap(),
            ActivityRecord::new(date(2025, 1, 11), "Eirik", ActivityType::Run, 90.0, 500)
                .unwrap(),
        ];

        let subset = build_summary(&records, &goals(), &[], &request(&["Kaia"], None));
        assert_eq!(subset.goal_mode, GoalMode::Selection);
        assert_eq!(subset.goal_km, Some(40.0));
        assert_eq!(subset.pacing.actual_percent, 25.0);

        let everyone = build_summary(&records, &goals(), &[], &request(&[], None));
        assert_eq!(everyone.goal_mode, GoalMode::Collective);
        assert_eq!(everyone.pacing.actual_percent, 100.0);
    }

    #[test]
    fn test_past_year_is_paced_against_full_year() {
        let mut past = request(&[], Some(2024));
        past.today = date(2026, 2, 1);
        let summary = build_summary(&records(), &goals(), &roster(), &past);

        assert_eq!(summary.total_km, 15.0);
        assert_eq!(summary.pacing.expected_percent, 100.0);
        assert_eq!(summary.pacing.delta_percent, 15.0 - 100.0);

        let current = build_summary(&records(), &goals(), &roster(), &request(&[], Some(2025)));
        assert!((current.pacing.expected_percent - 8.767).abs() < 0.001);
    }
}
