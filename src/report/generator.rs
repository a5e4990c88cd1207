//! Report generation.
//!
//! This module renders a `StatsSummary` as a compact terminal summary, a
//! Markdown report, or JSON.

use crate::models::{
    format_duration, ActivityRecord, ActivityTypeTotal, CumulativePoint, GoalMode,
    LeaderboardEntry, MonthTotal, StatsSummary, WeekTotal,
};
use anyhow::Result;

const BAR_WIDTH: usize = 30;

/// Render a percentage as a fixed-width bar, e.g. `[#####-----]`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let ratio = if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Bar proportional to `value / max`, used for per-month and per-person charts.
fn scaled_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

fn goal_cell(progress: Option<f64>) -> String {
    match progress {
        Some(p) => format!("{:.1}%", p),
        None => "no goal".to_string(),
    }
}

fn scope_label(summary: &StatsSummary) -> String {
    let people = if summary.selection.is_empty() {
        "everyone".to_string()
    } else {
        summary.selection.join(", ")
    };
    match summary.year {
        Some(year) => format!("{} in {}", people, year),
        None => people,
    }
}

fn goal_label(summary: &StatsSummary) -> String {
    match (summary.goal_mode, summary.goal_km) {
        (GoalMode::Collective, Some(goal)) => format!("{:.0} km (collective)", goal),
        (GoalMode::Selection, Some(goal)) => format!("{:.0} km (sum of personal goals)", goal),
        _ => "none".to_string(),
    }
}

/// Generate the compact terminal summary.
pub fn generate_text_summary(summary: &StatsSummary) -> String {
    let mut output = String::new();
    let pacing = &summary.pacing;

    output.push_str(&format!("📊 Statistics for {}\n\n", scope_label(summary)));
    output.push_str(&format!(
        "   Total distance: {:.1} km over {} activities ({})\n",
        summary.total_km,
        summary.activity_count,
        format_duration_long(summary.total_minutes)
    ));
    output.push_str(&format!("   Goal: {}\n", goal_label(summary)));
    output.push_str(&format!(
        "   Progress: {} {:.1}%\n",
        progress_bar(pacing.actual_percent, BAR_WIDTH),
        pacing.actual_percent
    ));
    output.push_str(&format!(
        "   Expected: {} {:.1}% ({:+.1} pts)\n",
        progress_bar(pacing.expected_percent, BAR_WIDTH),
        pacing.expected_percent,
        pacing.delta_percent
    ));
    output.push_str(&format!(
        "   {} {}\n",
        summary.tier,
        summary.tier.message()
    ));

    if !summary.leaderboard.is_empty() {
        output.push_str("\n🏆 Leaderboard\n");
        for entry in &summary.leaderboard {
            output.push_str(&format!(
                "   {:>2}. {:<16} {:>8.1} km  {:>3} activities  {}\n",
                entry.rank,
                entry.person,
                entry.total_km,
                entry.activity_count,
                goal_cell(entry.progress_percent)
            ));
        }
    }

    output
}

/// Hours and minutes for totals that can exceed a day.
fn format_duration_long(minutes: u64) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(summary: &StatsSummary) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Activity Report\n\n");

    output.push_str(&generate_overview_section(summary));
    output.push_str(&generate_leaderboard_section(&summary.leaderboard));
    output.push_str(&generate_personal_goals_section(&summary.leaderboard));
    output.push_str(&generate_activity_section(&summary.per_activity));
    output.push_str(&generate_monthly_section(&summary.monthly));
    output.push_str(&generate_weekly_section(&summary.weekly));
    output.push_str(&generate_cumulative_section(&summary.cumulative));

    output.push_str("## Recent Activities\n\n");
    output.push_str(&generate_recent_table(&summary.recent));
    output.push('\n');

    // Footer
    output.push_str("---\n\n");
    output.push_str(&format!(
        "*Generated by runtally on {}*\n",
        summary.generated_on.format("%d.%m.%Y")
    ));

    output
}

/// Generate the overview section with the progress gauge.
fn generate_overview_section(summary: &StatsSummary) -> String {
    let mut section = String::new();
    let pacing = &summary.pacing;

    section.push_str("## Overview\n\n");
    section.push_str(&format!("- **Scope:** {}\n", scope_label(summary)));
    section.push_str(&format!(
        "- **Total Distance:** {:.1} km\n",
        summary.total_km
    ));
    section.push_str(&format!("- **Activities:** {}\n", summary.activity_count));
    section.push_str(&format!(
        "- **Time Spent:** {}\n",
        format_duration_long(summary.total_minutes)
    ));
    section.push_str(&format!("- **Goal:** {}\n", goal_label(summary)));
    section.push_str(&format!(
        "- **Goal Progress:** {:.1}%\n",
        pacing.actual_percent
    ));
    section.push_str(&format!(
        "- **Expected by {}:** {:.1}% ({:+.1} pts)\n\n",
        summary.generated_on.format("%d.%m.%Y"),
        pacing.expected_percent,
        pacing.delta_percent
    ));

    section.push_str("```\n");
    section.push_str(&format!(
        "actual   {} {:>5.1}%\n",
        progress_bar(pacing.actual_percent, BAR_WIDTH),
        pacing.actual_percent
    ));
    section.push_str(&format!(
        "expected {} {:>5.1}%\n",
        progress_bar(pacing.expected_percent, BAR_WIDTH),
        pacing.expected_percent
    ));
    section.push_str("```\n\n");

    section.push_str(&format!(
        "> **{}:** {}\n\n",
        summary.tier,
        summary.tier.message()
    ));

    section
}

/// Generate the leaderboard section.
fn generate_leaderboard_section(entries: &[LeaderboardEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Leaderboard\n\n");
    if entries.is_empty() {
        section.push_str("No activities registered yet.\n\n");
        return section;
    }

    let max = entries.first().map(|e| e.total_km).unwrap_or(0.0);
    section.push_str("| Rank | Person | Distance (km) | Activities | Personal Goal | |\n");
    section.push_str("|:---:|:---|---:|:---:|:---:|:---|\n");
    for entry in entries {
        section.push_str(&format!(
            "| {} | {} | {:.1} | {} | {} | {} |\n",
            entry.rank,
            entry.person,
            entry.total_km,
            entry.activity_count,
            goal_cell(entry.progress_percent),
            scaled_bar(entry.total_km, max, 20)
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-person goal gauges. People without a goal are skipped.
fn generate_personal_goals_section(entries: &[LeaderboardEntry]) -> String {
    let with_goal: Vec<(&LeaderboardEntry, f64)> = entries
        .iter()
        .filter_map(|e| e.progress_percent.map(|p| (e, p)))
        .collect();
    if with_goal.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Personal Goals\n\n");
    section.push_str("```\n");
    for (entry, percent) in with_goal {
        section.push_str(&format!(
            "{:<16} {} {:>5.1}%\n",
            entry.person,
            progress_bar(percent, BAR_WIDTH),
            percent
        ));
    }
    section.push_str("```\n\n");

    section
}

/// Generate the per-activity-type section.
fn generate_activity_section(totals: &[ActivityTypeTotal]) -> String {
    if totals.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Activity Types\n\n");
    section.push_str("| Type | Distance (km) | Activities | Avg Pace (min/km) |\n");
    section.push_str("|:---|---:|:---:|:---:|\n");
    for total in totals {
        section.push_str(&format!(
            "| {} {} | {:.1} | {} | {:.1} |\n",
            total.activity_type.emoji(),
            total.activity_type,
            total.total_km,
            total.activity_count,
            total.avg_pace_min_per_km
        ));
    }
    section.push('\n');

    section
}

/// Generate the monthly distance section.
fn generate_monthly_section(months: &[MonthTotal]) -> String {
    if months.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    let max = months.iter().map(|m| m.total_km).fold(0.0, f64::max);

    section.push_str("## Distance per Month\n\n");
    section.push_str("| Month | Distance (km) | |\n");
    section.push_str("|:---|---:|:---|\n");
    for month in months {
        section.push_str(&format!(
            "| {} | {:.1} | {} |\n",
            month.label,
            month.total_km,
            scaled_bar(month.total_km, max, 20)
        ));
    }
    section.push('\n');

    section
}

/// Generate the weekly per-person section.
fn generate_weekly_section(weeks: &[WeekTotal]) -> String {
    if weeks.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Distance per Week\n\n");
    section.push_str("| Week | Person | Distance (km) |\n");
    section.push_str("|:---|:---|---:|\n");
    for week in weeks {
        section.push_str(&format!(
            "| {}-W{:02} | {} | {:.1} |\n",
            week.iso_year, week.iso_week, week.person, week.total_km
        ));
    }
    section.push('\n');

    section
}

/// Generate the cumulative distance section.
fn generate_cumulative_section(points: &[CumulativePoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Cumulative Distance\n\n");
    section.push_str("| Date | Cumulative (km) |\n");
    section.push_str("|:---|---:|\n");
    for point in points {
        section.push_str(&format!(
            "| {} | {:.1} |\n",
            point.date.format("%d.%m.%Y"),
            point.cumulative_km
        ));
    }
    section.push('\n');

    section
}

/// Render records as a Markdown table, in the order given.
pub fn generate_recent_table(records: &[ActivityRecord]) -> String {
    if records.is_empty() {
        return "No activities registered yet.\n".to_string();
    }

    let mut table = String::new();
    table.push_str("| Date | Person | Activity | Distance (km) | Time | Pace (min/km) |\n");
    table.push_str("|:---|:---|:---|---:|---:|---:|\n");
    for record in records {
        table.push_str(&format!(
            "| {} | {} | {} | {:.1} | {} | {:.1} |\n",
            record.date().format("%d.%m.%Y"),
            record.person(),
            record.activity_type(),
            record.distance_km(),
            format_duration(record.duration_minutes()),
            record.pace_min_per_km()
        ));
    }

    table
}

/// Generate a JSON report.
pub fn generate_json_report(summary: &StatsSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}
