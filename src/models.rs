//! Data models for the activity tracker.
//!
//! This module contains the record type persisted to disk, goal
//! configuration, and the result rows produced by the aggregator.

use crate::error::{Result, TallyError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of logged activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    /// Running session.
    #[serde(alias = "run", alias = "Løping")]
    Run,
    /// Walking session.
    #[serde(alias = "walk", alias = "Gåing")]
    Walk,
}

impl ActivityType {
    /// All known activity types, in display order.
    pub const ALL: [ActivityType; 2] = [ActivityType::Run, ActivityType::Walk];

    /// Returns an emoji representation of the activity.
    pub fn emoji(&self) -> &'static str {
        match self {
            ActivityType::Run => "🏃",
            ActivityType::Walk => "🚶",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityType::Run => write!(f, "Run"),
            ActivityType::Walk => write!(f, "Walk"),
        }
    }
}

/// Minutes per kilometer, or `0.0` when no distance was covered.
pub fn pace_min_per_km(duration_minutes: u32, distance_km: f64) -> f64 {
    if distance_km > 0.0 {
        duration_minutes as f64 / distance_km
    } else {
        0.0
    }
}

/// Format a minute count as `"1h 05m"`.
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// One logged session.
///
/// Records are immutable once built. Pace is always derived from distance
/// and duration and is only written to disk for readers of the raw file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord", into = "StoredRecord")]
pub struct ActivityRecord {
    date: NaiveDate,
    person: String,
    activity_type: ActivityType,
    distance_km: f64,
    duration_minutes: u32,
}

impl ActivityRecord {
    /// Build a validated record.
    pub fn new(
        date: NaiveDate,
        person: impl Into<String>,
        activity_type: ActivityType,
        distance_km: f64,
        duration_minutes: u32,
    ) -> Result<Self> {
        let person = person.into().trim().to_string();
        if person.is_empty() {
            return Err(TallyError::invalid("person must not be empty"));
        }
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(TallyError::invalid(format!(
                "distance must be a non-negative number, got {}",
                distance_km
            )));
        }

        Ok(Self {
            date,
            person,
            activity_type,
            distance_km,
            duration_minutes,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn person(&self) -> &str {
        &self.person
    }

    pub fn activity_type(&self) -> ActivityType {
        self.activity_type
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn pace_min_per_km(&self) -> f64 {
        pace_min_per_km(self.duration_minutes, self.distance_km)
    }
}

/// On-disk shape of a record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    date: NaiveDate,
    person: String,
    activity_type: ActivityType,
    distance_km: f64,
    duration_minutes: u32,
    // Ignored on load; recomputed from the fields above.
    #[serde(default)]
    pace_min_per_km: f64,
}

impl TryFrom<StoredRecord> for ActivityRecord {
    type Error = TallyError;

    fn try_from(stored: StoredRecord) -> Result<Self> {
        ActivityRecord::new(
            stored.date,
            stored.person,
            stored.activity_type,
            stored.distance_km,
            stored.duration_minutes,
        )
    }
}

impl From<ActivityRecord> for StoredRecord {
    fn from(record: ActivityRecord) -> Self {
        let pace_min_per_km = record.pace_min_per_km();
        Self {
            date: record.date,
            person: record.person,
            activity_type: record.activity_type,
            distance_km: record.distance_km,
            duration_minutes: record.duration_minutes,
            pace_min_per_km,
        }
    }
}

/// A registration request as entered by a user.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub person: String,
    pub activity_type: ActivityType,
    pub date: NaiveDate,
    pub distance_km: f64,
    pub hours: i64,
    pub minutes: i64,
}

impl NewActivity {
    /// Validate the request and build the record it describes.
    ///
    /// An empty roster accepts any non-blank name.
    pub fn into_record(self, roster: &[String]) -> Result<ActivityRecord> {
        let person = self.person.trim();
        if person.is_empty() {
            return Err(TallyError::invalid("a person must be selected"));
        }
        if !roster.is_empty() && !roster.iter().any(|name| name == person) {
            return Err(TallyError::invalid(format!(
                "'{}' is not on the roster",
                person
            )));
        }
        if self.hours < 0 {
            return Err(TallyError::invalid("hours must be non-negative"));
        }
        if !(0..=59).contains(&self.minutes) {
            return Err(TallyError::invalid("minutes must be between 0 and 59"));
        }

        let duration_minutes = self
            .hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(self.minutes))
            .and_then(|m| u32::try_from(m).ok())
            .ok_or_else(|| TallyError::invalid("duration is too large"))?;

        ActivityRecord::new(
            self.date,
            person,
            self.activity_type,
            self.distance_km,
            duration_minutes,
        )
    }
}

/// Distance targets for one calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    /// Shared target for the whole group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collective_km: Option<f64>,

    /// Personal targets. A missing name means that person has no goal.
    #[serde(default)]
    pub individual_km: BTreeMap<String, f64>,
}

impl Goals {
    /// The person's goal, if one is defined.
    pub fn for_person(&self, person: &str) -> Option<f64> {
        self.individual_km.get(person).copied()
    }

    /// Check that every defined goal is strictly positive.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(goal) = self.collective_km {
            if !(goal.is_finite() && goal > 0.0) {
                return Err(format!("Collective goal must be positive, got {}", goal));
            }
        }
        for (person, goal) in &self.individual_km {
            if !(goal.is_finite() && *goal > 0.0) {
                return Err(format!(
                    "Goal for '{}' must be positive, got {}",
                    person, goal
                ));
            }
        }
        Ok(())
    }
}

/// Encouragement bucket for a progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotivationalTier {
    /// Below 25%.
    Low,
    /// 25% up to 50%.
    Building,
    /// 50% up to 75%.
    Strong,
    /// 75% and above.
    Achieved,
}

impl MotivationalTier {
    /// Classify a progress percentage. Lower bounds are inclusive.
    pub fn from_progress(percent: f64) -> Self {
        if percent >= 75.0 {
            MotivationalTier::Achieved
        } else if percent >= 50.0 {
            MotivationalTier::Strong
        } else if percent >= 25.0 {
            MotivationalTier::Building
        } else {
            MotivationalTier::Low
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            MotivationalTier::Low => "Every kilometer counts. Keep going!",
            MotivationalTier::Building => "Good start, momentum is building.",
            MotivationalTier::Strong => "Over halfway. Strong work!",
            MotivationalTier::Achieved => "The finish line is in sight!",
        }
    }
}

impl fmt::Display for MotivationalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotivationalTier::Low => write!(f, "Low"),
            MotivationalTier::Building => write!(f, "Building"),
            MotivationalTier::Strong => write!(f, "Strong"),
            MotivationalTier::Achieved => write!(f, "Achieved"),
        }
    }
}

/// Distance and activity count for one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonTotal {
    pub person: String,
    pub total_km: f64,
    pub activity_count: usize,
}

/// Distance for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    /// Display label such as "January 2025".
    pub label: String,
    pub total_km: f64,
}

/// Distance for one person in one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekTotal {
    pub iso_year: i32,
    pub iso_week: u32,
    pub person: String,
    pub total_km: f64,
}

/// Running distance total at the end of a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub cumulative_km: f64,
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub person: String,
    pub total_km: f64,
    pub activity_count: usize,
    /// `None` when the person has no personal goal.
    pub progress_percent: Option<f64>,
}

/// Totals for one activity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTypeTotal {
    pub activity_type: ActivityType,
    pub total_km: f64,
    pub activity_count: usize,
    pub total_minutes: u64,
    /// Overall pace across all sessions of this type.
    pub avg_pace_min_per_km: f64,
}

/// Actual progress compared with where an even pace would be today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pacing {
    pub actual_percent: f64,
    pub expected_percent: f64,
    /// Positive when ahead of schedule.
    pub delta_percent: f64,
}

/// Which goal the headline percentage is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalMode {
    /// Whole roster against the shared goal.
    Collective,
    /// A subset of people against the sum of their personal goals.
    Selection,
}

/// Every statistic shown for one view of the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub generated_on: NaiveDate,
    /// People included; empty means everyone.
    pub selection: Vec<String>,
    pub year: Option<i32>,
    pub activity_count: usize,
    pub total_km: f64,
    pub total_minutes: u64,
    pub goal_mode: GoalMode,
    pub goal_km: Option<f64>,
    pub pacing: Pacing,
    pub tier: MotivationalTier,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub per_activity: Vec<ActivityTypeTotal>,
    pub monthly: Vec<MonthTotal>,
    pub weekly: Vec<WeekTotal>,
    pub cumulative: Vec<CumulativePoint>,
    pub recent: Vec<ActivityRecord>,
}
