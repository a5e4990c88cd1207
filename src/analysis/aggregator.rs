//! Record aggregation and rollups.
//!
//! Every function here is a pure function of the record snapshot it is
//! given. Grouped results come back as ordered vectors, and each function
//! documents its ordering.

use crate::models::{
    ActivityRecord, ActivityType, ActivityTypeTotal, CumulativePoint, MonthTotal, PersonTotal,
    WeekTotal,
};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Sum distances in ascending order so the result does not depend on the
/// order records were registered in.
pub(crate) fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    values.into_iter().sum()
}

/// Total distance over all records.
pub fn total_distance(records: &[ActivityRecord]) -> f64 {
    ordered_sum(records.iter().map(|r| r.distance_km()).collect())
}

/// Total duration over all records, in minutes.
pub fn total_minutes(records: &[ActivityRecord]) -> u64 {
    records.iter().map(|r| r.duration_minutes() as u64).sum()
}

/// Keep only records for the selected people. An empty selection keeps all.
pub fn filter_people(records: &[ActivityRecord], people: &[String]) -> Vec<ActivityRecord> {
    if people.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| people.iter().any(|p| p == r.person()))
        .cloned()
        .collect()
}

/// Keep only records dated in the given calendar year.
pub fn filter_year(records: &[ActivityRecord], year: i32) -> Vec<ActivityRecord> {
    records
        .iter()
        .filter(|r| r.date().year() == year)
        .cloned()
        .collect()
}

/// Distance and count per person, highest distance first.
///
/// Ties keep the order in which each person first appears in `records`.
pub fn per_person_rollup(records: &[ActivityRecord]) -> Vec<PersonTotal> {
    let mut order: Vec<&str> = Vec::new();
    let mut distances: HashMap<&str, Vec<f64>> = HashMap::new();

    for record in records {
        let entry = distances.entry(record.person()).or_insert_with(|| {
            order.push(record.person());
            Vec::new()
        });
        entry.push(record.distance_km());
    }

    let mut totals: Vec<PersonTotal> = order
        .into_iter()
        .map(|person| {
            let values = distances.remove(person).unwrap_or_default();
            PersonTotal {
                person: person.to_string(),
                activity_count: values.len(),
                total_km: ordered_sum(values),
            }
        })
        .collect();

    // Stable sort keeps first-appearance order among equal totals
    totals.sort_by(|a, b| b.total_km.total_cmp(&a.total_km));
    totals
}

/// Distance per calendar month, oldest month first.
pub fn monthly_rollup(records: &[ActivityRecord]) -> Vec<MonthTotal> {
    let mut grouped: BTreeMap<(i32, u32), (String, Vec<f64>)> = BTreeMap::new();

    for record in records {
        let date = record.date();
        grouped
            .entry((date.year(), date.month()))
            .or_insert_with(|| (date.format("%B %Y").to_string(), Vec::new()))
            .1
            .push(record.distance_km());
    }

    grouped
        .into_iter()
        .map(|((year, month), (label, values))| MonthTotal {
            year,
            month,
            label,
            total_km: ordered_sum(values),
        })
        .collect()
}

/// Distance per ISO week and person.
///
/// Weeks are ordered chronologically; people within a week keep the order
/// in which they first appear in that week.
pub fn weekly_rollup(records: &[ActivityRecord]) -> Vec<WeekTotal> {
    let mut grouped: BTreeMap<(i32, u32), Vec<(String, Vec<f64>)>> = BTreeMap::new();

    for record in records {
        let week = record.date().iso_week();
        let people = grouped.entry((week.year(), week.week())).or_default();

        match people.iter_mut().find(|(person, _)| person == record.person()) {
            Some((_, values)) => values.push(record.distance_km()),
            None => people.push((record.person().to_string(), vec![record.distance_km()])),
        }
    }

    grouped
        .into_iter()
        .flat_map(|((iso_year, iso_week), people)| {
            people.into_iter().map(move |(person, values)| WeekTotal {
                iso_year,
                iso_week,
                person,
                total_km: ordered_sum(values),
            })
        })
        .collect()
}

/// Running distance total, one point per distinct date in ascending order.
///
/// Records sharing a date are summed before being added to the total.
pub fn cumulative_by_date(records: &[ActivityRecord]) -> Vec<CumulativePoint> {
    let mut per_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for record in records {
        per_date
            .entry(record.date())
            .or_default()
            .push(record.distance_km());
    }

    let mut running = 0.0;
    per_date
        .into_iter()
        .map(|(date, values)| {
            running += ordered_sum(values);
            CumulativePoint {
                date,
                cumulative_km: running,
            }
        })
        .collect()
}

/// The `n` most recent records, newest first.
///
/// Records on the same date keep their registration order.
pub fn most_recent(records: &[ActivityRecord], n: usize) -> Vec<ActivityRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted.truncate(n);
    sorted
}

/// Totals per activity type, in `ActivityType` order. Types without any
/// records are omitted.
pub fn per_activity_rollup(records: &[ActivityRecord]) -> Vec<ActivityTypeTotal> {
    ActivityType::ALL
        .iter()
        .filter_map(|kind| {
            let matching: Vec<&ActivityRecord> = records
                .iter()
                .filter(|r| r.activity_type() == *kind)
                .collect();
            if matching.is_empty() {
                return None;
            }

            let total_km = ordered_sum(matching.iter().map(|r| r.distance_km()).collect());
            let total_minutes: u64 = matching.iter().map(|r| r.duration_minutes() as u64).sum();
            let avg_pace_min_per_km = if total_km > 0.0 {
                total_minutes as f64 / total_km
            } else {
                0.0
            };

            Some(ActivityTypeTotal {
                activity_type: *kind,
                total_km,
                activity_count: matching.len(),
                total_minutes,
                avg_pace_min_per_km,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_record(day: NaiveDate, person: &str, km: f64, minutes: u32) -> ActivityRecord {
        ActivityRecord::new(day, person, ActivityType::Run, km, minutes).unwrap()
    }

    fn sample_records() -> Vec<ActivityRecord> {
        vec![
            create_test_record(date(2025, 1, 10), "Kaia", 5.0, 30),
            create_test_record(date(2025, 1, 12), "Eirik", 12.0, 70),
            create_test_record(date(2025, 2, 3), "Kaia", 8.0, 44),
            create_test_record(date(2025, 2, 3), "Silje", 3.5, 40),
            create_test_record(date(2024, 12, 30), "Eirik", 6.0, 33),
        ]
    }

    #[test]
    fn test_total_distance() {
        assert_eq!(total_distance(&sample_records()), 34.5);
        assert_eq!(total_distance(&[]), 0.0);
    }

    #[test]
    fn test_total_distance_ignores_order() {
        let records: Vec<ActivityRecord> = [0.1, 0.2, 0.3, 1e-9, 7.7, 3.3]
            .iter()
            .map(|km| create_test_record(date(2025, 1, 1), "Kaia", *km, 10))
            .collect();
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let total = total_distance(&records);
        assert_eq!(total, total_distance(&reversed));
        assert_eq!(total, total_distance(&rotated));
    }

    #[test]
    fn test_filters() {
        let records = sample_records();

        let selected = filter_people(&records, &["Kaia".to_string()]);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.person() == "Kaia"));
        assert_eq!(filter_people(&records, &[]).len(), records.len());

        let this_year = filter_year(&records, 2025);
        assert_eq!(this_year.len(), 4);
    }

    #[test]
    fn test_per_person_rollup_same_day() {
        let records = vec![
            create_test_record(date(2025, 1, 10), "Kaia", 5.0, 30),
            create_test_record(date(2025, 1, 10), "Kaia", 3.0, 20),
        ];

        let rollup = per_person_rollup(&records);
        assert_eq!(
            rollup,
            vec![PersonTotal {
                person: "Kaia".to_string(),
                total_km: 8.0,
                activity_count: 2,
            }]
        );
    }

    #[test]
    fn test_per_person_rollup_sorted_with_stable_ties() {
        let records = vec![
            create_test_record(date(2025, 1, 1), "Silje", 4.0, 20),
            create_test_record(date(2025, 1, 2), "Anders", 10.0, 50),
            create_test_record(date(2025, 1, 3), "Helle", 4.0, 25),
        ];

        let rollup = per_person_rollup(&records);
        let names: Vec<&str> = rollup.iter().map(|p| p.person.as_str()).collect();
        assert_eq!(names, vec!["Anders", "Silje", "Helle"]);
    }

    #[test]
    fn test_monthly_rollup_is_chronological() {
        let monthly = monthly_rollup(&sample_records());

        let labels: Vec<&str> = monthly.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["December 2024", "January 2025", "February 2025"]);
        assert_eq!(monthly[1].total_km, 17.0);
        assert_eq!(monthly[2].total_km, 11.5);
    }

    #[test]
    fn test_weekly_rollup() {
        let weekly = weekly_rollup(&sample_records());

        // 2024-12-30 falls in ISO week 1 of 2025.
        assert_eq!(weekly[0].iso_year, 2025);
        assert_eq!(weekly[0].iso_week, 1);
        assert_eq!(weekly[0].person, "Eirik");

        let week6: Vec<&WeekTotal> = weekly.iter().filter(|w| w.iso_week == 6).collect();
        assert_eq!(week6.len(), 2);
        assert_eq!(week6[0].person, "Kaia");
        assert_eq!(week6[1].person, "Silje");
    }

    #[test]
    fn test_cumulative_sums_same_date_first() {
        let records = vec![
            create_test_record(date(2025, 1, 10), "Kaia", 5.0, 30),
            create_test_record(date(2025, 1, 10), "Kaia", 3.0, 20),
        ];
        assert_eq!(
            cumulative_by_date(&records),
            vec![CumulativePoint {
                date: date(2025, 1, 10),
                cumulative_km: 8.0,
            }]
        );

        let points = cumulative_by_date(&sample_records());
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].date, date(2024, 12, 30));
        assert_eq!(points[0].cumulative_km, 6.0);
        assert_eq!(points[3].cumulative_km, 34.5);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_most_recent_is_stable() {
        let records = sample_records();
        let recent = most_recent(&records, 3);

        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].person(), "Kaia");
        assert_eq!(recent[1].person(), "Silje");
        assert_eq!(recent[2].date(), date(2025, 1, 12));

        assert_eq!(most_recent(&records, 50).len(), records.len());
        assert!(most_recent(&records, 0).is_empty());
    }

    #[test]
    fn test_per_activity_rollup() {
        let records = vec![
            create_test_record(date(2025, 1, 1), "Kaia", 10.0, 50),
            ActivityRecord::new(date(2025, 1, 2), "Kaia", ActivityType::Walk, 4.0, 48).unwrap(),
            ActivityRecord::new(date(2025, 1, 3), "Kaia", ActivityType::Walk, 0.0, 12).unwrap(),
        ];

        let split = per_activity_rollup(&records);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].activity_type, ActivityType::Run);
        assert_eq!(split[0].avg_pace_min_per_km, 5.0);
        assert_eq!(split[1].activity_count, 2);
        assert_eq!(split[1].total_minutes, 60);
        assert_eq!(split[1].avg_pace_min_per_km, 15.0);

        assert!(per_activity_rollup(&[]).is_empty());
    }
}
