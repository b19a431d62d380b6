//! Daily aggregation of normalized sessions.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyAggregate, StudySession};

/// Sums hours per calendar date.
///
/// Output is ascending by date with one entry per date that has at least one
/// session. Dates with no rows are never synthesized. Duplicate rows count twice.
pub fn daily_totals(sessions: &[StudySession]) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for s in sessions {
        *by_date.entry(s.full_date).or_insert(0.0) += s.hours;
    }
    by_date
        .into_iter()
        .map(|(date, total_hours)| DailyAggregate { date, total_hours })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;

    fn session(date: &str, study: &str, hours: f64) -> StudySession {
        StudySession {
            full_date: date.parse().unwrap(),
            study: study.to_string(),
            hours,
            time_of_day: Some(TimeOfDay::Morning),
        }
    }

    #[test]
    fn sums_same_date_and_sorts() {
        let rows = vec![
            session("2024-05-14", "Math", 1.0),
            session("2024-05-12", "Math", 2.0),
            session("2024-05-12", "Physics", 0.5),
        ];
        let daily = daily_totals(&rows);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, "2024-05-12".parse::<NaiveDate>().unwrap());
        assert_eq!(daily[0].total_hours, 2.5);
        assert_eq!(daily[1].total_hours, 1.0);
    }

    #[test]
    fn duplicate_rows_double_count() {
        let rows = vec![session("2024-05-12", "Math", 1.0), session("2024-05-12", "Math", 1.0)];
        assert_eq!(daily_totals(&rows)[0].total_hours, 2.0);
    }

    #[test]
    fn zero_hour_rows_keep_their_date() {
        let daily = daily_totals(&[session("2024-05-12", "Rest", 0.0)]);
        assert_eq!(daily.len(), 1);
        assert!(!daily[0].studied());
        assert_eq!(daily[0].total_hours, 0.0);
    }
}
