use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DailyAggregate, StudySession};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordDay {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_hours: f64,
    pub total_days_equivalent: f64,
    pub record_day: Option<RecordDay>,
    pub distinct_study_days: u32,
    pub no_study_days: u32,
    pub started_on: Option<NaiveDate>,
}

impl SummaryMetrics {
    pub fn compute(sessions: &[StudySession], daily: &[DailyAggregate]) -> Self {
        let total_hours: f64 = sessions.iter().map(|s| s.hours).sum();

        // earliest date wins on ties
        let record_day = daily.iter().fold(None::<RecordDay>, |best, d| match best {
            Some(b) if b.hours >= d.total_hours => Some(b),
            _ => Some(RecordDay {
                date: d.date,
                hours: d.total_hours,
            }),
        });

        Self {
            total_hours,
            total_days_equivalent: total_hours / 24.0,
            record_day,
            distinct_study_days: daily.iter().filter(|d| d.studied()).count() as u32,
            no_study_days: daily.iter().filter(|d| !d.studied()).count() as u32,
            started_on: daily.first().map(|d| d.date),
        }
    }
}
