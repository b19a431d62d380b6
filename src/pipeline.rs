//! One fetch-compute pass: Fetch → Normalize → Daily Aggregation →
//! {Streaks, Derived Views}. Everything after the fetch is a pure function of
//! the document text, the view parameters and the reference date.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::daily_totals;
use crate::data::{content_sha256, parse_sessions, IngestReport};
use crate::feed::SessionSource;
use crate::logging::{debug, error, info, v_int, v_num, v_str, warn, Domain, ProfileScope};
use crate::metrics::SummaryMetrics;
use crate::models::StudySession;
use crate::streak::{self, Streaks};
use crate::views::{
    daily_series, in_period, subject_totals, subjects_for_tod, tod_totals, today_breakdown,
    top_subjects, weekday_averages, weekly_means, DailyPoint, SubjectTotal, TodTotal,
    TodayBreakdown, ViewParams, WeekdayAverage, WeeklyPoint,
};

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub params: ViewParams,
    pub source_sha256: String,
    pub ingest: IngestReport,
    pub summary: SummaryMetrics,
    pub streaks: Streaks,
    pub today_breakdown: Option<TodayBreakdown>,
    pub daily: Vec<DailyPoint>,
    pub weekly: Vec<WeeklyPoint>,
    pub subjects: Vec<SubjectTotal>,
    pub top_recent: Vec<SubjectTotal>,
    pub weekdays: Vec<WeekdayAverage>,
    pub tod_totals: Vec<TodTotal>,
    pub tod_subjects: Vec<SubjectTotal>,
}

/// Shown whenever there is nothing to chart.
pub const NO_DATA: &str = "No data available.";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ready(Box<Dashboard>),
    /// Nothing to show. `error` is the user-facing failure line, if the pass failed.
    Empty { error: Option<String> },
}

impl Outcome {
    pub fn failed(error: String) -> Self {
        Outcome::Empty { error: Some(error) }
    }

    pub fn no_data() -> Self {
        Outcome::Empty { error: None }
    }
}

pub fn build_dashboard(
    sessions: &[StudySession],
    ingest: IngestReport,
    source_sha256: String,
    params: &ViewParams,
    today: NaiveDate,
) -> Dashboard {
    let _scope = ProfileScope::with_context(
        "build_dashboard",
        &[("sessions", v_int(sessions.len() as u64))],
    );

    let daily = daily_totals(sessions);
    debug(Domain::Aggregate, "daily_totals", &[("days", v_int(daily.len() as u64))]);

    let streaks = streak::compute(&daily, today);
    info(
        Domain::Streak,
        "computed",
        &[
            ("longest", v_int(u64::from(streaks.longest))),
            ("current", v_num(streaks.current as f64)),
            (
                "last_zero_day",
                streaks
                    .last_zero_day
                    .map(|d| v_str(&d.to_string()))
                    .unwrap_or(serde_json::Value::Null),
            ),
        ],
    );

    let window = in_period(sessions, params.period, today);
    Dashboard {
        today,
        params: params.clone(),
        source_sha256,
        ingest,
        summary: SummaryMetrics::compute(sessions, &daily),
        streaks,
        today_breakdown: today_breakdown(sessions, today),
        daily: daily_series(&daily),
        weekly: weekly_means(&daily),
        subjects: subject_totals(sessions),
        top_recent: top_subjects(sessions, today, params.recent_days, params.top_n),
        weekdays: weekday_averages(window.iter().copied()),
        tod_totals: tod_totals(window.iter().copied()),
        tod_subjects: subjects_for_tod(window.iter().copied(), params.tod),
    }
}

/// Normalizes a CSV document and builds the dashboard. Fails only on
/// document-level problems (missing columns, CSV syntax).
pub fn from_csv(text: &str, params: &ViewParams, today: NaiveDate) -> Result<Dashboard, String> {
    let ingested = {
        let _scope = ProfileScope::new("parse_sessions");
        parse_sessions(text)?
    };
    let r = &ingested.report;
    info(
        Domain::Ingest,
        "normalized",
        &[
            ("rows", v_int(r.rows)),
            ("kept", v_int(r.kept)),
            ("bad_dates", v_int(r.bad_dates)),
            ("bad_hours", v_int(r.bad_hours)),
            ("blank_rows", v_int(r.blank_rows)),
        ],
    );
    let dropped = r.bad_dates + r.bad_hours;
    if dropped > 0 {
        warn(
            Domain::Ingest,
            "rows_dropped",
            &[
                ("dropped", v_int(dropped)),
                ("msg", v_str("rows with unreadable date or hours were skipped")),
            ],
        );
    }
    for warning in &r.warnings {
        debug(Domain::Ingest, "row_dropped", &[("reason", v_str(warning))]);
    }
    Ok(build_dashboard(
        &ingested.sessions,
        ingested.report,
        content_sha256(text),
        params,
        today,
    ))
}

/// Fetches from `source` and computes the dashboard. Every failure becomes an
/// empty state; nothing here is fatal to the process.
pub async fn run(
    source: &(dyn SessionSource + Send + Sync),
    params: &ViewParams,
    today: NaiveDate,
) -> Outcome {
    let text = match source.fetch_csv().await {
        Ok(text) => text,
        Err(err) => {
            error(
                Domain::Fetch,
                "fetch_failed",
                &[
                    ("source", v_str(&source.describe())),
                    ("error", v_str(&format!("{:#}", err))),
                ],
            );
            return Outcome::failed(format!("Failed to fetch data: {:#}", err));
        }
    };
    match from_csv(&text, params, today) {
        Ok(dashboard) if dashboard.ingest.kept == 0 => Outcome::no_data(),
        Ok(dashboard) => Outcome::Ready(Box::new(dashboard)),
        Err(err) => {
            error(Domain::Ingest, "document_rejected", &[("error", v_str(&err))]);
            Outcome::failed(format!("Failed to read data: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;
    use crate::views::Period;

    const CSV: &str = "Full_Date,Study,Hours,Tod\n\
        2024-10-14,Math,2,Morning\n\
        2024-10-14,Physics,1,Night\n\
        2024-10-15,Math,0,\n\
        2024-10-16,Art,1.5,Afternoon\n\
        2024-10-17,Math,oops,Night\n";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 16).unwrap()
    }

    #[test]
    fn builds_every_view() {
        let d = from_csv(CSV, &ViewParams::default(), today()).unwrap();
        assert_eq!(d.ingest.kept, 4);
        assert_eq!(d.daily.len(), 3);
        assert_eq!(d.streaks.longest, 1);
        assert_eq!(d.streaks.current, 1);
        assert_eq!(d.summary.total_hours, 4.5);
        assert_eq!(d.today_breakdown.as_ref().unwrap().total_hours, 1.5);
        assert_eq!(d.subjects[0].study, "Math");
        assert_eq!(d.weekly.len(), 1);
        assert_eq!(d.tod_totals.len(), 3);
        assert_eq!(d.tod_subjects[0].study, "Math");
        assert_eq!(d.source_sha256.len(), 64);
    }

    #[test]
    fn period_limits_insight_views_only() {
        let params = ViewParams {
            period: Period::LastDays(1),
            tod: TimeOfDay::Night,
            ..ViewParams::default()
        };
        let d = from_csv(CSV, &params, today()).unwrap();
        assert!(d.tod_subjects.is_empty());
        assert_eq!(d.weekdays.len(), 1);
        assert_eq!(d.subjects.len(), 3);
    }

    #[test]
    fn bad_hours_row_does_not_touch_its_date() {
        let csv = "Full_Date,Study,Hours,Tod\n\
            2024-05-12,Math,1,Morning\n\
            2024-05-13,Math,abc,Morning\n\
            2024-05-13,Art,1.5,Night\n";
        let d = from_csv(csv, &ViewParams::default(), NaiveDate::from_ymd_opt(2024, 5, 13).unwrap())
            .unwrap();
        assert_eq!(d.ingest.bad_hours, 1);
        assert_eq!(d.daily.len(), 2);
        assert_eq!(d.daily[1].date, NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        assert_eq!(d.daily[1].hours, 1.5);
        assert_eq!(d.streaks.longest, 2);
    }

    #[test]
    fn only_bad_hours_leaves_no_entry_for_the_date() {
        let csv = "Full_Date,Study,Hours,Tod\n2024-05-12,Math,1,Morning\n2024-05-13,Math,abc,Night\n";
        let d = from_csv(csv, &ViewParams::default(), NaiveDate::from_ymd_opt(2024, 5, 13).unwrap())
            .unwrap();
        assert_eq!(d.daily.len(), 1);
        assert!(d.today_breakdown.is_none());
    }

    #[test]
    fn missing_column_is_document_error() {
        assert!(from_csv("Date,Hours\n2024-10-14,1\n", &ViewParams::default(), today()).is_err());
    }
}
