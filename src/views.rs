//! Derived views: plain group-and-sum tables built from the sessions and the
//! daily series. Every function here is pure; the period, time-of-day and
//! "today" choices arrive as explicit parameters.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::indicators::{mean, rolling_std, round2, VOLATILITY_WINDOW};
use crate::models::{DailyAggregate, StudySession, TimeOfDay};

pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum Period {
    /// The `n` calendar days ending today.
    LastDays(u32),
    Entire,
}

impl Period {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::Entire => true,
            // a window reaching past the earliest representable date covers everything
            Period::LastDays(n) => today
                .checked_sub_signed(Duration::days(i64::from(*n)))
                .map_or(true, |start| date > start),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Period::Entire => "Entire Period".to_string(),
            Period::LastDays(n) => format!("Last {} Days", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewParams {
    pub period: Period,
    pub tod: TimeOfDay,
    pub recent_days: u32,
    pub top_n: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            period: Period::LastDays(30),
            tod: TimeOfDay::Morning,
            recent_days: 15,
            top_n: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub hours: f64,
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPoint {
    pub week_start: NaiveDate,
    pub mean_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectTotal {
    pub study: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub total_hours: f64,
    pub days: u32,
    pub average_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodTotal {
    pub tod: TimeOfDay,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayBreakdown {
    pub date: NaiveDate,
    pub total_hours: f64,
    pub subjects: Vec<SubjectTotal>,
}

/// Daily totals with the 7-observation rolling volatility alongside.
///
/// The window runs over rows, not calendar days, so absent dates are skipped.
pub fn daily_series(daily: &[DailyAggregate]) -> Vec<DailyPoint> {
    let hours: Vec<f64> = daily.iter().map(|d| d.total_hours).collect();
    let vol = rolling_std(&hours, VOLATILITY_WINDOW);
    daily
        .iter()
        .zip(vol)
        .map(|(d, volatility)| DailyPoint {
            date: d.date,
            hours: d.total_hours,
            volatility,
        })
        .collect()
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Mean of the daily totals present in each Monday-start week, rounded to 2 decimals.
pub fn weekly_means(daily: &[DailyAggregate]) -> Vec<WeeklyPoint> {
    let mut weeks: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for d in daily {
        weeks.entry(week_start(d.date)).or_default().push(d.total_hours);
    }
    weeks
        .into_iter()
        .filter_map(|(week_start, hours)| {
            mean(&hours).map(|m| WeeklyPoint {
                week_start,
                mean_hours: round2(m),
            })
        })
        .collect()
}

pub fn in_period<'a>(
    sessions: &'a [StudySession],
    period: Period,
    today: NaiveDate,
) -> Vec<&'a StudySession> {
    sessions
        .iter()
        .filter(|s| period.contains(s.full_date, today))
        .collect()
}

/// Hours per subject, largest first. Ties are ordered by name.
pub fn subject_totals<'a, I>(sessions: I) -> Vec<SubjectTotal>
where
    I: IntoIterator<Item = &'a StudySession>,
{
    let mut by_subject: HashMap<&str, f64> = HashMap::new();
    for s in sessions {
        *by_subject.entry(s.study.as_str()).or_insert(0.0) += s.hours;
    }
    let mut totals: Vec<SubjectTotal> = by_subject
        .into_iter()
        .map(|(study, hours)| SubjectTotal {
            study: study.to_string(),
            hours,
        })
        .collect();
    totals.sort_by(|a, b| b.hours.total_cmp(&a.hours).then_with(|| a.study.cmp(&b.study)));
    totals
}

/// The `n` subjects with the most hours over the last `days` days.
pub fn top_subjects(
    sessions: &[StudySession],
    today: NaiveDate,
    days: u32,
    n: usize,
) -> Vec<SubjectTotal> {
    let mut totals = subject_totals(in_period(sessions, Period::LastDays(days), today));
    totals.truncate(n);
    totals
}

/// Average hours per weekday, Monday first.
///
/// The denominator is the number of distinct dates seen for that weekday, so
/// weeks without any session on it do not dilute the average. Weekdays with
/// no sessions are omitted.
pub fn weekday_averages<'a, I>(sessions: I) -> Vec<WeekdayAverage>
where
    I: IntoIterator<Item = &'a StudySession>,
{
    let mut totals: HashMap<Weekday, f64> = HashMap::new();
    let mut dates: HashMap<Weekday, BTreeSet<NaiveDate>> = HashMap::new();
    for s in sessions {
        let wd = s.full_date.weekday();
        *totals.entry(wd).or_insert(0.0) += s.hours;
        dates.entry(wd).or_default().insert(s.full_date);
    }
    WEEKDAY_ORDER
        .iter()
        .filter_map(|wd| {
            let days = dates.get(wd)?.len() as u32;
            let total_hours = totals.get(wd).copied().unwrap_or(0.0);
            Some(WeekdayAverage {
                weekday: *wd,
                total_hours,
                days,
                average_hours: round2(total_hours / f64::from(days)),
            })
        })
        .collect()
}

/// Hours per time of day. Sessions without a recorded time of day are skipped.
pub fn tod_totals<'a, I>(sessions: I) -> Vec<TodTotal>
where
    I: IntoIterator<Item = &'a StudySession>,
{
    let mut totals: BTreeMap<TimeOfDay, f64> = BTreeMap::new();
    for s in sessions {
        if let Some(tod) = s.time_of_day {
            *totals.entry(tod).or_insert(0.0) += s.hours;
        }
    }
    totals
        .into_iter()
        .map(|(tod, hours)| TodTotal { tod, hours })
        .collect()
}

pub fn subjects_for_tod<'a, I>(sessions: I, tod: TimeOfDay) -> Vec<SubjectTotal>
where
    I: IntoIterator<Item = &'a StudySession>,
{
    subject_totals(sessions.into_iter().filter(|s| s.time_of_day == Some(tod)))
}

/// Subjects studied on `today`, or `None` when nothing was logged.
pub fn today_breakdown(sessions: &[StudySession], today: NaiveDate) -> Option<TodayBreakdown> {
    let todays: Vec<&StudySession> = sessions.iter().filter(|s| s.full_date == today).collect();
    if todays.is_empty() {
        return None;
    }
    let total_hours: f64 = todays.iter().map(|s| s.hours).sum();
    Some(TodayBreakdown {
        date: today,
        total_hours,
        subjects: subject_totals(todays),
    })
}
