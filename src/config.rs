use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::models::TimeOfDay;
use crate::views::{Period, ViewParams};

/// Published study log sheet.
pub const DEFAULT_SOURCE: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQxN8g_GH_fD3AqSLH-17joABrioyI5Cq3iAsNozNKGPyyhF_1U4H2xA6LPw5X9OJYsdKcBvE1swuHZ/pub?output=csv";

const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;
const MAX_WINDOW_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `http(s)://` URL or local CSV path.
    pub source: String,
    /// Fixed offset used to decide which calendar date is "today".
    pub utc_offset_minutes: i32,
    pub window_days: u32,
    pub entire_period: bool,
    pub tod: TimeOfDay,
    pub recent_days: u32,
    pub top_n: usize,
    pub fetch_timeout_secs: u64,
    pub html_out: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable values fall back to defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let offset = var("STUDY_UTC_OFFSET_MINUTES")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|m| FixedOffset::east_opt(m.saturating_mul(60)).is_some())
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        Self {
            source: var("STUDY_SOURCE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            utc_offset_minutes: offset,
            window_days: var("STUDY_WINDOW_DAYS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(30u32)
                .clamp(1, MAX_WINDOW_DAYS),
            entire_period: var("STUDY_ENTIRE_PERIOD")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            tod: var("STUDY_TOD")
                .and_then(|v| TimeOfDay::parse(&v))
                .unwrap_or(TimeOfDay::Morning),
            recent_days: var("STUDY_RECENT_DAYS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|d| *d > 0)
                .unwrap_or(15u32)
                .min(MAX_WINDOW_DAYS),
            top_n: var("STUDY_TOP_N").and_then(|v| v.trim().parse().ok()).unwrap_or(3),
            fetch_timeout_secs: var("FETCH_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(10),
            html_out: var("STUDY_HTML_OUT").filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset()).date_naive()
    }

    pub fn period(&self) -> Period {
        if self.entire_period {
            Period::Entire
        } else {
            Period::LastDays(self.window_days)
        }
    }

    pub fn view_params(&self) -> ViewParams {
        ViewParams {
            period: self.period(),
            tod: self.tod,
            recent_days: self.recent_days,
            top_n: self.top_n,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
