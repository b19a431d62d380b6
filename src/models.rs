use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time-of-day bucket attached to a logged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Night,
}

impl TimeOfDay {
    /// Case-insensitive parse of the `Tod` column. Blank or unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(TimeOfDay::Morning),
            "afternoon" => Some(TimeOfDay::Afternoon),
            "night" => Some(TimeOfDay::Night),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Night => "Night",
        }
    }
}

/// One normalized row of the study log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySession {
    pub full_date: NaiveDate,
    pub study: String,
    pub hours: f64,
    /// Only recorded for part of the history; older rows have none.
    pub time_of_day: Option<TimeOfDay>,
}

/// Sum of hours for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_hours: f64,
}

impl DailyAggregate {
    pub fn studied(&self) -> bool {
        self.total_hours > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tod_parse_is_case_insensitive() {
        assert_eq!(TimeOfDay::parse(" night "), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::parse("MORNING"), Some(TimeOfDay::Morning));
        assert_eq!(TimeOfDay::parse(""), None);
        assert_eq!(TimeOfDay::parse("evening"), None);
    }

    #[test]
    fn studied_uses_strict_positive() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        assert!(!DailyAggregate { date: d, total_hours: 0.0 }.studied());
        assert!(DailyAggregate { date: d, total_hours: 1e-12 }.studied());
    }
}
