//! Streak detection over the daily series.
//!
//! A streak is a maximal run of calendar-consecutive dates that each have a
//! positive total. Consecutiveness is judged by calendar distance between the
//! dates present in the series, so an absent date breaks a run just like an
//! explicit zero day does.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::DailyAggregate;

/// Scan state threaded through the ascending daily series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    previous_date: Option<NaiveDate>,
    running_length: u32,
    best_length: u32,
}

impl StreakState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next day and returns the running length after it.
    pub fn update(&mut self, day: &DailyAggregate) -> u32 {
        let consecutive = self
            .previous_date
            .map_or(false, |prev| (day.date - prev).num_days() == 1);

        self.running_length = if !day.studied() {
            0
        } else if consecutive {
            self.running_length + 1
        } else {
            1
        };
        self.best_length = self.best_length.max(self.running_length);
        // The gap test for the next row uses this date whether or not it was studied.
        self.previous_date = Some(day.date);
        self.running_length
    }

    pub fn running(&self) -> u32 {
        self.running_length
    }

    pub fn best(&self) -> u32 {
        self.best_length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub longest: u32,
    /// Days from the latest explicit zero-hour date to `today`. Zero when the
    /// series has no zero-hour date. Not checked against the days in between.
    pub current: i64,
    pub last_zero_day: Option<NaiveDate>,
}

/// Computes longest and current streaks.
///
/// `daily` must be ascending by date with no duplicates, which
/// [`crate::aggregate::daily_totals`] guarantees.
pub fn compute(daily: &[DailyAggregate], today: NaiveDate) -> Streaks {
    debug_assert!(daily.windows(2).all(|w| w[0].date < w[1].date));

    let mut state = StreakState::new();
    for day in daily {
        state.update(day);
    }

    let last_zero_day = daily
        .iter()
        .filter(|d| d.total_hours == 0.0)
        .map(|d| d.date)
        .max();
    let current = last_zero_day.map_or(0, |zero| (today - zero).num_days());

    Streaks {
        longest: state.best(),
        current,
        last_zero_day,
    }
}
