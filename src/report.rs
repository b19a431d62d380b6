//! Plain-text rendering of a [`Dashboard`] for the terminal.

use std::fmt::Write;

use crate::pipeline::{Dashboard, Outcome, NO_DATA};
use crate::views::SubjectTotal;

const TITLE: &str = "My Daily Study Routine";
const BAR_WIDTH: f64 = 30.0;

pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Ready(dashboard) => render_dashboard(dashboard),
        Outcome::Empty { error } => render_empty(error.as_deref()),
    }
}

/// Title, the failure line when there is one, then the no-data notice.
pub fn render_empty(error: Option<&str>) -> String {
    match error {
        Some(error) => format!("{}\n\n{}\n{}\n", TITLE, error, NO_DATA),
        None => format!("{}\n\n{}\n", TITLE, NO_DATA),
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let n = ((value / max) * BAR_WIDTH).round().max(1.0) as usize;
    "#".repeat(n)
}

fn subject_rows(out: &mut String, rows: &[SubjectTotal]) {
    let max = rows.iter().map(|r| r.hours).fold(0.0, f64::max);
    let width = rows.iter().map(|r| r.study.chars().count()).max().unwrap_or(0);
    for r in rows {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>7.2}  {}",
            r.study,
            r.hours,
            bar(r.hours, max),
            width = width
        );
    }
}

pub fn render_dashboard(d: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "as of {}\n", d.today);

    match &d.today_breakdown {
        Some(today) => {
            let _ = writeln!(out, "Total Hours Studied Today: {:.2} Hours", today.total_hours);
            subject_rows(&mut out, &today.subjects);
        }
        None => {
            let _ = writeln!(out, "Nothing logged today.");
        }
    }

    let s = &d.summary;
    let _ = writeln!(out, "\n- Total Hours Studied -");
    let _ = writeln!(out, "  Total Hours            {:.2} Hours", s.total_hours);
    let _ = writeln!(out, "  Total time (in days)   {:.2} Days", s.total_days_equivalent);
    match s.record_day {
        Some(r) => {
            let _ = writeln!(out, "  Record Day             {:.2} Hours on {}", r.hours, r.date);
        }
        None => {
            let _ = writeln!(out, "  Record Day             -");
        }
    }
    if let Some(start) = s.started_on {
        let _ = writeln!(out, "  Started on             {}", start);
    }
    let _ = writeln!(out, "  Longest Study Streak   {} Days", d.streaks.longest);
    let _ = writeln!(out, "  Current Study Streak   {} Days", d.streaks.current);
    let _ = writeln!(out, "  Distinct Days Studied  {} Days", s.distinct_study_days);
    let _ = writeln!(out, "  No study days          {} Days", s.no_study_days);

    let _ = writeln!(out, "\nTotal Hours by Subject");
    subject_rows(&mut out, &d.subjects);

    let _ = writeln!(
        out,
        "\nTop {} Subjects Studied in the Last {} Days",
        d.params.top_n, d.params.recent_days
    );
    if d.top_recent.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    subject_rows(&mut out, &d.top_recent);

    let _ = writeln!(out, "\nWeekly Average Study Hours");
    let max_week = d.weekly.iter().map(|w| w.mean_hours).fold(0.0, f64::max);
    for w in d.weekly.iter().rev().take(8).rev() {
        let _ = writeln!(
            out,
            "  {}  {:>6.2}  {}",
            w.week_start,
            w.mean_hours,
            bar(w.mean_hours, max_week)
        );
    }

    let _ = writeln!(out, "\nInsights ({})", d.params.period.label());
    let _ = writeln!(out, "Average Study Hours by Day of the Week");
    let max_wd = d.weekdays.iter().map(|w| w.average_hours).fold(0.0, f64::max);
    for w in &d.weekdays {
        let _ = writeln!(
            out,
            "  {:<3}  {:>6.2}  {}",
            w.weekday.to_string(),
            w.average_hours,
            bar(w.average_hours, max_wd)
        );
    }

    let _ = writeln!(out, "\nStudy Hours Distribution by Time of Day");
    let tod_sum: f64 = d.tod_totals.iter().map(|t| t.hours).sum();
    if d.tod_totals.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for t in &d.tod_totals {
        let pct = if tod_sum > 0.0 { t.hours / tod_sum * 100.0 } else { 0.0 };
        let _ = writeln!(out, "  {:<9}  {:>7.2}  {:>5.1}%", t.tod.as_str(), t.hours, pct);
    }

    let _ = writeln!(out, "\nStudy Hours for {}", d.params.tod.as_str());
    if d.tod_subjects.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    subject_rows(&mut out, &d.tod_subjects);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::from_csv;
    use crate::views::ViewParams;
    use chrono::NaiveDate;

    #[test]
    fn empty_state_is_neutral() {
        let text = render(&Outcome::no_data());
        assert!(text.starts_with(TITLE));
        assert!(text.ends_with("No data available.\n"));
    }

    #[test]
    fn failure_shows_error_then_no_data() {
        let text = render(&Outcome::failed("Failed to fetch data: HTTP 404".to_string()));
        assert!(text.contains("Failed to fetch data: HTTP 404\nNo data available.\n"));
    }

    #[test]
    fn renders_headline_numbers() {
        let csv = "Full_Date,Study,Hours,Tod\n2024-10-15,Math,0,\n2024-10-16,Math,2.5,Night\n";
        let today = NaiveDate::from_ymd_opt(2024, 10, 16).unwrap();
        let d = from_csv(csv, &ViewParams::default(), today).unwrap();
        let text = render(&Outcome::Ready(Box::new(d)));
        assert!(text.contains("Total Hours Studied Today: 2.50 Hours"));
        assert!(text.contains("Longest Study Streak   1 Days"));
        assert!(text.contains("Current Study Streak   1 Days"));
        assert!(text.contains("Study Hours for Morning\n  (none)"));
    }

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(0.0, 5.0), "");
        assert_eq!(bar(5.0, 5.0).len(), 30);
        assert_eq!(bar(0.01, 5.0).len(), 1);
    }
}
