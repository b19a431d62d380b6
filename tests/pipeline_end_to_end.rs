use chrono::NaiveDate;
use studylog::config::Config;
use studylog::feed::source_for;
use studylog::models::TimeOfDay;
use studylog::pipeline::{from_csv, run, Outcome};
use studylog::report;
use studylog::views::{Period, ViewParams};
use std::fs;
use tempfile::TempDir;

const SHEET: &str = "\u{feff}Full_Date,Study,Hours,Tod\n\
    10/07/2024,Math,2,Morning\n\
    10/08/2024,Math,1.5,Morning\n\
    10/08/2024,\"Physics, Lab\",1,Night\n\
    10/09/2024,Math,0,Morning\n\
    10/10/2024,Art,2,Afternoon\n\
    10/11/2024,Art,1,Afternoon\n\
    10/12/2024,Math,,Morning\n\
    10/14/2024,Math,3,Morning\n";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 14).unwrap()
}

#[test]
fn sheet_export_to_dashboard() {
    let d = from_csv(SHEET, &ViewParams::default(), today()).unwrap();
    assert_eq!(d.ingest.rows, 8);
    assert_eq!(d.ingest.kept, 7);
    assert_eq!(d.ingest.bad_hours, 1);

    assert_eq!(d.streaks.longest, 2);
    assert_eq!(d.streaks.current, 5);
    assert_eq!(d.summary.total_hours, 10.5);
    assert_eq!(d.summary.started_on, NaiveDate::from_ymd_opt(2024, 10, 7));
    assert_eq!(d.summary.record_day.unwrap().hours, 3.0);

    assert_eq!(d.subjects[0].study, "Math");
    assert_eq!(d.subjects[0].hours, 6.5);
    assert!(d.subjects.iter().any(|s| s.study == "Physics, Lab"));

    assert_eq!(d.daily.len(), 6);
    assert!(d.daily.iter().all(|p| p.volatility.is_none()));
    assert_eq!(d.weekly.len(), 2);
    assert_eq!(d.today_breakdown.unwrap().total_hours, 3.0);
}

#[test]
fn selected_time_of_day_and_entire_period() {
    let params = ViewParams {
        period: Period::Entire,
        tod: TimeOfDay::Afternoon,
        ..ViewParams::default()
    };
    let d = from_csv(SHEET, &params, today()).unwrap();
    assert_eq!(d.tod_subjects.len(), 1);
    assert_eq!(d.tod_subjects[0].study, "Art");
    assert_eq!(d.tod_subjects[0].hours, 3.0);
}

#[test]
fn recomputation_is_idempotent() {
    let params = ViewParams::default();
    let a = from_csv(SHEET, &params, today()).unwrap();
    let b = from_csv(SHEET, &params, today()).unwrap();
    assert_eq!(a, b);
    assert_eq!(report::render_dashboard(&a), report::render_dashboard(&b));
}

#[tokio::test]
async fn file_source_runs_whole_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(&path, SHEET).unwrap();
    let cfg = Config::default().with_source(path.to_str().unwrap());
    let source = source_for(&cfg).unwrap();
    match run(&*source, &cfg.view_params(), today()).await {
        Outcome::Ready(d) => assert_eq!(d.ingest.kept, 7),
        Outcome::Empty { error } => panic!("unexpected empty state: {:?}", error),
    }
}

#[tokio::test]
async fn header_only_sheet_is_empty_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(&path, "Full_Date,Study,Hours,Tod\n").unwrap();
    let cfg = Config::default().with_source(path.to_str().unwrap());
    let source = source_for(&cfg).unwrap();
    let outcome = run(&*source, &cfg.view_params(), today()).await;
    assert_eq!(outcome, Outcome::no_data());
}
