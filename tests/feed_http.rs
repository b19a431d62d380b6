//! Published-sheet fetches against a local mock server.

use chrono::NaiveDate;
use studylog::config::Config;
use studylog::feed::{source_for, SessionSource, SheetSource};
use studylog::pipeline::{run, Outcome};
use std::time::Duration;

const BODY: &str = "Full_Date,Study,Hours,Tod\n2024-10-15,Math,2,Morning\n2024-10-16,Math,1,Night\n";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 16).unwrap()
}

async fn outcome_for(server: &mockito::Server) -> Outcome {
    let cfg = Config::default().with_source(format!("{}/pub?output=csv", server.url()));
    let source = source_for(&cfg).unwrap();
    run(&*source, &cfg.view_params(), today()).await
}

#[tokio::test]
async fn fetches_published_csv() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/pub")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(BODY)
        .create_async()
        .await;

    let source = SheetSource::new(&format!("{}/pub", server.url()), Duration::from_secs(5)).unwrap();
    assert_eq!(source.fetch_csv().await.unwrap(), BODY);
    mock.assert_async().await;
}

#[tokio::test]
async fn successful_fetch_builds_dashboard() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/pub")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(BODY)
        .create_async()
        .await;

    match outcome_for(&server).await {
        Outcome::Ready(d) => {
            assert_eq!(d.streaks.longest, 2);
            assert_eq!(d.summary.total_hours, 3.0);
        }
        Outcome::Empty { error } => panic!("unexpected empty state: {:?}", error),
    }
}

#[tokio::test]
async fn http_error_becomes_empty_state() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/pub")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    match outcome_for(&server).await {
        Outcome::Empty { error } => {
            let error = error.expect("fetch failure carries an error line");
            assert!(error.starts_with("Failed to fetch data"));
            assert!(error.contains("404"));
        }
        Outcome::Ready(_) => panic!("404 must not produce a dashboard"),
    }
}

#[tokio::test]
async fn missing_column_becomes_empty_state() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/pub")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body("Full_Date,Study,Hours\n2024-10-16,Math,1\n")
        .create_async()
        .await;

    match outcome_for(&server).await {
        Outcome::Empty { error } => {
            assert!(error.unwrap_or_default().contains("missing column Tod"))
        }
        Outcome::Ready(_) => panic!("a sheet without Tod must not produce a dashboard"),
    }
}

#[tokio::test]
async fn html_error_page_becomes_empty_state() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/pub")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Sign in</body></html>\n")
        .create_async()
        .await;

    assert!(matches!(outcome_for(&server).await, Outcome::Empty { .. }));
}
