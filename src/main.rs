use anyhow::Result;
use std::env;
use std::path::Path;

use studylog::config::Config;
use studylog::dashboard;
use studylog::feed::source_for;
use studylog::logging::{error, info, run_id, v_int, v_str, Domain};
use studylog::pipeline::{self, Outcome};
use studylog::report;

#[tokio::main]
async fn main() -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(source) = env::args().nth(1) {
        cfg = cfg.with_source(source);
    }
    let today = cfg.today();
    let params = cfg.view_params();
    info(
        Domain::System,
        "startup",
        &[
            ("run_id", v_str(&run_id())),
            ("source", v_str(&cfg.source)),
            ("today", v_str(&today.to_string())),
            ("period", v_str(&params.period.label())),
            ("tod", v_str(params.tod.as_str())),
        ],
    );

    let outcome = match source_for(&cfg) {
        Ok(source) => pipeline::run(&*source, &params, today).await,
        Err(err) => {
            error(Domain::Fetch, "source_invalid", &[("error", v_str(&format!("{:#}", err)))]);
            Outcome::failed(format!("Failed to fetch data: {:#}", err))
        }
    };

    print!("{}", report::render(&outcome));

    if let Some(out) = &cfg.html_out {
        let bytes = dashboard::write_html(&outcome, Path::new(out))?;
        info(
            Domain::Report,
            "html_written",
            &[("path", v_str(out)), ("bytes", v_int(bytes as u64))],
        );
    }

    let status = match &outcome {
        Outcome::Ready(_) => "ready",
        Outcome::Empty { .. } => "empty",
    };
    info(Domain::System, "shutdown", &[("outcome", v_str(status))]);
    Ok(())
}
