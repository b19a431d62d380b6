use std::env;
use std::fs;

use studylog::config::Config;
use studylog::data::{build_manifest, default_manifest_path, EXPECTED_COLUMNS};
use studylog::feed::{source_for, FileSource, SourceKind};
use studylog::logging::ts_now;

#[tokio::main]
async fn main() {
    let cfg = match env::args().nth(1) {
        Some(location) => Config::from_env().with_source(location),
        None => Config::from_env(),
    };

    let source = match source_for(&cfg) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("invalid source: {:#}", err);
            std::process::exit(1);
        }
    };
    let text = match source.fetch_csv().await {
        Ok(t) => t,
        Err(err) => {
            eprintln!("fetch failed: {:#}", err);
            std::process::exit(3);
        }
    };

    let manifest = match build_manifest(&source.describe(), &text, ts_now()) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("schema check failed: {}", err);
            std::process::exit(1);
        }
    };
    if !manifest.schema.ok {
        eprintln!("schema mismatch: {:?}", manifest.schema.message);
        eprintln!("expected columns: {:?}", EXPECTED_COLUMNS);
        std::process::exit(2);
    }

    let payload = match serde_json::to_string_pretty(&manifest) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("failed to serialize manifest: {}", err);
            std::process::exit(4);
        }
    };
    match SourceKind::detect(&cfg.source) {
        SourceKind::File => {
            let out_path = default_manifest_path(FileSource::new(cfg.source.trim()).path());
            if let Err(err) = fs::write(&out_path, payload) {
                eprintln!("failed to write {}: {}", out_path.display(), err);
                std::process::exit(4);
            }
            println!("wrote manifest {}", out_path.display());
        }
        SourceKind::Sheet => println!("{}", payload),
    }
}
