use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;

mod file;
mod sheet;

pub use file::FileSource;
pub use sheet::SheetSource;

/// Somewhere the raw study log CSV can be read from.
#[async_trait]
pub trait SessionSource {
    /// Returns the whole CSV document. Any transport or status failure is an error.
    async fn fetch_csv(&self) -> Result<String>;

    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Sheet,
    File,
}

impl SourceKind {
    pub fn detect(location: &str) -> Self {
        let lower = location.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceKind::Sheet
        } else {
            SourceKind::File
        }
    }

    pub fn build(self, cfg: &Config) -> Result<Box<dyn SessionSource + Send + Sync>> {
        match self {
            SourceKind::Sheet => Ok(Box::new(SheetSource::new(
                cfg.source.trim(),
                Duration::from_secs(cfg.fetch_timeout_secs),
            )?)),
            SourceKind::File => Ok(Box::new(FileSource::new(cfg.source.trim()))),
        }
    }
}

pub fn source_for(cfg: &Config) -> Result<Box<dyn SessionSource + Send + Sync>> {
    SourceKind::detect(&cfg.source).build(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_from_location() {
        assert_eq!(SourceKind::detect("https://example.com/pub?output=csv"), SourceKind::Sheet);
        assert_eq!(SourceKind::detect("HTTP://example.com/x.csv"), SourceKind::Sheet);
        assert_eq!(SourceKind::detect("data/log.csv"), SourceKind::File);
        assert_eq!(SourceKind::detect("file:///tmp/log.csv"), SourceKind::File);
    }

    #[test]
    fn rejects_malformed_url() {
        let cfg = Config::default().with_source("https://");
        assert!(source_for(&cfg).is_err());
    }
}
