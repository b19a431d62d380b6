use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::feed::SessionSource;
use crate::logging::{info, v_int, v_str, Domain};

/// A CSV export on local disk. Accepts plain paths and `file://` locations.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(location: &str) -> Self {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Self {
            path: PathBuf::from(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionSource for FileSource {
    async fn fetch_csv(&self) -> Result<String> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        info(
            Domain::Fetch,
            "file_read",
            &[
                ("path", v_str(&self.path.display().to_string())),
                ("bytes", v_int(body.len() as u64)),
            ],
        );
        Ok(body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
