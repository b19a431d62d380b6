use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::feed::SessionSource;
use crate::logging::{info, v_int, v_str, Domain};

/// A spreadsheet published to the web as CSV.
pub struct SheetSource {
    client: Client,
    url: Url,
}

impl SheetSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid source url {:?}", url))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(anyhow!("source url {} has no host", url));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SessionSource for SheetSource {
    async fn fetch_csv(&self) -> Result<String> {
        info(Domain::Fetch, "request", &[("url", v_str(self.url.as_str()))]);
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {} returned HTTP {}", self.url, status.as_u16()));
        }
        let body = resp.text().await.context("reading response body")?;
        info(
            Domain::Fetch,
            "response",
            &[
                ("status", v_int(u64::from(status.as_u16()))),
                ("bytes", v_int(body.len() as u64)),
            ],
        );
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
