// src/services/fetcher.rs

//! Page fetching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::config::HttpConfig;
use crate::error::{AppError, Result};
use crate::models::Snapshot;

/// Fetches the current state of a page as a snapshot.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and parse the body into a snapshot.
    ///
    /// Any outcome other than an HTTP 200 response is an error; retry policy
    /// belongs to the caller.
    async fn fetch(&self, url: &Url) -> Result<Snapshot>;
}

/// HTTP fetcher backed by a configured reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured user agent and timeout.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Snapshot> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::fetch(url.as_str(), Some(status.as_u16())));
        }

        let body = response.text().await?;
        log::debug!("Received {} bytes from {}.", body.len(), url);
        Ok(Snapshot::parse(body))
    }
}
