//! HTTP feed source.

use crate::payload::decode_payload_bytes;
use crate::retry::{retry_async, RetryPolicy};
use crate::source::IpoSource;
use async_trait::async_trait;
use ipo_core::{Error, FeedConfig, RawIpoRecord, Result};
use reqwest::{header, Client};
use std::time::Duration;

/// Fetches IPO records with an HTTP GET.
///
/// Transient failures (connection errors, timeouts, 5xx, 429) are retried
/// with exponential backoff; other statuses fail immediately.
#[derive(Debug, Clone)]
pub struct HttpIpoSource {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpIpoSource {
    /// Create a new HTTP source.
    pub fn new(url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            retry,
        })
    }

    /// Create from feed configuration.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Self::new(
            config.url.clone(),
            Duration::from_millis(config.timeout_ms),
            RetryPolicy {
                attempts: config.retry_attempts,
                initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            },
        )
    }

    /// Endpoint being polled.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<Vec<RawIpoRecord>> {
        tracing::debug!(url = %self.url, "GET IPO feed");

        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::fetch(format!("request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(status.as_u16(), self.url.clone()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(format!("reading body from {} failed: {}", self.url, e)))?;

        decode_payload_bytes(&body)
    }
}

#[async_trait]
impl IpoSource for HttpIpoSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<RawIpoRecord>> {
        retry_async(|_| self.fetch_once(), self.retry, Error::is_transient).await
    }
}
