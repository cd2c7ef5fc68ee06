//! HTTP client for the scrape service
//!
//! A non-2xx status, a transport error, a timeout, or `success: false` in
//! the body all mean the same thing to the resolver: no enrichment available
//! this round. The resolver degrades to the synthetic fallback; nothing here
//! is allowed to fail a paper fetch.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use curemail_common::config::Config;
use curemail_common::types::{ScrapeRequest, ScrapeResponse};
use curemail_common::{Error, Result};

/// Default timeout for scrape requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote enrichment seam: one batch call per paper
#[async_trait]
pub trait RemoteEnricher: Send + Sync {
    /// Submit a full author list for one paper and return the enriched batch
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse>;
}

/// Remote enricher talking to a curemail-es instance
pub struct HttpRemoteEnricher {
    /// HTTP client for scrape requests
    http_client: Client,
    /// Base URL of the scrape service, e.g. `http://127.0.0.1:5731`
    base_url: String,
}

impl HttpRemoteEnricher {
    /// Create a client for the scrape service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_timeout(
            config.scrape_base_url.clone(),
            Duration::from_secs(config.remote_timeout_secs),
        )
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RemoteEnricher for HttpRemoteEnricher {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse> {
        let url = format!("{}/scrape", self.base_url);
        debug!(
            doi = %request.doi,
            authors = request.authors.len(),
            "Calling scrape service"
        );

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("Scrape request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "Scrape service returned {}: {}",
                status, body
            )));
        }

        let scrape_response: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("Failed to parse scrape response: {}", e)))?;

        Ok(scrape_response)
    }
}
