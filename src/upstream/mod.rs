//! Upstream market-data gateway
//!
//! The dispatcher talks to the Indian Stock Exchange API through the
//! [`MarketDataGateway`] trait so tool execution can be tested against
//! a mock. The concrete [`IseClient`] is a thin reqwest wrapper:
//! process-wide, constructed once at startup, safe for concurrent use
//! through its internal connection pool. Failures here never become
//! protocol errors; the dispatcher renders them as tool result text.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::Config;

/// User agent sent on every upstream request.
const USER_AGENT: &str = "ISE-MCP-Server/1.0.0";

/// Errors from the upstream market-data API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure, timeout, or non-2xx status
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured base URL or a joined endpoint is not a valid URL
    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The configured credential cannot be sent as an HTTP header
    #[error("invalid API credential: {0}")]
    Credential(#[from] reqwest::header::InvalidHeaderValue),
}

/// Gateway to the upstream financial-data provider.
///
/// `fetch` performs one GET against `endpoint` with the given query
/// string and returns the JSON payload. No retries, no caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Value, UpstreamError>;
}

/// reqwest-backed client for the Indian Stock Exchange API.
pub struct IseClient {
    base_url: Url,
    client: reqwest::Client,
}

impl IseClient {
    /// Build the client from validated configuration.
    ///
    /// The credential is attached to every request as both
    /// `Authorization: Bearer` and `x-api-key`; the upstream accepts
    /// either depending on the endpoint.
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.api_base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = config.api_key();
        if !key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}"))?,
            );
            headers.insert("x-api-key", HeaderValue::from_str(key)?);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl MarketDataGateway for IseClient {
    async fn fetch(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        let url = self.base_url.join(endpoint.trim_start_matches('/'))?;
        debug!(%url, "fetching upstream data");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("HTTP error occurred: {e}");
                e
            })?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}
