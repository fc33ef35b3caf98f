//! Configuration management module
//!
//! Layered configuration: an optional `ise-mcp.toml` file, overridden by
//! `ISE_`-prefixed environment variables. The core never reads the
//! environment directly; it receives a validated [`Config`] at startup.
//!
//! Recognized environment variables:
//! - `ISE_API_BASE_URL`: upstream market-data API base URL
//! - `ISE_API_KEY`: upstream API credential (required)
//! - `ISE_REQUEST_TIMEOUT`: upstream request timeout in seconds
//! - `ISE_HTTP_HOST` / `ISE_HTTP_PORT`: HTTP transport listen address
//! - `ISE_LOG_LEVEL`: default log level when `RUST_LOG` is unset

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Default upstream API base URL.
pub const DEFAULT_BASE_URL: &str = "https://stock.indianapi.in/";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream market-data API base URL
    pub api_base_url: String,
    /// Upstream API credential, sent as both `Authorization: Bearer` and
    /// `x-api-key` headers
    pub api_key: Option<String>,
    /// Upstream request timeout in seconds
    pub request_timeout: u64,
    /// HTTP transport listen host
    pub http_host: String,
    /// HTTP transport listen port
    pub http_port: u16,
    /// Default log level (`RUST_LOG` takes precedence)
    pub log_level: String,
}

impl Config {
    /// Load configuration from `ise-mcp.toml` (if present) and the
    /// environment, then validate it.
    pub fn load() -> AppResult<Self> {
        let config: Config = ::config::Config::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)?
            .set_default("request_timeout", 30_i64)?
            .set_default("http_host", "0.0.0.0")?
            .set_default("http_port", 8000_i64)?
            .set_default("log_level", "info")?
            .add_source(::config::File::with_name("ise-mcp").required(false))
            .add_source(::config::Environment::with_prefix("ISE").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate that required configuration is present
    pub fn validate(&self) -> AppResult<()> {
        debug!("Validating configuration");

        match &self.api_key {
            Some(key) if !key.is_empty() => {}
            _ => {
                return Err(AppError::application(
                    "ISE_API_KEY environment variable is required. \
                     Please set it in your environment or ise-mcp.toml.",
                ))
            }
        }

        if self.request_timeout == 0 {
            return Err(AppError::application(
                "request_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// The validated API credential.
    ///
    /// Empty when validation has not run; [`Config::load`] guarantees it
    /// is populated.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout: 30,
            http_host: "0.0.0.0".to_string(),
            http_port: 8000,
            log_level: "info".to_string(),
        }
    }
}
