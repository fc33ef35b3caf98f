//! Error handling for the ISE MCP server
//!
//! Structured error definitions with thiserror; anyhow is used for
//! propagation at the binary boundary.

use thiserror::Error;

use crate::upstream::UpstreamError;

/// Application result type alias
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Main application error enum
///
/// Covers the major error categories of the server. Protocol-level
/// JSON-RPC errors are not represented here; they are formed as wire
/// error objects inside the dispatch layer and never propagate as
/// Rust errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream market-data API errors
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Transport-level errors (stdio or HTTP server)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Generic application errors
    #[error("Application error: {message}")]
    Application { message: String },
}

impl AppError {
    /// Create a new Transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new Application error
    pub fn application<S: Into<String>>(message: S) -> Self {
        Self::Application {
            message: message.into(),
        }
    }
}
