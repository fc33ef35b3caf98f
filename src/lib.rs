//! ISE MCP - Indian Stock Exchange Model Context Protocol server
//!
//! Exposes a fixed catalog of financial-data queries (stock lookups,
//! trending lists, historical series, mutual funds) over JSON-RPC 2.0,
//! with two interchangeable transports:
//!
//! - **stdio**: line-delimited JSON-RPC over a persistent stdin/stdout
//!   pipe, one process per session
//! - **HTTP**: one JSON-RPC message per `POST /jsonrpc` exchange, plus
//!   liveness and info endpoints
//!
//! Both transports share the same dispatcher, tool catalog, and upstream
//! gateway; only message framing and response emission differ.

pub mod catalog;
pub mod config;
pub mod error;
pub mod rpc;
pub mod transport;
pub mod upstream;

pub use self::config::Config;
pub use self::error::{AppError, AppResult};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Server name advertised in `initialize`, `/health` and `/info` responses.
pub const SERVER_NAME: &str = "indian-stock-exchange";

/// Server version advertised alongside [`SERVER_NAME`].
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the logging system with structured logging
///
/// Log output goes to stderr so that stdout stays clean for JSON-RPC
/// frames when running on the stdio transport. The `RUST_LOG`
/// environment variable takes precedence over the configured level.
pub fn initialize_logging(default_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ise_mcp={default_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
