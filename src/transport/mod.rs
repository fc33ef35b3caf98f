//! Message framing transports
//!
//! Two framers over the shared dispatcher:
//! - [`stdio`]: line-delimited JSON-RPC over a persistent duplex pipe
//! - [`http`]: one JSON-RPC message per HTTP exchange, plus liveness
//!   and info endpoints

pub mod http;
pub mod stdio;

pub use self::http::{build_router, AppState, HttpServer};
pub use self::stdio::{StdioServer, StdioTransport};
