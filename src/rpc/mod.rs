//! JSON-RPC 2.0 session and dispatch layer
//!
//! Key components:
//! - Protocol core: envelope parsing, request/notification
//!   classification, response and error shaping
//! - Per-connection session state with the initialize handshake
//! - The method dispatcher shared by both transports

pub mod dispatcher;
pub mod protocol;
pub mod session;

pub use self::dispatcher::RpcDispatcher;
pub use self::protocol::{
    error_codes, RpcEnvelope, RpcError, RpcOutcome, RpcResponse, JSONRPC_VERSION,
    PROTOCOL_VERSION,
};
pub use self::session::SessionState;
