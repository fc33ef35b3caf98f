//! Per-connection session state
//!
//! Tracks whether a connection has completed the initialize handshake
//! and which client sits on the other end. The stream transport keeps
//! one [`SessionState`] for the life of the pipe; the HTTP transport
//! creates an ephemeral one per exchange, since a one-shot
//! request/response transport cannot genuinely remember a handshake.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::protocol::PROTOCOL_VERSION;

/// Handshake state for one connection.
///
/// The only transition is `Uninitialized -> Initialized`, performed by
/// the `initialize` handler. Calling `initialize` again simply
/// re-records client info; no method other than the handshake itself
/// is gated on this state, a deliberate leniency for out-of-order
/// clients.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Whether the initialize handshake has completed
    pub initialized: bool,
    /// Protocol version requested by the client, server default until
    /// the handshake records one
    pub protocol_version: String,
    /// Client name from `clientInfo`
    pub client_name: String,
    /// Client version from `clientInfo`
    pub client_version: String,
    /// When this session was created
    pub connected_at: DateTime<Utc>,
}

impl SessionState {
    /// Create a fresh, uninitialized session.
    pub fn new() -> Self {
        Self {
            initialized: false,
            protocol_version: PROTOCOL_VERSION.to_string(),
            client_name: "unknown".to_string(),
            client_version: "unknown".to_string(),
            connected_at: Utc::now(),
        }
    }

    /// Record an `initialize` request. Idempotent: repeated calls
    /// overwrite the recorded client identity with the most recent one.
    pub fn record_initialize(&mut self, params: &Map<String, Value>) {
        if let Some(version) = params.get("protocolVersion").and_then(Value::as_str) {
            self.protocol_version = version.to_string();
        }

        let client_info = params.get("clientInfo").and_then(Value::as_object);
        self.client_name = client_info
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        self.client_version = client_info
            .and_then(|info| info.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        self.initialized = true;
    }

    /// Mark the handshake acknowledged (`notifications/initialized`).
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn new_session_is_uninitialized() {
        let session = SessionState::new();
        assert!(!session.initialized);
        assert_eq!(session.client_name, "unknown");
    }

    #[test]
    fn initialize_records_client_info() {
        let mut session = SessionState::new();
        session.record_initialize(&params(json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": {"name": "dify", "version": "0.6.0"}
        })));

        assert!(session.initialized);
        assert_eq!(session.client_name, "dify");
        assert_eq!(session.client_version, "0.6.0");
    }

    #[test]
    fn initialize_is_idempotent_and_rerecords() {
        let mut session = SessionState::new();
        session.record_initialize(&params(json!({
            "clientInfo": {"name": "first", "version": "1"}
        })));
        session.record_initialize(&params(json!({
            "clientInfo": {"name": "second", "version": "2"}
        })));

        assert!(session.initialized);
        assert_eq!(session.client_name, "second");
        assert_eq!(session.client_version, "2");
    }

    #[test]
    fn initialize_tolerates_missing_client_info() {
        let mut session = SessionState::new();
        session.record_initialize(&params(json!({})));

        assert!(session.initialized);
        assert_eq!(session.client_name, "unknown");
        assert_eq!(session.client_version, "unknown");
    }
}
