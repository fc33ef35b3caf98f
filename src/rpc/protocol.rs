//! JSON-RPC 2.0 protocol core
//!
//! Message envelope, response shaping, and the reserved error-code
//! range. The envelope keeps the raw JSON value around instead of
//! deserializing into a rigid struct: several fielded clients send
//! messages with `method` or `id` missing entirely, and classification
//! must distinguish an absent `id` key from `"id": null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// JSON-RPC protocol tag; every valid envelope carries it verbatim.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision advertised in the `initialize` result.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Reserved JSON-RPC 2.0 error codes. No custom codes outside this range.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// A single inbound JSON-RPC message.
///
/// An envelope with an `id` key (even `"id": null`) is a *request* and
/// must receive exactly one response with the same id; an envelope
/// without the key is a *notification* and receives no response unless
/// dispatch fails.
#[derive(Debug, Clone)]
pub struct RpcEnvelope {
    raw: Value,
}

impl RpcEnvelope {
    /// Wrap an already-parsed JSON value.
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Parse a raw message body. A malformed body yields the standard
    /// `-32700` parse error.
    pub fn parse(text: &str) -> Result<Self, RpcError> {
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(|_| RpcError::parse_error())
    }

    /// The raw envelope value, as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The `jsonrpc` protocol tag, if present and a string.
    pub fn jsonrpc(&self) -> Option<&str> {
        self.raw.get("jsonrpc").and_then(Value::as_str)
    }

    /// Whether the protocol tag is exactly "2.0".
    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc() == Some(JSONRPC_VERSION)
    }

    /// The method name, if present and a string.
    pub fn method(&self) -> Option<&str> {
        self.raw.get("method").and_then(Value::as_str)
    }

    /// The params object. Missing or non-object params yield an empty map.
    pub fn params(&self) -> Map<String, Value> {
        self.raw
            .get("params")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// The request id, if the `id` key is present. `Some(Value::Null)`
    /// for `"id": null`, which still counts as a request.
    pub fn id(&self) -> Option<&Value> {
        self.raw.get("id")
    }

    /// Classification: no `id` key at all means notification.
    pub fn is_notification(&self) -> bool {
        self.id().is_none()
    }

    /// The id to echo in a response, `null` when the key was absent.
    pub fn response_id(&self) -> Value {
        self.id().cloned().unwrap_or(Value::Null)
    }
}

/// JSON-RPC wire error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code from the reserved range
    pub code: i32,
    /// Human-readable error message
    pub message: String,
}

impl RpcError {
    /// Create an error with an explicit code
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error() -> Self {
        Self::new(error_codes::PARSE_ERROR, "Parse error")
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, message)
    }

    /// Create a method not found error
    pub fn method_not_found(method: impl Display) -> Self {
        Self::new(
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    /// Create an invalid parameters error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }

    /// Create an internal error
    pub fn internal_error(message: impl Display) -> Self {
        Self::new(
            error_codes::INTERNAL_ERROR,
            format!("Internal error: {message}"),
        )
    }
}

impl Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// Outcome of dispatching one envelope: exactly one of result or error.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Success(Value),
    Failure(RpcError),
}

impl RpcOutcome {
    /// Whether dispatch produced an error
    pub fn is_failure(&self) -> bool {
        matches!(self, RpcOutcome::Failure(_))
    }

    /// Wrap the outcome into a response envelope carrying `id`.
    pub fn into_response(self, id: Value) -> RpcResponse {
        match self {
            RpcOutcome::Success(result) => RpcResponse::success(id, result),
            RpcOutcome::Failure(error) => RpcResponse::error(id, error),
        }
    }
}

/// JSON-RPC response envelope.
///
/// Carries either `result` or `error`, never both. The `id` echoes the
/// request id with its type preserved (`null` included).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Serialize to a compact JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_with_id_is_not_notification() {
        let envelope =
            RpcEnvelope::parse(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#).unwrap();
        assert!(!envelope.is_notification());
        assert_eq!(envelope.response_id(), json!(1));
    }

    #[test]
    fn null_id_is_still_a_request() {
        let envelope =
            RpcEnvelope::parse(r#"{"jsonrpc":"2.0","method":"ping","id":null}"#).unwrap();
        assert!(!envelope.is_notification());
        assert_eq!(envelope.response_id(), Value::Null);
    }

    #[test]
    fn absent_id_is_a_notification() {
        let envelope =
            RpcEnvelope::parse(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(envelope.is_notification());
        assert_eq!(envelope.response_id(), Value::Null);
    }

    #[test]
    fn string_id_type_is_preserved() {
        let envelope =
            RpcEnvelope::parse(r#"{"jsonrpc":"2.0","method":"ping","id":"abc-1"}"#).unwrap();
        assert_eq!(envelope.response_id(), json!("abc-1"));
    }

    #[test]
    fn malformed_body_yields_parse_error() {
        let err = RpcEnvelope::parse("{not json").unwrap_err();
        assert_eq!(err.code, error_codes::PARSE_ERROR);
    }

    #[test]
    fn version_tag_must_match_exactly() {
        let envelope =
            RpcEnvelope::parse(r#"{"jsonrpc":"1.0","method":"ping","id":9}"#).unwrap();
        assert!(!envelope.has_valid_version());

        let missing = RpcEnvelope::parse(r#"{"method":"ping","id":9}"#).unwrap();
        assert!(!missing.has_valid_version());
    }

    #[test]
    fn method_and_id_may_both_be_absent() {
        let envelope = RpcEnvelope::parse(r#"{"jsonrpc":"2.0"}"#).unwrap();
        assert_eq!(envelope.method(), None);
        assert!(envelope.is_notification());
    }

    #[test]
    fn response_never_carries_both_result_and_error() {
        let ok = RpcResponse::success(json!(1), json!({}));
        assert!(ok.result.is_some() && ok.error.is_none());

        let err = RpcResponse::error(json!(1), RpcError::method_not_found("nope"));
        assert!(err.result.is_none() && err.error.is_some());
    }

    #[test]
    fn response_serialization_round_trips() {
        let response = RpcResponse::success(json!("req-7"), json!({"tools": []}));
        let text = response.to_json().unwrap();
        let parsed: RpcResponse = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.jsonrpc, JSONRPC_VERSION);
        assert_eq!(parsed.id, json!("req-7"));
        assert_eq!(parsed.result, Some(json!({"tools": []})));
        assert!(parsed.error.is_none());
    }

    #[test]
    fn error_response_round_trips() {
        let response = RpcResponse::error(Value::Null, RpcError::parse_error());
        let text = response.to_json().unwrap();
        let parsed: RpcResponse = serde_json::from_str(&text).unwrap();

        let error = parsed.error.unwrap();
        assert_eq!(error.code, error_codes::PARSE_ERROR);
        assert_eq!(error.message, "Parse error");
    }
}
