//! Integration tests for the HTTP JSON-RPC transport.

use async_trait::async_trait;
use axum::body::Body;
use http::Request;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use ise_mcp::catalog::ToolCatalog;
use ise_mcp::rpc::RpcDispatcher;
use ise_mcp::transport::{build_router, AppState};
use ise_mcp::upstream::{MarketDataGateway, UpstreamError};

/// Gateway stub returning a fixed payload for every endpoint.
struct StubGateway {
    payload: Value,
}

#[async_trait]
impl MarketDataGateway for StubGateway {
    async fn fetch(
        &self,
        _endpoint: &str,
        _query: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        Ok(self.payload.clone())
    }
}

/// Gateway stub that always fails.
struct FailingGateway;

#[async_trait]
impl MarketDataGateway for FailingGateway {
    async fn fetch(
        &self,
        _endpoint: &str,
        _query: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        Err(UpstreamError::BaseUrl(url::ParseError::EmptyHost))
    }
}

fn router_with(gateway: impl MarketDataGateway + 'static) -> axum::Router {
    let state = AppState {
        dispatcher: Arc::new(RpcDispatcher::new(
            Arc::new(ToolCatalog::new()),
            Arc::new(gateway),
        )),
    };
    build_router(state)
}

fn router() -> axum::Router {
    router_with(StubGateway { payload: json!({}) })
}

fn post_jsonrpc(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/jsonrpc")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn tools_list_returns_the_catalog() {
    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);

    let tools = body["result"]["tools"].as_array().expect("tools array");
    assert!(tools.len() >= 14);
    assert!(tools.iter().any(|t| t["name"] == "get_stock_data"));

    for tool in tools {
        let mut keys: Vec<&str> = tool
            .as_object()
            .expect("tool object")
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, ["description", "inputSchema", "name"]);
    }
}

#[tokio::test]
async fn tools_call_formats_the_stub_payload() {
    let app = router_with(StubGateway {
        payload: json!({"price": 100}),
    });
    let response = app
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"tools/call",
                "params":{"name":"get_stock_data","arguments":{"name":"Reliance"}},"id":2}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["id"], 2);
    assert_eq!(
        body["result"],
        json!({"content": [{
            "type": "text",
            "text": "Stock Data for Reliance:\n\n{\n  \"price\": 100\n}"
        }]})
    );
}

#[tokio::test]
async fn upstream_failure_is_a_successful_tool_result() {
    let app = router_with(FailingGateway);
    let response = app
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"tools/call",
                "params":{"name":"get_trending_stocks"},"id":3}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert!(body.get("error").is_none());
    let text = body["result"]["content"][0]["text"].as_str().expect("text");
    assert!(text.starts_with("Error executing get_trending_stocks:"));
}

#[tokio::test]
async fn initialized_notification_is_accepted_with_empty_body() {
    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 202);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn initialized_ack_with_id_is_still_a_bare_202() {
    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized","id":5}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 202);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn wrong_protocol_version_is_http_200_invalid_request() {
    let response = router()
        .oneshot(post_jsonrpc(r#"{"jsonrpc":"1.0","method":"ping","id":9}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["id"], 9);
    assert_eq!(body["error"]["code"], -32600);
    assert!(body["error"]["message"].as_str().expect("message").contains("2.0"));
}

#[tokio::test]
async fn malformed_body_is_http_400_parse_error() {
    let response = router()
        .oneshot(post_jsonrpc("{not valid json"))
        .await
        .expect("response");
    assert_eq!(response.status(), 400);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn notification_failure_reports_error_with_null_id() {
    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"resources/list"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn successful_notification_is_a_bare_202() {
    let response = router()
        .oneshot(post_jsonrpc(r#"{"jsonrpc":"2.0","method":"ping"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), 202);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn string_and_null_ids_are_echoed_with_type_preserved() {
    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"ping","id":"req-abc"}"#,
        ))
        .await
        .expect("response");
    let body = body_json(response).await;
    assert_eq!(body["id"], "req-abc");

    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","method":"ping","id":null}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn missing_method_mentioning_initialized_is_tolerated() {
    let response = router()
        .oneshot(post_jsonrpc(
            r#"{"jsonrpc":"2.0","id":1,"params":{"state":"initialized"}}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn missing_method_otherwise_is_invalid_request() {
    let response = router()
        .oneshot(post_jsonrpc(r#"{"jsonrpc":"2.0","id":1}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32600);
    assert!(body["error"]["message"]
        .as_str()
        .expect("message")
        .contains("method field is required"));
}

#[tokio::test]
async fn options_preflight_short_circuits() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/jsonrpc")
        .body(Body::empty())
        .expect("request");
    let response = router().oneshot(request).await.expect("response");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    assert_eq!(response.headers()["access-control-max-age"], "86400");
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn every_response_carries_cors_headers() {
    let response = router()
        .oneshot(post_jsonrpc(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#))
        .await
        .expect("response");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = router().oneshot(request).await.expect("response");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn health_reports_server_identity() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = router().oneshot(request).await.expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["server"], "indian-stock-exchange");
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn info_summarizes_the_catalog() {
    for uri in ["/info", "/"] {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = router().oneshot(request).await.expect("response");
        assert_eq!(response.status(), 200);

        let body = body_json(response).await;
        assert_eq!(body["server"], "indian-stock-exchange");
        assert_eq!(body["capabilities"]["tools"], 14);
        let tools = body["tools"].as_array().expect("tools");
        assert_eq!(tools.len(), 14);
        assert!(tools[0].get("inputSchema").is_none());
    }
}
