//! HTTP transport: one JSON-RPC message per exchange
//!
//! Axum router exposing `POST /jsonrpc` plus liveness and info
//! endpoints. Response emission follows the conventions several MCP
//! HTTP clients expect:
//! - notifications are acknowledged with `202 Accepted` and an empty
//!   body, unless dispatch failed
//! - protocol-level errors ship with HTTP 200; only an unparseable
//!   body is a 400
//! - every response carries permissive cross-origin headers, and
//!   OPTIONS preflights short-circuit before any JSON parsing
//!
//! There is no session continuity here: each exchange dispatches
//! against a fresh [`SessionState`], so `initialize` never gates later
//! calls on this transport.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method as HttpMethod, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::rpc::dispatcher::Method;
use crate::rpc::{RpcDispatcher, RpcEnvelope, RpcError, RpcOutcome, RpcResponse, SessionState};
use crate::{SERVER_NAME, SERVER_VERSION};

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The JSON-RPC dispatcher.
    pub dispatcher: Arc<RpcDispatcher>,
}

/// Build the axum `Router` with all routes and the CORS layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/jsonrpc", post(handle_jsonrpc))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .route("/", get(handle_info))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// The base cross-origin header set applied to every response.
fn base_cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS, PUT, DELETE"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization, x-api-key, x-requested-with"),
    );
    headers
}

/// Extended header set for JSON-RPC responses.
fn rpc_headers() -> HeaderMap {
    let mut headers = base_cors_headers();
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers
}

/// CORS layer: preflights short-circuit with an empty 200 before any
/// body handling; all other responses get the base header set appended.
async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == HttpMethod::OPTIONS {
        let mut headers = base_cors_headers();
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("86400"),
        );
        return (StatusCode::OK, headers).into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in base_cors_headers() {
        if let Some(name) = name {
            headers.insert(name, value);
        }
    }
    response
}

async fn handle_jsonrpc(State(state): State<AppState>, body: String) -> Response {
    let envelope = match RpcEnvelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            error!("JSON parse error in request body");
            return rpc_response(
                StatusCode::BAD_REQUEST,
                RpcResponse::error(Value::Null, err),
            );
        }
    };

    if !envelope.has_valid_version() {
        warn!("Invalid JSON-RPC version: {:?}", envelope.jsonrpc());
        return rpc_response(
            StatusCode::OK,
            RpcResponse::error(
                envelope.response_id(),
                RpcError::invalid_request("Invalid Request - JSON-RPC version must be 2.0"),
            ),
        );
    }

    // No persistent connection here, so handshake state is renegotiated
    // per exchange.
    let mut session = SessionState::new();
    let outcome = state.dispatcher.dispatch(&envelope, &mut session).await;

    // The handshake acknowledgment is always a bare 202, even when a
    // client wrongly attaches an id to it.
    if matches!(
        envelope.method().map(Method::parse),
        Some(Method::NotificationsInitialized)
    ) {
        return accepted();
    }

    match (envelope.is_notification(), outcome) {
        (true, RpcOutcome::Success(_)) => accepted(),
        (true, RpcOutcome::Failure(err)) => {
            rpc_response(StatusCode::OK, RpcResponse::error(Value::Null, err))
        }
        (false, outcome) => rpc_response(
            StatusCode::OK,
            outcome.into_response(envelope.response_id()),
        ),
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "server": SERVER_NAME,
        "version": SERVER_VERSION
    }))
}

async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.dispatcher.catalog();
    let tools: Vec<Value> = catalog
        .descriptors()
        .iter()
        .map(|d| json!({"name": d.name, "description": d.description}))
        .collect();

    Json(json!({
        "server": SERVER_NAME,
        "version": SERVER_VERSION,
        "description": "Indian Stock Exchange MCP Server",
        "capabilities": {
            "tools": catalog.len()
        },
        "tools": tools
    }))
}

fn rpc_response(status: StatusCode, response: RpcResponse) -> Response {
    (status, rpc_headers(), Json(response)).into_response()
}

fn accepted() -> Response {
    (StatusCode::ACCEPTED, rpc_headers()).into_response()
}

/// Axum-based HTTP server for the JSON-RPC transport.
pub struct HttpServer {
    addr: SocketAddr,
    state: AppState,
}

impl HttpServer {
    /// Create a server bound to `host:port` once run.
    pub fn new(dispatcher: Arc<RpcDispatcher>, host: &str, port: u16) -> AppResult<Self> {
        let ip = host
            .parse()
            .map_err(|_| AppError::transport(format!("invalid listen host: {host}")))?;

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            state: AppState { dispatcher },
        })
    }

    /// Start the server and block until shutdown (Ctrl-C).
    ///
    /// A bind failure is fatal and propagates before any request is
    /// served.
    pub async fn run(self) -> AppResult<()> {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            AppError::transport(format!("failed to bind {}: {e}", self.addr))
        })?;

        info!("JSON-RPC endpoint: http://{}/jsonrpc", self.addr);
        info!("Server info: http://{}/info", self.addr);
        info!("Health check: http://{}/health", self.addr);

        let router = build_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::transport(e.to_string()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down server...");
}
