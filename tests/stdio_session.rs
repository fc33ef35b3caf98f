//! End-to-end session test for the stdio transport, driven over an
//! in-memory duplex pipe.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use ise_mcp::catalog::ToolCatalog;
use ise_mcp::rpc::RpcDispatcher;
use ise_mcp::transport::{StdioServer, StdioTransport};
use ise_mcp::upstream::{MarketDataGateway, UpstreamError};

struct StubGateway;

#[async_trait]
impl MarketDataGateway for StubGateway {
    async fn fetch(
        &self,
        endpoint: &str,
        _query: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        Ok(json!({"endpoint": endpoint}))
    }
}

#[tokio::test]
async fn full_session_over_a_duplex_pipe() {
    let dispatcher = Arc::new(RpcDispatcher::new(
        Arc::new(ToolCatalog::new()),
        Arc::new(StubGateway),
    ));

    let (client, server_io) = tokio::io::duplex(16 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);

    let handle = tokio::spawn(async move {
        let mut server = StdioServer::new(
            StdioTransport::new(server_read, server_write),
            dispatcher,
        );
        server.run().await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut responses = BufReader::new(client_read).lines();

    // Handshake
    client_write
        .write_all(
            b"{\"jsonrpc\":\"2.0\",\"method\":\"initialize\",\"id\":1,\
              \"params\":{\"clientInfo\":{\"name\":\"itest\",\"version\":\"0.1\"}}}\n",
        )
        .await
        .expect("write initialize");
    let line = responses.next_line().await.expect("read").expect("line");
    let response: Value = serde_json::from_str(&line).expect("json");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "indian-stock-exchange");

    // Handshake acknowledgment is silent; the next response must belong
    // to the ping that follows it.
    client_write
        .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n")
        .await
        .expect("write notification");
    client_write
        .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":2}\n")
        .await
        .expect("write ping");
    let line = responses.next_line().await.expect("read").expect("line");
    let response: Value = serde_json::from_str(&line).expect("json");
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"], json!({}));

    // Tool invocation forwards to the gateway and formats the payload
    client_write
        .write_all(
            b"{\"jsonrpc\":\"2.0\",\"method\":\"tools/call\",\"id\":3,\
              \"params\":{\"name\":\"get_trending_stocks\"}}\n",
        )
        .await
        .expect("write tools/call");
    let line = responses.next_line().await.expect("read").expect("line");
    let response: Value = serde_json::from_str(&line).expect("json");
    assert_eq!(response["id"], 3);
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text");
    assert!(text.starts_with("Trending Stocks:\n\n"));
    assert!(text.contains("\"endpoint\": \"/trending\""));

    // Closing the client pipe ends the server loop cleanly
    drop(client_write);
    drop(responses);
    let result = handle.await.expect("join");
    assert!(result.is_ok());
}
