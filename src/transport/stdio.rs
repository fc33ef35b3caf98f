//! Stdio transport: line-delimited JSON over stdin/stdout
//!
//! Each JSON-RPC message is a single line terminated by `\n`, one
//! process per session. The reader/writer pair is generic so the server
//! loop can be exercised against in-memory buffers. Logging goes to
//! stderr; stdout carries only protocol frames.

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, trace, warn};

use crate::error::AppResult;
use crate::rpc::{RpcDispatcher, RpcEnvelope, RpcError, RpcOutcome, RpcResponse, SessionState};

/// Line-delimited message framing over an arbitrary reader/writer pair.
pub struct StdioTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a new transport over the given reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Read the next line; `None` on EOF (channel closed).
    pub async fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Ok(None);
        }

        let trimmed = line.trim().to_string();
        trace!(len = trimmed.len(), "read message");
        Ok(Some(trimmed))
    }

    /// Write one message line and flush so the peer sees it immediately.
    pub async fn write_line(&mut self, message: &str) -> AppResult<()> {
        trace!(len = message.len(), "writing message");
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Server loop for the stream transport.
///
/// Owns the per-connection [`SessionState`] and processes messages
/// sequentially until EOF. The loop holds no resources beyond the
/// transport itself, so cancelling the `run` future (process shutdown)
/// releases the channel on every exit path.
pub struct StdioServer<R, W> {
    transport: StdioTransport<R, W>,
    dispatcher: Arc<RpcDispatcher>,
    session: SessionState,
}

impl<R, W> StdioServer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a server over the given transport and shared dispatcher.
    pub fn new(transport: StdioTransport<R, W>, dispatcher: Arc<RpcDispatcher>) -> Self {
        Self {
            transport,
            dispatcher,
            session: SessionState::new(),
        }
    }

    /// Run until the input channel closes.
    ///
    /// Requests always receive exactly one response with their id;
    /// notifications receive one only when dispatch failed (id null);
    /// unparseable lines receive a `-32700` error (id null).
    pub async fn run(&mut self) -> AppResult<()> {
        info!("MCP server starting on stdio");

        loop {
            let line = match self.transport.read_line().await? {
                Some(line) if line.is_empty() => continue,
                Some(line) => line,
                None => {
                    info!("stdin closed, shutting down");
                    return Ok(());
                }
            };

            let envelope = match RpcEnvelope::parse(&line) {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!("failed to parse JSON-RPC message");
                    self.write_response(&RpcResponse::error(Value::Null, err))
                        .await?;
                    continue;
                }
            };

            debug!(method = ?envelope.method(), id = ?envelope.id(), "received message");

            let outcome = if envelope.has_valid_version() {
                self.dispatcher
                    .dispatch(&envelope, &mut self.session)
                    .await
            } else {
                RpcOutcome::Failure(RpcError::invalid_request(
                    "Invalid Request - JSON-RPC version must be 2.0",
                ))
            };

            if envelope.is_notification() {
                // Notifications must not receive a response unless
                // dispatch produced an error.
                if let RpcOutcome::Failure(err) = outcome {
                    self.write_response(&RpcResponse::error(Value::Null, err))
                        .await?;
                }
                continue;
            }

            self.write_response(&outcome.into_response(envelope.response_id()))
                .await?;
        }
    }

    async fn write_response(&mut self, response: &RpcResponse) -> AppResult<()> {
        let json = response.to_json()?;
        self.transport.write_line(&json).await
    }
}
