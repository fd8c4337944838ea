//! MCP server lifecycle and main loop.
//!
//! One server instance serves one session:
//!
//! 1. **Handshake**: `initialize` negotiates the protocol version and
//!    advertises the registered tools
//! 2. **Operation**: `tools/list` discovery and concurrent `tools/call`
//!    dispatch
//! 3. **Shutdown**: transport EOF, SIGINT/SIGTERM, or Ctrl+C
//!
//! # Concurrency
//!
//! Each `tools/call` runs as its own task, so a slow upstream request never
//! blocks other calls; replies go out in completion order, correlated by
//! request id. All outbound traffic funnels through a channel into a single
//! writer task, which keeps frames intact and makes writes after transport
//! close a silent no-op.

use std::io;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, Stdin, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::mcp::dispatch::Dispatcher;
use crate::mcp::protocol::{
    decode_message, ErrorCode, ErrorResponse, Incoming, InitializeParams, Notification, Request,
    Response, ToolCallParams, ToolCallResult, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{MessageReader, MessageWriter};
use crate::tools::ToolRegistry;

/// Session state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No handshake yet; only `initialize` is accepted.
    Uninitialized,
    /// Handshake done; tool discovery and calls are accepted.
    Ready,
    /// Transport gone or shutdown requested; nothing is processed.
    Closed,
}

/// Server identity reported in the `initialize` response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A message queued for the writer task.
enum Outbound {
    Response(Response),
    Error(ErrorResponse),
}

/// The MCP weather tool server for one client connection.
pub struct McpServer<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
    registry: Arc<ToolRegistry>,
}

impl McpServer<BufReader<Stdin>, Stdout> {
    /// Creates a server over the process's standard streams.
    #[must_use]
    pub fn stdio(registry: Arc<ToolRegistry>) -> Self {
        let (reader, writer) = crate::mcp::transport::stdio();
        Self::new(registry, reader, writer)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Creates a server over an arbitrary transport pair.
    pub const fn new(
        registry: Arc<ToolRegistry>,
        reader: MessageReader<R>,
        writer: MessageWriter<W>,
    ) -> Self {
        Self {
            reader,
            writer,
            registry,
        }
    }

    /// Runs the session to completion.
    ///
    /// Returns when the transport reaches end-of-stream or a shutdown
    /// signal arrives. In-flight tool calls are cancelled best-effort on
    /// the way out; their unwritten replies are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(self) -> io::Result<()> {
        let Self {
            reader,
            writer,
            registry,
        } = self;

        let (outbound, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_loop(writer, rx));

        let mut session = Session {
            state: SessionState::Uninitialized,
            reader,
            outbound,
            dispatcher: Dispatcher::new(registry),
            calls: JoinSet::new(),
        };

        let result = session.serve().await;
        session.close();

        // Dropping the session drops the last sender; the writer task
        // drains what was already queued, then exits.
        drop(session);
        let _ = writer_task.await;

        result
    }
}

/// One client connection's protocol lifecycle.
struct Session<R> {
    state: SessionState,
    reader: MessageReader<R>,
    outbound: mpsc::UnboundedSender<Outbound>,
    dispatcher: Dispatcher,
    calls: JoinSet<()>,
}

impl<R: AsyncBufRead + Unpin> Session<R> {
    /// Reads and handles messages until EOF or a shutdown signal.
    #[cfg(unix)]
    async fn serve(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    return Ok(());
                }

                // Reap finished call tasks; their replies already went
                // through the outbound channel.
                Some(_) = self.calls.join_next(), if !self.calls.is_empty() => {}

                line = self.reader.read_message() => {
                    if self.handle_transport_event(line?) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Reads and handles messages until EOF or Ctrl+C.
    #[cfg(windows)]
    async fn serve(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    return Ok(());
                }

                Some(_) = self.calls.join_next(), if !self.calls.is_empty() => {}

                line = self.reader.read_message() => {
                    if self.handle_transport_event(line?) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles one transport read. Returns `true` when the session is over.
    fn handle_transport_event(&mut self, line: Option<String>) -> bool {
        let Some(line) = line else {
            tracing::info!("Transport closed by client");
            return true;
        };

        if !line.trim().is_empty() {
            self.handle_line(&line);
        }

        false
    }

    /// Decodes and routes a single line of input.
    ///
    /// Decode failures get an error reply (correlated when the request id
    /// survived decoding) and the session carries on; only stream-level
    /// failures end it.
    fn handle_line(&mut self, line: &str) {
        match decode_message(line) {
            Ok(Incoming::Request(req)) => self.handle_request(req),
            Ok(Incoming::Notification(notif)) => Self::handle_notification(&notif),
            Err(error) => self.send(Outbound::Error(error)),
        }
    }

    /// Routes a request by method, gated on session state.
    fn handle_request(&mut self, req: Request) {
        match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req),
            "ping" => self.send(Outbound::Response(Response::success(
                req.id.clone(),
                json!({}),
            ))),
            _ => self.send(Outbound::Error(ErrorResponse::method_not_found(
                req.id.clone(),
                &req.method,
            ))),
        }
    }

    /// Notifications are acknowledged by doing nothing.
    fn handle_notification(notif: &Notification) {
        tracing::debug!(method = %notif.method, "notification received");
    }

    /// Handles the `initialize` handshake request.
    fn handle_initialize(&mut self, req: &Request) {
        if self.state != SessionState::Uninitialized {
            self.send(Outbound::Error(ErrorResponse::with_message(
                Some(req.id.clone()),
                ErrorCode::InvalidRequest,
                "Server already initialised",
            )));
            return;
        }

        let params: InitializeParams = match req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
        {
            Ok(Some(params)) => params,
            Ok(None) => {
                self.send(Outbound::Error(ErrorResponse::invalid_params(
                    req.id.clone(),
                    "Missing initialize params",
                )));
                return;
            }
            Err(e) => {
                self.send(Outbound::Error(ErrorResponse::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )));
                return;
            }
        };

        tracing::info!(
            client_version = %params.protocol_version,
            "session initialised"
        );
        self.state = SessionState::Ready;

        // The tool list rides along with the handshake so a client can
        // start calling without a discovery round-trip.
        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": ServerInfo::default(),
            "tools": self.dispatcher.registry().descriptors(),
        });

        self.send(Outbound::Response(Response::success(
            req.id.clone(),
            result,
        )));
    }

    /// Handles the `tools/list` discovery request.
    fn handle_tools_list(&mut self, req: &Request) {
        if self.state != SessionState::Ready {
            self.send(Outbound::Error(ErrorResponse::not_initialized(
                req.id.clone(),
            )));
            return;
        }

        let result = json!({
            "tools": self.dispatcher.registry().descriptors(),
        });

        self.send(Outbound::Response(Response::success(
            req.id.clone(),
            result,
        )));
    }

    /// Handles a `tools/call` request by spawning an independent task.
    fn handle_tools_call(&mut self, req: &Request) {
        if self.state != SessionState::Ready {
            self.send(Outbound::Error(ErrorResponse::not_initialized(
                req.id.clone(),
            )));
            return;
        }

        let params: ToolCallParams = match req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
        {
            Ok(Some(params)) => params,
            Ok(None) => {
                self.send(Outbound::Error(ErrorResponse::invalid_params(
                    req.id.clone(),
                    "Missing tool call params",
                )));
                return;
            }
            Err(e) => {
                self.send(Outbound::Error(ErrorResponse::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )));
                return;
            }
        };

        let dispatcher = self.dispatcher.clone();
        let outbound = self.outbound.clone();
        let id = req.id.clone();

        self.calls.spawn(async move {
            let result = dispatcher.handle_call(params).await;
            let payload = serde_json::to_value(&result).unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to serialise tool call result");
                serde_json::to_value(ToolCallResult::error("internal serialisation failure"))
                    .unwrap_or_default()
            });

            if outbound
                .send(Outbound::Response(Response::success(id, payload)))
                .is_err()
            {
                tracing::debug!("transport closed before tool result could be written");
            }
        });
    }

    /// Moves to `Closed` and best-effort cancels in-flight calls.
    fn close(&mut self) {
        self.state = SessionState::Closed;
        self.calls.abort_all();
    }

    /// Queues a message for the writer task. A send failure means the
    /// transport already closed; the message is discarded.
    fn send(&mut self, message: Outbound) {
        if self.outbound.send(message).is_err() {
            tracing::debug!("outbound channel closed, message discarded");
        }
    }
}

/// Drains the outbound channel into the transport until all senders drop.
async fn write_loop<W: AsyncWrite + Unpin>(
    mut writer: MessageWriter<W>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    while let Some(message) = rx.recv().await {
        let result = match &message {
            Outbound::Response(response) => writer.write_response(response).await,
            Outbound::Error(error) => writer.write_error(error).await,
        };

        if let Err(e) = result {
            // Broken pipe: stop writing, let queued replies evaporate.
            tracing::debug!(error = %e, "transport write failed, dropping outbound queue");
            rx.close();
            return;
        }
    }
}
