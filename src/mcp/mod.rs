//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the MCP protocol runtime for exposing weather
//! lookups as tools to AI agents. The server communicates over stdio
//! transport using newline-delimited JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! stdin ──▶ MessageReader ──▶ decode ──▶ Session gate ──▶ Dispatcher
//!                                                             │
//!                                              ToolRegistry ◀─┤
//!                                              WeatherApi   ◀─┘
//!                                                             │
//! stdout ◀── MessageWriter ◀── writer task ◀── outbound ◀─────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod dispatch;
pub mod protocol;
pub mod server;
pub mod transport;

pub use dispatch::Dispatcher;
pub use protocol::{ErrorResponse, Request, Response, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, SessionState};
