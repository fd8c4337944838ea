//! openweather-mcp: MCP server exposing OpenWeather lookups as tools
//!
//! This library implements a tool-invocation server over the Model Context
//! Protocol: an AI agent process launches the server as a child, discovers
//! the registered weather tools, and invokes them over a newline-delimited
//! JSON-RPC stdio transport.
//!
//! # Architecture
//!
//! - **Transport**: framed line I/O over stdin/stdout, split read/write
//! - **Codec**: JSON-RPC 2.0 envelope (de)serialisation and classification
//! - **Session**: the `Uninitialized → Ready → Closed` handshake gate
//! - **Dispatcher**: schema-validated, fault-isolated tool invocation
//! - **Registry**: startup-built, registration-ordered tool table
//! - **Upstream**: shared `reqwest` client for the OpenWeather REST API
//!
//! Upstream JSON passes through to the caller verbatim, provider error
//! bodies included; the server only reports transport and invocation
//! errors itself.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol runtime
//! - [`tools`] — Tool trait, registry, and the weather tools
//! - [`upstream`] — Weather provider HTTP client

pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
pub mod upstream;
