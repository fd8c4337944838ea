//! JSON-RPC 2.0 message types for the MCP protocol.
//!
//! Everything on the wire is a newline-delimited JSON-RPC 2.0 message:
//!
//! - **Request**: carries an `id` and expects exactly one response
//! - **Notification**: no `id`, never answered
//! - **Response**: success (`result`) or error (`error`), correlated by `id`
//!
//! Per MCP, request ids are strings or integers, never `null`, and must be
//! unique within a session.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name advertised during initialisation.
pub const SERVER_NAME: &str = "openweather-mcp";

/// A JSON-RPC 2.0 request ID.
///
/// Per the MCP specification, IDs must be strings or integers, never `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A decoded request: a message with an `id` that expects a reply.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request identifier.
    pub id: RequestId,
    /// The method to invoke, e.g. `tools/call`.
    pub method: String,
    /// Method parameters, if any.
    pub params: Option<Value>,
}

/// A decoded notification: a one-way message without an `id`.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The notification method, e.g. `notifications/initialized`.
    pub method: String,
    /// Notification parameters, if any.
    pub params: Option<Value>,
}

/// An incoming message, classified by the presence of an `id` field.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// A request expecting a response.
    Request(Request),
    /// A notification (no response expected).
    Notification(Notification),
}

/// Raw envelope used to classify incoming lines before validation.
#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

/// Decodes one framed line into a request or notification.
///
/// # Errors
///
/// Returns an [`ErrorResponse`] describing the decode failure. The error
/// carries the request id when one could be recovered from the envelope,
/// so the caller can correlate the reply; otherwise its id is absent.
pub fn decode_message(line: &str) -> Result<Incoming, ErrorResponse> {
    let raw: RawMessage =
        serde_json::from_str(line).map_err(|_| ErrorResponse::parse_error())?;

    // The id survives envelope validation failures below, so malformed
    // requests still get a correlated reply.
    let id = raw.id;

    if raw.jsonrpc.as_deref() != Some("2.0") {
        return Err(ErrorResponse::invalid_request(id));
    }

    let method = match raw.method {
        Some(m) if !m.is_empty() => m,
        _ => return Err(ErrorResponse::invalid_request(id)),
    };

    Ok(match id {
        Some(id) => Incoming::Request(Request {
            id,
            method,
            params: raw.params,
        }),
        None => Incoming::Notification(Notification {
            method,
            params: raw.params,
        }),
    })
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// The request ID this response corresponds to.
    pub id: RequestId,
    /// The result of the method call.
    pub result: Value,
}

impl Response {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    ParseError,
    /// The JSON sent is not a valid Request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Returns the default message for this error code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// The `error` member of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// The numeric JSON-RPC error code.
    pub code: i32,
    /// A short description of the error.
    pub message: String,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// The request ID this error corresponds to. Serialised as an explicit
    /// `null` when the ID could not be recovered, per JSON-RPC 2.0.
    pub id: Option<RequestId>,
    /// The error details.
    pub error: ErrorDetail,
}

impl ErrorResponse {
    /// Creates an error response with the code's default message.
    #[must_use]
    pub fn from_code(id: Option<RequestId>, code: ErrorCode) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: ErrorDetail {
                code: code.code(),
                message: code.default_message().to_string(),
            },
        }
    }

    /// Creates an error response with a custom message.
    #[must_use]
    pub fn with_message(
        id: Option<RequestId>,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: ErrorDetail {
                code: code.code(),
                message: message.into(),
            },
        }
    }

    /// Creates a parse error response (ID cannot be determined).
    #[must_use]
    pub fn parse_error() -> Self {
        Self::from_code(None, ErrorCode::ParseError)
    }

    /// Creates an invalid request error response.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::from_code(id, ErrorCode::InvalidRequest)
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::with_message(
            Some(id),
            ErrorCode::MethodNotFound,
            format!("Method not found: {method}"),
        )
    }

    /// Creates an invalid params error response.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::with_message(Some(id), ErrorCode::InvalidParams, message)
    }

    /// Creates a "not initialised" rejection for requests that arrive
    /// before the handshake has completed.
    #[must_use]
    pub fn not_initialized(id: RequestId) -> Self {
        Self::with_message(Some(id), ErrorCode::InvalidRequest, "Server not initialised")
    }
}

/// A tool advertised to clients during discovery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for the `initialize` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by the client.
    pub protocol_version: String,
    /// Client capabilities (opaque to this server).
    #[serde(default)]
    pub capabilities: Value,
    /// Client name/version, if provided.
    #[serde(default)]
    pub client_info: Option<Value>,
}

/// Parameters for the `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Result of a tool call, as placed in the response `result` member.
///
/// `content` is the tool's payload verbatim: on success the upstream JSON
/// object untouched, on failure a string describing what went wrong. The
/// server never interprets upstream semantic errors; those travel through
/// as ordinary success content for the caller to inspect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Payload returned by the tool.
    pub content: Value,
    /// Whether the invocation failed before producing a payload.
    pub is_error: bool,
}

impl ToolCallResult {
    /// Wraps a handler payload as a successful result.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(content: Value) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    /// Creates a failed result carrying a diagnostic message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: Value::String(message.into()),
            is_error: true,
        }
    }
}
