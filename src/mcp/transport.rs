//! Newline-delimited stdio transport for the MCP server.
//!
//! Messages are UTF-8 encoded JSON-RPC, one per line, and must not contain
//! embedded newlines. stdin carries client messages, stdout carries server
//! replies; stderr is reserved for logging so it can never corrupt the
//! framed protocol stream.
//!
//! The transport is split into a read half and a write half because replies
//! to concurrent tool calls are produced by independent tasks: the server
//! funnels them through a channel into a single task owning the
//! [`MessageWriter`], so interleaved writes cannot tear a frame.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::mcp::protocol::{ErrorResponse, Response};

/// The read half of a transport: yields one framed message per call.
pub struct MessageReader<R> {
    reader: R,
}

impl MessageReader<BufReader<Stdin>> {
    /// Creates a reader over the process's standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    /// Wraps an arbitrary buffered byte stream.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next message line.
    ///
    /// Returns `None` at end of stream; the session is over at that point.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub async fn read_message(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // EOF, the client hung up
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }
}

/// The write half of a transport: frames and flushes one message per call.
pub struct MessageWriter<W> {
    writer: W,
}

impl MessageWriter<Stdout> {
    /// Creates a writer over the process's standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    /// Wraps an arbitrary byte sink.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a success response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &Response) -> io::Result<()> {
        let json = serde_json::to_string(response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes an error response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_error(&mut self, error: &ErrorResponse) -> io::Result<()> {
        let json = serde_json::to_string(error)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        // MCP spec: messages must not contain embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}

/// Creates the stdio transport pair used by the deployed server.
#[must_use]
pub fn stdio() -> (MessageReader<BufReader<Stdin>>, MessageWriter<Stdout>) {
    (MessageReader::stdin(), MessageWriter::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::RequestId;

    #[tokio::test]
    async fn read_strips_line_endings() {
        let input: &[u8] = b"{\"a\":1}\r\n{\"b\":2}\n";
        let mut reader = MessageReader::new(BufReader::new(input));

        assert_eq!(reader.read_message().await.unwrap().unwrap(), r#"{"a":1}"#);
        assert_eq!(reader.read_message().await.unwrap().unwrap(), r#"{"b":2}"#);
        assert!(reader.read_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_appends_newline() {
        let mut buf = Vec::new();
        {
            let mut writer = MessageWriter::new(&mut buf);
            let response = Response::success(RequestId::Number(7), serde_json::json!({"ok": true}));
            writer.write_response(&response).await.unwrap();
        }

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
    }

    #[tokio::test]
    async fn serialised_messages_have_no_embedded_newlines() {
        let response = Response::success(
            RequestId::Number(1),
            serde_json::json!({
                "message": "hello world",
                "nested": {"key": "value"}
            }),
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains('\n'));

        let error = ErrorResponse::method_not_found(RequestId::Number(1), "test/method");
        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains('\n'));
    }
}
