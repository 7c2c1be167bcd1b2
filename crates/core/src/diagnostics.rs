//! Diagnostic log entries recorded for failed gateway calls.
//!
//! The gateway builds a [`NewApiLog`] for every call-level failure and hands
//! it to a [`DiagnosticSink`]. Sinks are best-effort: the gateway reports a
//! sink error through `tracing` and carries on.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of characters of a response body kept in a log entry.
pub const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Placeholder used for IP and user agent outside an HTTP request.
pub const CLI_ORIGIN: &str = "CLI";

/// Who triggered an outbound call, stamped onto diagnostic entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
    pub client_ip: String,
    pub user_agent: String,
}

impl RequestOrigin {
    pub fn new(client_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Origin for calls made outside any inbound request.
    pub fn cli() -> Self {
        Self::new(CLI_ORIGIN, CLI_ORIGIN)
    }
}

impl Default for RequestOrigin {
    fn default() -> Self {
        Self::cli()
    }
}

/// Input for appending one entry to the diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApiLog {
    pub operation: String,
    pub url: Option<String>,
    pub error_message: String,
    pub response_code: Option<i32>,
    pub response_body_preview: Option<String>,
    pub client_ip: String,
    pub user_agent: String,
}

impl NewApiLog {
    /// Build an entry, truncating the body preview to
    /// [`RESPONSE_PREVIEW_CHARS`] characters.
    pub fn new(
        operation: &str,
        url: Option<&str>,
        error_message: impl Into<String>,
        response_code: Option<u16>,
        response_body: Option<&str>,
        origin: &RequestOrigin,
    ) -> Self {
        Self {
            operation: operation.to_string(),
            url: url.map(str::to_string),
            error_message: error_message.into(),
            response_code: response_code.map(i32::from),
            response_body_preview: response_body
                .filter(|b| !b.is_empty())
                .map(truncate_preview),
            client_ip: origin.client_ip.clone(),
            user_agent: origin.user_agent.clone(),
        }
    }
}

/// Keep the first [`RESPONSE_PREVIEW_CHARS`] characters of a body.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_preview(body: &str) -> String {
    match body.char_indices().nth(RESPONSE_PREVIEW_CHARS) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}

/// Destination for diagnostic entries.
#[async_trait::async_trait]
pub trait DiagnosticSink: Send + Sync {
    async fn record(&self, entry: NewApiLog) -> Result<(), CoreError>;
}

/// Sink that drops every entry. Used where no log table is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

#[async_trait::async_trait]
impl DiagnosticSink for DiscardSink {
    async fn record(&self, _entry: NewApiLog) -> Result<(), CoreError> {
        Ok(())
    }
}
