//! Result envelope returned by every tool.
//!
//! Whatever happens during a tool call (bad arguments, Anki closed, a
//! deck that does not exist) the caller receives exactly one
//! [`ResultEnvelope`]. Raw AnkiConnect outcomes are folded into it by
//! [`ResultEnvelope::normalize`], which classifies remote error strings into
//! a coarse [`ErrorKind`].

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::core::anki_connect::{AnkiConnectError, AnkiConnectResult};

/// Substrings AnkiConnect uses for missing decks, notes, models and cards.
const NOT_FOUND_MARKERS: &[&str] = &["not found", "does not exist", "no such"];

/// Substrings AnkiConnect uses for rejected duplicates.
const DUPLICATE_MARKERS: &[&str] = &["duplicate", "already exists"];

/// Coarse classification of a failed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller's arguments were rejected before contacting Anki.
    Validation,
    /// AnkiConnect could not be reached.
    Connection,
    /// AnkiConnect did not answer in time.
    Timeout,
    /// Anki reported a missing deck, note, card or note type.
    NotFound,
    /// Anki refused a duplicate.
    Duplicate,
    /// Any other error reported by Anki.
    Remote,
    /// AnkiConnect answered with something that could not be understood.
    Protocol,
}

impl ErrorKind {
    /// Classify an error message reported by AnkiConnect.
    pub fn classify_remote(message: &str) -> Self {
        let lower = message.to_lowercase();
        if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::NotFound
        } else if DUPLICATE_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::Duplicate
        } else {
            Self::Remote
        }
    }
}

/// Kind and human-readable description of a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Rejected caller input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Something the caller referenced does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }
}

impl From<AnkiConnectError> for ErrorDetail {
    fn from(e: AnkiConnectError) -> Self {
        let kind = match &e {
            AnkiConnectError::Connection(_) => ErrorKind::Connection,
            AnkiConnectError::Timeout(_) => ErrorKind::Timeout,
            AnkiConnectError::Http { status } if *status >= 500 => ErrorKind::Connection,
            AnkiConnectError::Http { .. } | AnkiConnectError::InvalidResponse(_) => {
                ErrorKind::Protocol
            }
            AnkiConnectError::Remote(message) => ErrorKind::classify_remote(message),
        };
        Self::new(kind, e.to_string())
    }
}

/// How a tool treats remote errors that mean "already done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Idempotency {
    /// Every remote error is a failure.
    #[default]
    Strict,
    /// The call only ensures something exists; a duplicate is a success.
    EnsureExists,
}

/// Uniform reply of every tool.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ResultEnvelope {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Name of the tool that produced this envelope.
    pub action: String,

    /// Human-readable summary.
    pub message: String,

    /// Structured payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,

    /// Caller inputs echoed back for convenience.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub echo: Map<String, Value>,

    /// Longer text rendering appended to the summary for display.
    #[serde(skip)]
    pub rendered: Option<String>,
}

impl ResultEnvelope {
    /// A successful envelope without payload.
    pub fn ok(action: &str, message: impl Into<String>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            message: message.into(),
            data: None,
            error: None,
            echo: Map::new(),
            rendered: None,
        }
    }

    /// A failed envelope.
    pub fn failure(action: &str, error: ErrorDetail) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            message: format!("{} failed: {}", action, error.message),
            data: None,
            error: Some(error),
            echo: Map::new(),
            rendered: None,
        }
    }

    /// Fold a raw AnkiConnect outcome into an envelope.
    pub fn normalize(action: &str, raw: AnkiConnectResult<Value>) -> Self {
        Self::normalize_with(action, raw, Idempotency::Strict)
    }

    /// Fold a raw AnkiConnect outcome into an envelope, honoring `idempotency`.
    pub fn normalize_with(
        action: &str,
        raw: AnkiConnectResult<Value>,
        idempotency: Idempotency,
    ) -> Self {
        match raw {
            Ok(value) => Self::ok(action, format!("{} completed successfully", action))
                .with_value(value),
            Err(e) => {
                let detail = ErrorDetail::from(e);
                if detail.kind == ErrorKind::Duplicate && idempotency == Idempotency::EnsureExists
                {
                    Self::ok(action, format!("{} completed (already existed)", action))
                        .with_echo("already_existed", true)
                } else {
                    Self::failure(action, detail)
                }
            }
        }
    }

    /// Attach a structured payload.
    pub fn with_data<T: Serialize>(self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.with_value(value),
            Err(e) => {
                warn!("Failed to serialize payload for {}: {}", self.action, e);
                self
            }
        }
    }

    /// Attach an already-built JSON payload.
    pub fn with_value(mut self, value: Value) -> Self {
        self.data = Some(value);
        self
    }

    /// Echo a caller input back.
    pub fn with_echo(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.echo.insert(key.to_string(), value.into());
        self
    }

    /// Replace the summary message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a longer text rendering.
    pub fn with_rendered(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.rendered = Some(text);
        }
        self
    }

    /// Error kind, if this envelope is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Text shown to the MCP client.
    pub fn text(&self) -> String {
        if !self.success {
            return format!("Error: {}", self.message);
        }
        match &self.rendered {
            Some(body) => format!("{}\n\n{}", self.message, body),
            None => self.message.clone(),
        }
    }
}

impl From<ResultEnvelope> for CallToolResult {
    fn from(envelope: ResultEnvelope) -> Self {
        let text = envelope.text();
        let is_error = !envelope.success;
        let structured = match serde_json::to_value(&envelope) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to serialize envelope for {}: {}", envelope.action, e);
                None
            }
        };

        CallToolResult {
            content: vec![Content::text(text)],
            structured_content: structured,
            is_error: Some(is_error),
            meta: None,
        }
    }
}
