//! Tool routing errors.

use thiserror::Error;

/// Errors raised while routing a tool call by name.
///
/// A tool that runs and fails is not an error here: it answers with a failed
/// result envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// The envelope could not be turned into an MCP result.
    #[error("Could not encode tool result: {0}")]
    Encoding(String),
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}
