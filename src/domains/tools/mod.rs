//! Tools domain module.
//!
//! Every Anki operation is exposed as an MCP tool.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations, grouped by subject
//! - `handlers.rs` - The `AnkiTool` trait and the generic dispatch plumbing
//! - `envelope.rs` - The result envelope every tool returns
//! - `batch.rs` - Per-item execution for bulk tools
//! - `router.rs` - Dynamic ToolRouter builder for STDIO/TCP transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//! - `error.rs` - Tool routing errors
//!
//! ## Adding a New Tool
//!
//! 1. Create a file in the matching `definitions/` group
//! 2. Define the params struct and implement `AnkiTool`
//! 3. Export it from the group's `mod.rs` and `definitions/mod.rs`
//! 4. Add a route in `router.rs`
//! 5. Register it in `registry.rs` for HTTP support

pub mod batch;
pub mod definitions;
pub mod envelope;
mod error;
pub mod handlers;
mod registry;
pub mod router;

pub use envelope::{ErrorDetail, ErrorKind, ResultEnvelope};
pub use error::ToolError;
pub use handlers::{AnkiTool, ToolContext};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
