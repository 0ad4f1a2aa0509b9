//! Anki MCP Server Library
//!
//! A Model Context Protocol (MCP) server that lets clients manage Anki decks,
//! notes and study statistics through the AnkiConnect add-on.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the AnkiConnect client, the
//!   server handler and transports
//! - **domains**: business logic
//!   - **tools**: the Anki tools exposed to clients
//!
//! # Example
//!
//! ```rust,no_run
//! use anki_mcp_server::core::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::from_config(config).await?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
