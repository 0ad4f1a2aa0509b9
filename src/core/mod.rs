//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the MCP server,
//! including error handling, configuration, the AnkiConnect client, server
//! lifecycle management, and transport layer abstractions.

pub mod anki_connect;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use anki_connect::{AnkiApi, AnkiConnectClient, AnkiConnectError};
pub use config::Config;
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
