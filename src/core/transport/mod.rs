//! MCP transports.
//!
//! The Anki tools are reachable over three transports, each behind a cargo
//! feature:
//! - `stdio` (default): the standard MCP mode used by desktop clients
//! - `tcp`: one MCP session per TCP connection
//! - `http`: JSON-RPC over HTTP POST, for clients without an MCP SDK
//!
//! Every transport hands requests to the same [`McpServer`](crate::core::McpServer).

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
