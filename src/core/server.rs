//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. Tool calls are routed to the tool definitions in
//! `domains/tools/definitions/` through a router built at construction time.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::{info, warn};

use super::anki_connect::{AnkiApi, AnkiConnectClient};
use super::config::Config;
use crate::domains::tools::{ToolContext, ToolRegistry, build_tool_router};

/// Instructions advertised to MCP clients.
pub const INSTRUCTIONS: &str = "A server for interacting with Anki through AnkiConnect. \
    Anki must be running with the AnkiConnect add-on installed.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared state handed to every tool.
    tools: Arc<ToolContext>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server whose tools talk to `anki`.
    pub fn new(config: Config, anki: Arc<dyn AnkiApi>) -> Self {
        let config = Arc::new(config);
        let tools = Arc::new(ToolContext::new(config.clone(), anki));

        Self {
            tool_router: build_tool_router::<Self>(tools.clone()),
            config,
            tools,
        }
    }

    /// Create a server backed by a real AnkiConnect client.
    ///
    /// AnkiConnect is checked once; an unreachable Anki is only logged since
    /// it may be started after the server.
    pub async fn from_config(config: Config) -> super::error::Result<Self> {
        let client = AnkiConnectClient::new(&config.anki)?;
        info!("Using AnkiConnect at {}", client.url());
        if client.test_connection().await.is_err() {
            warn!("Continuing without AnkiConnect; start Anki to use the tools");
        }
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                    "outputSchema": t.output_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        ToolRegistry::new(self.tools.clone())
            .call_tool(name, arguments)
            .await
            .map_err(|e| e.to_string())
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use serde_json::json;

    fn server(mock: MockAnki) -> McpServer {
        McpServer::new(Config::default(), Arc::new(mock))
    }

    #[test]
    fn test_server_info_advertises_tools_only() {
        let info = server(MockAnki::new()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "anki-mcp-server");
    }

    #[test]
    fn test_list_tools() {
        let tools = server(MockAnki::new()).list_tools();
        assert_eq!(tools.len(), 21);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[tokio::test]
    async fn test_call_tool() {
        let server = server(MockAnki::new().on("createDeck", json!(1)));
        let result = server
            .call_tool("anki_create_deck", json!({"deck_name": "Spanish"}))
            .await
            .unwrap();
        assert_eq!(result["isError"], false);

        let err = server.call_tool("nope", json!({})).await.unwrap_err();
        assert!(err.contains("nope"));
    }

    #[tokio::test]
    async fn test_from_config_tolerates_missing_anki() {
        let mut config = Config::default();
        // Nothing listens on port 9 locally.
        config.anki.url = "http://127.0.0.1:9".to_string();
        config.anki.max_retries = 1;

        let server = McpServer::from_config(config).await.unwrap();
        assert_eq!(server.name(), "anki-mcp-server");
        assert_eq!(server.list_tools().len(), 21);
    }
}
