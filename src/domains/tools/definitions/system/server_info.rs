//! Server information tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::config::{AnalyticsConfig, AnkiConnectConfig, ServerConfig};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ServerInfoParams {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfoResult {
    pub server: ServerConfig,
    pub anki_connect: AnkiConnectConfig,
    pub analytics: AnalyticsConfig,
    pub anki_connect_status: ConnectionStatus,
    pub anki_connect_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_error: Option<String>,
}

/// Reports the configuration and whether AnkiConnect answers.
pub struct ServerInfoTool;

#[async_trait]
impl AnkiTool for ServerInfoTool {
    const NAME: &'static str = "anki_get_server_info";
    const DESCRIPTION: &'static str =
        "Show the server configuration and the AnkiConnect connection status and version.";

    type Params = ServerInfoParams;

    async fn run(ctx: &ToolContext, _params: ServerInfoParams) -> Result<ResultEnvelope, ErrorDetail> {
        let config = &ctx.config;
        let reply = ctx.anki().invoke_as::<u32>("version", Value::Null).await;

        let (status, version, connection_error) = match reply {
            Ok(v) => (ConnectionStatus::Connected, Some(v), None),
            Err(e) => {
                warn!("AnkiConnect unreachable at {}: {}", config.anki.url, e);
                (ConnectionStatus::Disconnected, None, Some(e.to_string()))
            }
        };

        let message = match version {
            Some(v) => format!(
                "{} v{} connected to AnkiConnect v{} at {}",
                config.server.name, config.server.version, v, config.anki.url
            ),
            None => format!(
                "{} v{}: AnkiConnect at {} is not reachable",
                config.server.name, config.server.version, config.anki.url
            ),
        };

        let result = ServerInfoResult {
            server: config.server.clone(),
            anki_connect: config.anki.clone(),
            analytics: config.analytics,
            anki_connect_status: status,
            anki_connect_version: version,
            connection_error,
        };
        Ok(ResultEnvelope::ok(Self::NAME, message).with_data(&result))
    }
}
