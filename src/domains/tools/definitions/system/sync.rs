//! Collection sync tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SyncParams {}

/// Syncs the local collection with AnkiWeb.
pub struct SyncTool;

#[async_trait]
impl AnkiTool for SyncTool {
    const NAME: &'static str = "anki_sync";
    const DESCRIPTION: &'static str = "Sync the local Anki collection with AnkiWeb.";

    type Params = SyncParams;

    async fn run(ctx: &ToolContext, _params: SyncParams) -> Result<ResultEnvelope, ErrorDetail> {
        let raw = ctx.anki().invoke("sync", Value::Null).await;
        let envelope = ResultEnvelope::normalize(Self::NAME, raw);
        if envelope.success {
            info!("Collection synced");
            Ok(envelope.with_message("Sync completed"))
        } else {
            Ok(envelope)
        }
    }
}
