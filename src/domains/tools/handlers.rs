//! Tool handler plumbing shared by every tool definition.
//!
//! A tool implements [`AnkiTool`]: a name, a description, a parameter type
//! and an async `run`. The generic functions here turn that into:
//! - a validated call ([`dispatch`]) that always yields a [`ResultEnvelope`]
//! - tool metadata ([`to_tool`])
//! - an rmcp `ToolRoute` for STDIO/TCP ([`create_route`])
//! - a JSON answer for the HTTP transport ([`call_json`])

use async_trait::async_trait;
use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::envelope::{ErrorDetail, ResultEnvelope};
use crate::core::anki_connect::AnkiApi;
use crate::core::config::Config;

/// Everything a tool needs to run.
#[derive(Clone)]
pub struct ToolContext {
    /// Server configuration.
    pub config: Arc<Config>,

    /// AnkiConnect access.
    pub anki: Arc<dyn AnkiApi>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(config: Arc<Config>, anki: Arc<dyn AnkiApi>) -> Self {
        Self { config, anki }
    }

    /// AnkiConnect access as a trait object.
    pub fn anki(&self) -> &dyn AnkiApi {
        self.anki.as_ref()
    }
}

/// A tool exposed over MCP.
#[async_trait]
pub trait AnkiTool {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Caller-supplied parameters.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    /// Execute the tool. An `Err` becomes a failed envelope.
    async fn run(ctx: &ToolContext, params: Self::Params) -> Result<ResultEnvelope, ErrorDetail>;
}

/// Parse `arguments` and run `T`, always producing an envelope.
#[instrument(skip_all, fields(tool = T::NAME))]
pub async fn dispatch<T: AnkiTool>(ctx: &ToolContext, arguments: Value) -> ResultEnvelope {
    info!("Tool called: {}", T::NAME);

    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };

    let params: T::Params = match serde_json::from_value(arguments) {
        Ok(params) => params,
        Err(e) => {
            warn!("Rejected arguments for {}: {}", T::NAME, e);
            return ResultEnvelope::failure(
                T::NAME,
                ErrorDetail::validation(format!("Invalid arguments: {}", e)),
            );
        }
    };

    match T::run(ctx, params).await {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!("{} failed ({:?}): {}", T::NAME, error.kind, error.message);
            ResultEnvelope::failure(T::NAME, error)
        }
    }
}

/// Create a Tool model for `T` (metadata).
pub fn to_tool<T: AnkiTool>() -> Tool {
    Tool {
        name: T::NAME.into(),
        description: Some(T::DESCRIPTION.into()),
        input_schema: cached_schema_for_type::<T::Params>(),
        annotations: None,
        output_schema: Some(cached_schema_for_type::<ResultEnvelope>()),
        icons: None,
        meta: None,
        title: None,
    }
}

/// Create a ToolRoute for STDIO/TCP transport.
pub fn create_route<S, T>(ctx: Arc<ToolContext>) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
    T: AnkiTool + 'static,
{
    ToolRoute::new_dyn(to_tool::<T>(), move |call: ToolCallContext<'_, S>| {
        let args = call.arguments.clone().unwrap_or_default();
        let ctx = ctx.clone();
        async move {
            let envelope = dispatch::<T>(&ctx, Value::Object(args)).await;
            Ok::<_, McpError>(CallToolResult::from(envelope))
        }
        .boxed()
    })
}

/// Run `T` and serialize the MCP result (for HTTP transport).
pub async fn call_json<T: AnkiTool>(ctx: &ToolContext, arguments: Value) -> Result<Value, String> {
    let result = CallToolResult::from(dispatch::<T>(ctx, arguments).await);
    serde_json::to_value(&result).map_err(|e| e.to_string())
}
