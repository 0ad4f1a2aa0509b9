//! Deck listing tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Parameters for the deck listing tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DeckListParams {}

/// Structured output of the deck listing.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DeckListResult {
    pub decks: Vec<String>,
    pub count: usize,
}

/// Lists every deck in the collection.
pub struct DeckListTool;

#[async_trait]
impl AnkiTool for DeckListTool {
    const NAME: &'static str = "anki_get_deck_names";
    const DESCRIPTION: &'static str =
        "List the names of all decks in the Anki collection, sorted alphabetically.";

    type Params = DeckListParams;

    async fn run(ctx: &ToolContext, _params: DeckListParams) -> Result<ResultEnvelope, ErrorDetail> {
        let mut decks: Vec<String> = ctx.anki().invoke_as("deckNames", Value::Null).await?;
        decks.sort();
        info!("Found {} decks", decks.len());

        let (message, rendered) = if decks.is_empty() {
            ("No decks found".to_string(), String::new())
        } else {
            (
                format!("Found {} decks:", decks.len()),
                decks
                    .iter()
                    .map(|d| format!("- {}", d))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };

        let result = DeckListResult {
            count: decks.len(),
            decks,
        };

        Ok(ResultEnvelope::ok(Self::NAME, message)
            .with_data(&result)
            .with_rendered(rendered))
    }
}
