//! Deck statistics tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

use super::super::common::{deck_term, require_text};
use crate::core::anki_connect::types::DeckStats;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeckStatsParams {
    #[schemars(description = "Name of the deck")]
    pub deck_name: String,
}

/// Structured output of the deck statistics.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DeckStatsResult {
    pub deck_name: String,
    pub stats: DeckStats,
    pub total_notes: usize,
}

impl DeckStatsResult {
    fn render(&self) -> String {
        [
            format!("Total notes: {}", self.total_notes),
            format!("- new_count: {}", self.stats.new_count),
            format!("- learn_count: {}", self.stats.learn_count),
            format!("- review_count: {}", self.stats.review_count),
            format!("- total_in_deck: {}", self.stats.total_in_deck),
        ]
        .join("\n")
    }
}

/// Reports card counters and the note count of one deck.
pub struct DeckStatsTool;

#[async_trait]
impl AnkiTool for DeckStatsTool {
    const NAME: &'static str = "anki_get_deck_stats";
    const DESCRIPTION: &'static str =
        "Get statistics for a deck: new, learning and review card counts plus the number of notes.";

    type Params = DeckStatsParams;

    async fn run(ctx: &ToolContext, params: DeckStatsParams) -> Result<ResultEnvelope, ErrorDetail> {
        let deck_name = require_text(&params.deck_name, "deck_name")?;
        let anki = ctx.anki();

        // Keyed by deck id; the entry carries the deck name.
        let all: HashMap<String, DeckStats> = anki
            .invoke_as("getDeckStats", json!({ "decks": [deck_name] }))
            .await?;
        let stats = all
            .into_values()
            .find(|s| s.name == deck_name)
            .ok_or_else(|| ErrorDetail::not_found(format!("deck was not found: {}", deck_name)))?;

        let note_ids: Vec<i64> = anki
            .invoke_as("findNotes", json!({ "query": deck_term(deck_name) }))
            .await?;

        let result = DeckStatsResult {
            deck_name: deck_name.to_string(),
            stats,
            total_notes: note_ids.len(),
        };
        info!(
            "Deck '{}': {} notes, {} cards",
            deck_name, result.total_notes, result.stats.total_in_deck
        );

        Ok(
            ResultEnvelope::ok(Self::NAME, format!("Stats for deck '{}':", deck_name))
                .with_data(&result)
                .with_rendered(result.render())
                .with_echo("deck_name", deck_name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::envelope::ErrorKind;
    use crate::domains::tools::handlers::dispatch;

    fn stats_reply() -> serde_json::Value {
        json!({
            "1651445861967": {
                "deck_id": 1651445861967i64,
                "name": "Japanese::JLPT N5",
                "new_count": 20,
                "learn_count": 0,
                "review_count": 5,
                "total_in_deck": 1501
            }
        })
    }

    #[tokio::test]
    async fn test_deck_stats() {
        let (ctx, mock) = test_context(
            MockAnki::new()
                .on("getDeckStats", stats_reply())
                .on("findNotes", json!([1, 2, 3])),
        );
        let envelope =
            dispatch::<DeckStatsTool>(&ctx, json!({"deck_name": "Japanese::JLPT N5"})).await;

        assert!(envelope.success);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["total_notes"], 3);
        assert_eq!(data["stats"]["review_count"], 5);
        assert!(envelope.text().contains("- new_count: 20"));
        assert_eq!(
            mock.calls_to("findNotes"),
            vec![json!({"query": "deck:\"Japanese::JLPT N5\""})]
        );
    }

    #[tokio::test]
    async fn test_unknown_deck_is_not_found() {
        let (ctx, _) = test_context(
            MockAnki::new()
                .on("getDeckStats", json!({}))
                .on("findNotes", json!([])),
        );
        let envelope = dispatch::<DeckStatsTool>(&ctx, json!({"deck_name": "Nope"})).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::NotFound));
    }
}
