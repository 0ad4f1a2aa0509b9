//! Deck browsing tool, a deck-scoped note search.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::super::common::{deck_term, default_limit, require_text};
use super::super::note::find::{find_page, page_envelope};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeckViewParams {
    #[schemars(description = "Name of the deck")]
    pub deck_name: String,

    #[serde(default = "default_limit")]
    #[schemars(description = "Number of notes to show (default 20)")]
    pub limit: usize,

    #[serde(default)]
    #[schemars(description = "Number of notes to skip (default 0)")]
    pub offset: usize,
}

/// Shows the notes of a deck, page by page.
pub struct DeckViewTool;

#[async_trait]
impl AnkiTool for DeckViewTool {
    const NAME: &'static str = "anki_view_deck_contents";
    const DESCRIPTION: &'static str =
        "Show the notes of a deck with their contents. Supports pagination via limit and offset.";

    type Params = DeckViewParams;

    async fn run(ctx: &ToolContext, params: DeckViewParams) -> Result<ResultEnvelope, ErrorDetail> {
        let deck_name = require_text(&params.deck_name, "deck_name")?;
        let query = deck_term(deck_name);
        let page = find_page(ctx, &query, params.limit, params.offset, true).await?;
        Ok(page_envelope(Self::NAME, page).with_echo("deck_name", deck_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::handlers::dispatch;
    use serde_json::json;

    #[tokio::test]
    async fn test_view_uses_deck_query() {
        let (ctx, mock) = test_context(
            MockAnki::new()
                .on("findNotes", json!([11]))
                .on(
                    "notesInfo",
                    json!([{
                        "noteId": 11,
                        "fields": {"Front": {"value": "gato", "order": 0}}
                    }]),
                ),
        );
        let envelope = dispatch::<DeckViewTool>(
            &ctx,
            json!({"deck_name": "Spanish", "limit": 5}),
        )
        .await;

        assert!(envelope.success);
        assert_eq!(
            mock.calls_to("findNotes"),
            vec![json!({"query": "deck:\"Spanish\""})]
        );
        assert!(envelope.text().contains("Front: gato"));
        assert_eq!(envelope.echo["deck_name"], "Spanish");
    }

    #[tokio::test]
    async fn test_view_with_extreme_paging() {
        let (ctx, _) = test_context(MockAnki::new().on("findNotes", json!([1, 2])));
        let envelope = dispatch::<DeckViewTool>(
            &ctx,
            json!({"deck_name": "Spanish", "limit": u64::MAX, "offset": u64::MAX}),
        )
        .await;

        assert!(envelope.success);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["returned_count"], 0);
        assert_eq!(data["has_more"], false);
    }
}
