//! Move notes between decks.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::super::common::{require_ids, require_text};
use super::cards_of_notes;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MoveNotesParams {
    #[schemars(description = "Ids of the notes to move")]
    pub note_ids: Vec<i64>,

    #[schemars(description = "Name of the destination deck (created if missing)")]
    pub target_deck: String,
}

/// Moves every card of the given notes to another deck.
pub struct MoveNotesTool;

#[async_trait]
impl AnkiTool for MoveNotesTool {
    const NAME: &'static str = "anki_move_notes";
    const DESCRIPTION: &'static str = "Move all cards of the given notes to another deck.";

    type Params = MoveNotesParams;

    async fn run(ctx: &ToolContext, params: MoveNotesParams) -> Result<ResultEnvelope, ErrorDetail> {
        require_ids(&params.note_ids, "note_ids")?;
        let target_deck = require_text(&params.target_deck, "target_deck")?;

        let cards = cards_of_notes(ctx, &params.note_ids).await?;
        if cards.is_empty() {
            return Err(ErrorDetail::not_found(
                "no cards found for the given note ids",
            ));
        }

        ctx.anki()
            .invoke("changeDeck", json!({ "cards": cards, "deck": target_deck }))
            .await?;
        info!(
            "Moved {} cards of {} notes to '{}'",
            cards.len(),
            params.note_ids.len(),
            target_deck
        );

        Ok(ResultEnvelope::ok(
            Self::NAME,
            format!(
                "Moved {} notes to '{}'",
                params.note_ids.len(),
                target_deck
            ),
        )
        .with_value(json!({
            "moved_note_ids": params.note_ids,
            "moved_card_count": cards.len(),
            "target_deck": target_deck,
            "count": params.note_ids.len(),
        }))
        .with_echo("target_deck", target_deck))
    }
}
