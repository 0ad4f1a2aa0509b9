//! Due card overview tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::super::common::{deck_filter, format_notes, join_query};
use crate::core::anki_connect::AnkiApi;
use crate::core::anki_connect::types::{CardInfo, NoteInfo};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Cards included in the sample.
const CARD_SAMPLE: usize = 50;

/// Notes rendered from the sample.
const NOTE_SAMPLE: usize = 20;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DueCardsParams {
    #[serde(default)]
    #[schemars(description = "Restrict to this deck (default: all decks)")]
    pub deck_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DueCardsResult {
    pub deck_name: String,
    pub total_due: usize,
    /// New cards waiting in the deck. Anki never reports these as `is:due`.
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub sample_cards: Vec<CardInfo>,
    pub sample_notes: Vec<NoteInfo>,
}

impl DueCardsResult {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("- New: {}", self.new_cards),
            format!("- Learning: {}", self.learning_cards),
            format!("- Review: {}", self.review_cards),
            format!("- Total: {}", self.total_due),
        ];
        if !self.sample_notes.is_empty() {
            lines.push(String::new());
            lines.push("Sample cards:".to_string());
            lines.push(format_notes(&self.sample_notes));
        }
        lines.join("\n")
    }
}

async fn count(anki: &dyn AnkiApi, query: &str) -> Result<usize, ErrorDetail> {
    let ids: Vec<i64> = anki.invoke_as("findCards", json!({ "query": query })).await?;
    Ok(ids.len())
}

/// Counts the cards due now and samples a few of them.
pub struct DueCardsTool;

#[async_trait]
impl AnkiTool for DueCardsTool {
    const NAME: &'static str = "anki_get_due_cards";
    const DESCRIPTION: &'static str = "Get the cards due for review, split into new, learning and \
        review cards, with a sample of their notes.";

    type Params = DueCardsParams;

    async fn run(ctx: &ToolContext, params: DueCardsParams) -> Result<ResultEnvelope, ErrorDetail> {
        let anki = ctx.anki();
        let filter = deck_filter(params.deck_name.as_deref());
        let query = join_query(&[&filter, "is:due"]);

        let due: Vec<i64> = anki.invoke_as("findCards", json!({ "query": query })).await?;

        let mut sample_cards: Vec<CardInfo> = Vec::new();
        let mut sample_notes: Vec<NoteInfo> = Vec::new();
        if !due.is_empty() {
            let sample: Vec<i64> = due.iter().take(CARD_SAMPLE).copied().collect();
            sample_cards = anki
                .invoke_as("cardsInfo", json!({ "cards": sample }))
                .await?;

            let mut note_ids: Vec<i64> = Vec::new();
            for card in &sample_cards {
                if card.note > 0 && !note_ids.contains(&card.note) {
                    note_ids.push(card.note);
                }
            }
            note_ids.truncate(NOTE_SAMPLE);
            if !note_ids.is_empty() {
                sample_notes = anki
                    .invoke_as("notesInfo", json!({ "notes": note_ids }))
                    .await?;
            }
        }

        let result = DueCardsResult {
            deck_name: params
                .deck_name
                .clone()
                .unwrap_or_else(|| "all decks".to_string()),
            total_due: due.len(),
            new_cards: count(anki, &join_query(&[&filter, "is:new"])).await?,
            learning_cards: count(anki, &join_query(&[&query, "is:learn"])).await?,
            review_cards: count(anki, &join_query(&[&query, "is:review"])).await?,
            sample_cards,
            sample_notes,
        };
        info!("{} cards due in {}", result.total_due, result.deck_name);

        Ok(
            ResultEnvelope::ok(Self::NAME, format!("Due cards in {}:", result.deck_name))
                .with_rendered(result.render())
                .with_data(&result),
        )
    }
}
