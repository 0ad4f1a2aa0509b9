//! Single note creation tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::super::common::require_text;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddNoteParams {
    #[schemars(description = "Target deck name")]
    pub deck_name: String,

    #[schemars(description = "Front side content")]
    pub front: String,

    #[schemars(description = "Back side content")]
    pub back: String,

    #[serde(default)]
    #[schemars(description = "Note type (defaults to the configured default note type)")]
    pub note_type: Option<String>,

    #[serde(default)]
    #[schemars(description = "Tags to attach to the note")]
    pub tags: Option<Vec<String>>,
}

/// A validated Front/Back note ready to be sent to `addNote`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct NewNote {
    pub deck_name: String,
    pub note_type: String,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
}

impl NewNote {
    /// Validate the caller input; the note type falls back to `default_note_type`.
    pub fn build(
        deck_name: &str,
        front: &str,
        back: &str,
        note_type: Option<&str>,
        tags: Option<&[String]>,
        default_note_type: &str,
    ) -> Result<Self, ErrorDetail> {
        let deck_name = require_text(deck_name, "deck_name")?;
        require_text(front, "front")?;
        require_text(back, "back")?;

        let note_type = note_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(default_note_type);

        Ok(Self {
            deck_name: deck_name.to_string(),
            note_type: note_type.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            tags: tags.map(<[String]>::to_vec).unwrap_or_default(),
        })
    }

    /// `addNote` params.
    pub fn to_params(&self) -> Value {
        json!({
            "note": {
                "deckName": self.deck_name,
                "modelName": self.note_type,
                "fields": { "Front": self.front, "Back": self.back },
                "tags": self.tags,
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AddNoteResult {
    pub note_id: i64,
    #[serde(flatten)]
    pub note: NewNote,
}

/// Adds a Front/Back note to a deck.
pub struct AddNoteTool;

#[async_trait]
impl AnkiTool for AddNoteTool {
    const NAME: &'static str = "anki_add_note";
    const DESCRIPTION: &'static str = "Add a new note with Front and Back fields to a deck.";

    type Params = AddNoteParams;

    async fn run(ctx: &ToolContext, params: AddNoteParams) -> Result<ResultEnvelope, ErrorDetail> {
        let note = NewNote::build(
            &params.deck_name,
            &params.front,
            &params.back,
            params.note_type.as_deref(),
            params.tags.as_deref(),
            &ctx.config.anki.default_note_type,
        )?;

        let note_id: i64 = ctx.anki().invoke_as("addNote", note.to_params()).await?;
        info!("Added note {} to '{}'", note_id, note.deck_name);

        let message = format!("Note added to '{}' with ID {}", note.deck_name, note_id);
        let deck_name = note.deck_name.clone();
        Ok(ResultEnvelope::ok(Self::NAME, message)
            .with_data(&AddNoteResult { note_id, note })
            .with_echo("deck_name", deck_name))
    }
}
