//! Note detail tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::super::common::{format_notes, require_ids};
use crate::core::anki_connect::types::NoteInfo;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteInfoParams {
    #[schemars(description = "Ids of the notes to fetch")]
    pub note_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct NoteInfoResult {
    pub notes: Vec<NoteInfo>,
    pub count: usize,
}

/// Fetches fields, tags and cards of notes by id.
pub struct NoteInfoTool;

#[async_trait]
impl AnkiTool for NoteInfoTool {
    const NAME: &'static str = "anki_get_note_info";
    const DESCRIPTION: &'static str = "Get the fields, tags, note type and cards of notes by id.";

    type Params = NoteInfoParams;

    async fn run(ctx: &ToolContext, params: NoteInfoParams) -> Result<ResultEnvelope, ErrorDetail> {
        require_ids(&params.note_ids, "note_ids")?;

        let notes: Vec<NoteInfo> = ctx
            .anki()
            .invoke_as("notesInfo", json!({ "notes": params.note_ids }))
            .await?;

        // Unknown ids come back as empty objects.
        let found = notes.iter().filter(|n| n.note_id.is_some()).count();
        let rendered = format_notes(&notes);
        let result = NoteInfoResult {
            count: notes.len(),
            notes,
        };

        Ok(ResultEnvelope::ok(
            Self::NAME,
            format!("Retrieved {} of {} notes", found, params.note_ids.len()),
        )
        .with_rendered(rendered)
        .with_data(&result))
    }
}
