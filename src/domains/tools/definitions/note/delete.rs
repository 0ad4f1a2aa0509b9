//! Note deletion tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::super::common::require_ids;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteNotesParams {
    #[schemars(description = "Ids of the notes to delete")]
    pub note_ids: Vec<i64>,
}

/// Deletes notes (and their cards) in one call.
pub struct DeleteNotesTool;

#[async_trait]
impl AnkiTool for DeleteNotesTool {
    const NAME: &'static str = "anki_delete_notes";
    const DESCRIPTION: &'static str = "Delete notes and all their cards. This cannot be undone.";

    type Params = DeleteNotesParams;

    async fn run(ctx: &ToolContext, params: DeleteNotesParams) -> Result<ResultEnvelope, ErrorDetail> {
        require_ids(&params.note_ids, "note_ids")?;

        ctx.anki()
            .invoke("deleteNotes", json!({ "notes": params.note_ids }))
            .await?;

        let count = params.note_ids.len();
        info!("Deleted {} notes", count);
        Ok(
            ResultEnvelope::ok(Self::NAME, format!("Deleted {} notes", count)).with_value(json!({
                "deleted_note_ids": params.note_ids,
                "count": count,
            })),
        )
    }
}
