//! Bulk tag editing tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::super::common::require_ids;
use crate::domains::tools::batch::{BatchOutcome, run_batch};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchUpdateTagsParams {
    #[schemars(description = "Ids of the notes to retag")]
    pub note_ids: Vec<i64>,

    #[serde(default)]
    #[schemars(description = "Tags to add")]
    pub add_tags: Option<Vec<String>>,

    #[serde(default)]
    #[schemars(description = "Tags to remove")]
    pub remove_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchUpdateTagsResult {
    pub added_tags: Vec<String>,
    pub removed_tags: Vec<String>,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Adds and removes tags on many notes, note by note.
pub struct BatchUpdateTagsTool;

#[async_trait]
impl AnkiTool for BatchUpdateTagsTool {
    const NAME: &'static str = "anki_batch_update_tags";
    const DESCRIPTION: &'static str =
        "Add and/or remove tags on several notes. Failures are reported per note.";

    type Params = BatchUpdateTagsParams;

    async fn run(ctx: &ToolContext, params: BatchUpdateTagsParams) -> Result<ResultEnvelope, ErrorDetail> {
        require_ids(&params.note_ids, "note_ids")?;
        let added_tags = params.add_tags.unwrap_or_default();
        let removed_tags = params.remove_tags.unwrap_or_default();
        if added_tags.is_empty() && removed_tags.is_empty() {
            return Err(ErrorDetail::validation(
                "add_tags or remove_tags must be given",
            ));
        }

        let add = added_tags.join(" ");
        let remove = removed_tags.join(" ");
        let (add, remove) = (add.as_str(), remove.as_str());

        let outcome = run_batch(
            params.note_ids,
            |id| json!(id),
            |id| async move {
                let anki = ctx.anki();
                if !add.is_empty() {
                    anki.invoke("addTags", json!({ "notes": [id], "tags": add }))
                        .await?;
                }
                if !remove.is_empty() {
                    anki.invoke("removeTags", json!({ "notes": [id], "tags": remove }))
                        .await?;
                }
                Ok::<_, ErrorDetail>(Value::Null)
            },
        )
        .await;
        info!("Tag update: {}", outcome.summary());

        let message = format!("Tag update: {}", outcome.summary());
        Ok(ResultEnvelope::ok(Self::NAME, message).with_data(&BatchUpdateTagsResult {
            added_tags,
            removed_tags,
            outcome,
        }))
    }
}
