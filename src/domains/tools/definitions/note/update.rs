//! Note editing tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateNoteParams {
    #[schemars(description = "Id of the note to update")]
    pub note_id: i64,

    #[schemars(description = "Fields to overwrite, e.g. {\"Front\": \"new question\"}")]
    pub fields: BTreeMap<String, String>,

    #[serde(default)]
    #[schemars(description = "New tag list; replaces all existing tags when given")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct UpdateNoteResult {
    pub note_id: i64,
    pub updated_fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_tags: Option<Vec<String>>,
}

/// Overwrites fields and optionally the tags of a note.
pub struct UpdateNoteTool;

#[async_trait]
impl AnkiTool for UpdateNoteTool {
    const NAME: &'static str = "anki_update_note";
    const DESCRIPTION: &'static str = "Update the fields of an existing note. When tags are given \
        they replace all existing tags.";

    type Params = UpdateNoteParams;

    async fn run(ctx: &ToolContext, params: UpdateNoteParams) -> Result<ResultEnvelope, ErrorDetail> {
        if params.note_id <= 0 {
            return Err(ErrorDetail::validation("note_id must be a positive integer"));
        }
        if params.fields.is_empty() {
            return Err(ErrorDetail::validation("fields must not be empty"));
        }

        let anki = ctx.anki();
        anki.invoke(
            "updateNoteFields",
            json!({ "note": { "id": params.note_id, "fields": params.fields } }),
        )
        .await?;

        if let Some(tags) = &params.tags {
            anki.invoke(
                "updateNoteTags",
                json!({ "note": params.note_id, "tags": tags.join(" ") }),
            )
            .await?;
        }
        info!(
            "Updated note {} ({} fields)",
            params.note_id,
            params.fields.len()
        );

        let result = UpdateNoteResult {
            note_id: params.note_id,
            updated_fields: params.fields,
            updated_tags: params.tags,
        };
        Ok(
            ResultEnvelope::ok(Self::NAME, format!("Note {} updated", result.note_id))
                .with_data(&result)
                .with_echo("note_id", result.note_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::AnkiConnectError;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::envelope::ErrorKind;
    use crate::domains::tools::handlers::dispatch;
    use serde_json::Value;

    #[tokio::test]
    async fn test_update_fields_and_tags() {
        let (ctx, mock) = test_context(
            MockAnki::new()
                .on("updateNoteFields", Value::Null)
                .on("updateNoteTags", Value::Null),
        );
        let envelope = dispatch::<UpdateNoteTool>(
            &ctx,
            json!({"note_id": 9, "fields": {"Front": "perro"}, "tags": ["animal", "noun"]}),
        )
        .await;

        assert!(envelope.success);
        assert_eq!(
            mock.calls_to("updateNoteFields"),
            vec![json!({"note": {"id": 9, "fields": {"Front": "perro"}}})]
        );
        assert_eq!(
            mock.calls_to("updateNoteTags"),
            vec![json!({"note": 9, "tags": "animal noun"})]
        );
    }

    #[tokio::test]
    async fn test_tags_untouched_when_absent() {
        let (ctx, mock) = test_context(MockAnki::new().on("updateNoteFields", Value::Null));
        let envelope =
            dispatch::<UpdateNoteTool>(&ctx, json!({"note_id": 9, "fields": {"Back": "dog"}}))
                .await;
        assert!(envelope.success);
        assert!(mock.calls_to("updateNoteTags").is_empty());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let (ctx, mock) = test_context(MockAnki::new());
        let envelope = dispatch::<UpdateNoteTool>(&ctx, json!({"note_id": 9, "fields": {}})).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Validation));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_note() {
        let (ctx, _) = test_context(
            MockAnki::new().fail("updateNoteFields", AnkiConnectError::remote("Note was not found: 9")),
        );
        let envelope =
            dispatch::<UpdateNoteTool>(&ctx, json!({"note_id": 9, "fields": {"Back": "dog"}}))
                .await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::NotFound));
    }
}
