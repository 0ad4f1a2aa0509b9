//! Bulk note creation tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::super::common::require_text;
use super::super::note::add::NewNote;
use crate::domains::tools::batch::{BatchOutcome, run_batch};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// One note of a bulk add. Missing sides fail that item only.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchNoteInput {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub note_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchAddParams {
    #[serde(alias = "notes")]
    #[schemars(description = "Notes to add, each {\"front\", \"back\", \"tags\"?, \"note_type\"?}")]
    pub notes_data: Vec<BatchNoteInput>,

    #[schemars(description = "Target deck name for every note")]
    pub deck_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchAddResult {
    pub deck_name: String,
    pub note_ids: Vec<i64>,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Adds many notes to one deck, item by item.
pub struct BatchAddTool;

#[async_trait]
impl AnkiTool for BatchAddTool {
    const NAME: &'static str = "anki_batch_add_notes";
    const DESCRIPTION: &'static str = "Add several notes to a deck. Each note is added on its own; \
        failures are reported per note without stopping the batch.";

    type Params = BatchAddParams;

    async fn run(ctx: &ToolContext, params: BatchAddParams) -> Result<ResultEnvelope, ErrorDetail> {
        let deck_name = require_text(&params.deck_name, "deck_name")?;
        if params.notes_data.is_empty() {
            return Err(ErrorDetail::validation("notes_data must not be empty"));
        }
        let default_note_type = ctx.config.anki.default_note_type.as_str();

        let outcome = run_batch(
            params.notes_data,
            |input| json!(input.front),
            |input| async move {
                let note = NewNote::build(
                    deck_name,
                    &input.front,
                    &input.back,
                    input.note_type.as_deref(),
                    input.tags.as_deref(),
                    default_note_type,
                )?;
                let id: i64 = ctx.anki().invoke_as("addNote", note.to_params()).await?;
                Ok::<_, ErrorDetail>(json!(id))
            },
        )
        .await;

        let note_ids: Vec<i64> = outcome
            .succeeded()
            .filter_map(|r| r.result.as_ref().and_then(|v| v.as_i64()))
            .collect();
        info!("Batch add to '{}': {}", deck_name, outcome.summary());

        let message = format!("Batch add to '{}': {}", deck_name, outcome.summary());
        let result = BatchAddResult {
            deck_name: deck_name.to_string(),
            note_ids,
            outcome,
        };
        Ok(ResultEnvelope::ok(Self::NAME, message)
            .with_data(&result)
            .with_echo("deck_name", deck_name))
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

    fn mock() -> MockAnki {
        MockAnki::new().respond("addNote", |params| {
            match params["note"]["fields"]["Front"].as_str() {
                Some("dup") => Err(AnkiConnectError::remote(
                    "cannot create note because it is a duplicate",
                )),
                Some(front) => Ok(json!(front.len() as i64 * 100)),
                None => Err(AnkiConnectError::remote("bad note")),
            }
        })
    }

    #[tokio::test]
    async fn test_partial_failure_is_successful_envelope() {
        let (ctx, mock) = test_context(mock());
        let envelope = dispatch::<BatchAddTool>(
            &ctx,
            json!({
                "deck_name": "Spanish",
                "notes_data": [
                    {"front": "gato", "back": "cat"},
                    {"front": "dup", "back": "x"},
                    {"front": "", "back": "empty"},
                    {"front": "perro", "back": "dog", "tags": ["animal"]}
                ]
            }),
        )
        .await;

        assert!(envelope.success);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["total_attempted"], 4);
        assert_eq!(data["succeeded_count"], 2);
        assert_eq!(data["failed_count"], 2);
        assert_eq!(data["note_ids"], json!([400, 500]));
        assert_eq!(data["results"][1]["error"]["kind"], "duplicate");
        assert_eq!(data["results"][2]["error"]["kind"], "validation");
        assert_eq!(data["results"][3]["item"], "perro");

        // The invalid item never reached Anki.
        assert_eq!(mock.calls_to("addNote").len(), 3);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let (ctx, mock) = test_context(mock());
        let envelope =
            dispatch::<BatchAddTool>(&ctx, json!({"deck_name": "Spanish", "notes": []})).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Validation));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_accepts_short_notes_key() {
        let (ctx, mock) = test_context(mock());
        let envelope = dispatch::<BatchAddTool>(
            &ctx,
            json!({"deck_name": "D", "notes": [{"front": "a", "back": "b"}]}),
        )
        .await;

        assert!(envelope.success);
        assert_eq!(envelope.data.clone().unwrap()["note_ids"], json!([100]));
        assert_eq!(mock.calls_to("addNote").len(), 1);
    }
}
