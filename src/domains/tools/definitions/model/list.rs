//! Note type listing tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domains::tools::batch::{BatchOutcome, run_batch};
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Note types whose fields are looked up.
const DETAIL_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoteTypesParams {}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct NoteTypesResult {
    pub total_count: usize,
    pub note_types: Vec<String>,
    /// Field names of the first note types, one batch item per type.
    pub detailed_info: BatchOutcome,
}

impl NoteTypesResult {
    fn render(&self) -> String {
        self.detailed_info
            .results
            .iter()
            .map(|r| {
                let name = r.item.as_str().unwrap_or_default();
                match &r.result {
                    Some(Value::Array(fields)) => {
                        let fields: Vec<&str> = fields.iter().filter_map(Value::as_str).collect();
                        format!("- {}: {}", name, fields.join(", "))
                    }
                    _ => format!("- {}: (fields unavailable)", name),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lists note types with their field names.
pub struct NoteTypesTool;

#[async_trait]
impl AnkiTool for NoteTypesTool {
    const NAME: &'static str = "anki_get_note_types";
    const DESCRIPTION: &'static str = "List the available note types and the fields of each.";

    type Params = NoteTypesParams;

    async fn run(ctx: &ToolContext, _params: NoteTypesParams) -> Result<ResultEnvelope, ErrorDetail> {
        let anki = ctx.anki();
        let names: Vec<String> = anki.invoke_as("modelNames", Value::Null).await?;

        let detailed_info = run_batch(
            names.iter().take(DETAIL_LIMIT).cloned().collect(),
            |name: &String| json!(name),
            |name| async move {
                let fields: Vec<String> = anki
                    .invoke_as("modelFieldNames", json!({ "modelName": name }))
                    .await?;
                Ok::<_, ErrorDetail>(json!(fields))
            },
        )
        .await;

        let result = NoteTypesResult {
            total_count: names.len(),
            note_types: names,
            detailed_info,
        };
        Ok(
            ResultEnvelope::ok(Self::NAME, format!("Found {} note types:", result.total_count))
                .with_rendered(result.render())
                .with_data(&result),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::AnkiConnectError;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::handlers::dispatch;

    #[tokio::test]
    async fn test_field_lookup_failure_is_per_type() {
        let (ctx, _) = test_context(
            MockAnki::new()
                .on("modelNames", json!(["Basic", "Broken", "Cloze"]))
                .respond("modelFieldNames", |params| match params["modelName"].as_str() {
                    Some("Broken") => Err(AnkiConnectError::remote("model was not found: Broken")),
                    Some("Cloze") => Ok(json!(["Text", "Back Extra"])),
                    _ => Ok(json!(["Front", "Back"])),
                }),
        );
        let envelope = dispatch::<NoteTypesTool>(&ctx, json!({})).await;

        assert!(envelope.success);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["total_count"], 3);
        assert_eq!(data["detailed_info"]["failed_count"], 1);
        assert_eq!(data["detailed_info"]["results"][2]["result"], json!(["Text", "Back Extra"]));

        let text = envelope.text();
        assert!(text.contains("- Basic: Front, Back"));
        assert!(text.contains("- Broken: (fields unavailable)"));
    }

    #[tokio::test]
    async fn test_details_limited() {
        let names: Vec<String> = (0..25).map(|i| format!("Type {}", i)).collect();
        let (ctx, mock) = test_context(
            MockAnki::new()
                .on("modelNames", json!(names))
                .on("modelFieldNames", json!(["Front"])),
        );
        let envelope = dispatch::<NoteTypesTool>(&ctx, json!({})).await;

        assert_eq!(envelope.data.clone().unwrap()["total_count"], 25);
        assert_eq!(mock.calls_to("modelFieldNames").len(), DETAIL_LIMIT);
    }
}
