//! Note type conversion tool.
//!
//! AnkiConnect cannot change the type of an existing note, so each note is
//! recreated under the target type in its original deck, and an original is
//! deleted only once its replacement exists. Review history is not carried
//! over.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use super::super::common::{require_ids, require_text};
use crate::core::anki_connect::types::{CardInfo, NoteInfo};
use crate::domains::tools::batch::BatchOutcome;
use crate::domains::tools::envelope::{ErrorDetail, ErrorKind, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

/// Deck used when a note's deck cannot be determined.
const FALLBACK_DECK: &str = "Default";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChangeNoteTypeParams {
    #[schemars(description = "Ids of the notes to convert")]
    pub note_ids: Vec<i64>,

    #[schemars(description = "Name of the target note type")]
    pub target_model: String,

    #[serde(default)]
    #[schemars(
        description = "Map of original field name to target field name; by default fields are matched by name"
    )]
    pub field_mapping: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChangeNoteTypeResult {
    pub target_model: String,
    pub original_models: Vec<String>,
    /// Ids of the replacement notes.
    pub new_note_ids: Vec<i64>,
    /// Originals removed after their replacement was created.
    pub deleted_note_ids: Vec<i64>,
    /// "auto" or the mapping used.
    pub field_mapping_used: Value,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Fields of `note` rewritten for the target type.
fn map_fields(
    note: &NoteInfo,
    target_fields: &[String],
    mapping: Option<&BTreeMap<String, String>>,
) -> Map<String, Value> {
    let mut fields = Map::new();
    match mapping {
        Some(mapping) => {
            for (from, to) in mapping {
                if let Some(field) = note.fields.get(from) {
                    fields.insert(to.clone(), Value::String(field.value.clone()));
                }
            }
        }
        None => {
            for (name, value) in note.ordered_fields() {
                if target_fields.iter().any(|f| f == name) {
                    fields.insert(name.to_string(), Value::String(value.to_string()));
                }
            }
        }
    }
    fields
}

/// Recreates notes under another note type.
pub struct ChangeNoteTypeTool;

#[async_trait]
impl AnkiTool for ChangeNoteTypeTool {
    const NAME: &'static str = "anki_change_note_type";
    const DESCRIPTION: &'static str = "Change the note type of notes by recreating them under the \
        target type in the same deck. Fields are matched by name unless field_mapping is given. \
        Originals are deleted only after their replacement is created; review history is lost.";

    type Params = ChangeNoteTypeParams;

    async fn run(ctx: &ToolContext, params: ChangeNoteTypeParams) -> Result<ResultEnvelope, ErrorDetail> {
        require_ids(&params.note_ids, "note_ids")?;
        let target_model = require_text(&params.target_model, "target_model")?;
        if params.field_mapping.as_ref().is_some_and(|m| m.is_empty()) {
            return Err(ErrorDetail::validation("field_mapping must not be empty when given"));
        }

        let anki = ctx.anki();

        let models: Vec<String> = anki.invoke_as("modelNames", Value::Null).await?;
        if !models.iter().any(|m| m == target_model) {
            return Err(ErrorDetail::not_found(format!(
                "note type '{}' does not exist (available: {})",
                target_model,
                models.join(", ")
            )));
        }

        let target_fields: Vec<String> = anki
            .invoke_as("modelFieldNames", json!({ "modelName": target_model }))
            .await?;
        if let Some(mapping) = &params.field_mapping {
            if let Some(unknown) = mapping.values().find(|to| !target_fields.contains(to)) {
                return Err(ErrorDetail::validation(format!(
                    "field '{}' does not exist on note type '{}'",
                    unknown, target_model
                )));
            }
        }

        let notes: Vec<NoteInfo> = anki
            .invoke_as("notesInfo", json!({ "notes": params.note_ids }))
            .await?;
        let notes: Vec<NoteInfo> = notes.into_iter().filter(|n| n.note_id.is_some()).collect();
        if notes.is_empty() {
            return Err(ErrorDetail::not_found("none of the given notes exist"));
        }

        // notesInfo does not report decks; take each note's first card.
        let first_cards: Vec<i64> = notes.iter().filter_map(|n| n.cards.first().copied()).collect();
        let decks: HashMap<i64, String> = if first_cards.is_empty() {
            HashMap::new()
        } else {
            let cards: Vec<CardInfo> = anki
                .invoke_as("cardsInfo", json!({ "cards": first_cards }))
                .await?;
            cards.into_iter().map(|c| (c.note, c.deck_name)).collect()
        };

        let new_notes: Vec<Value> = notes
            .iter()
            .map(|note| {
                let deck = note
                    .note_id
                    .and_then(|id| decks.get(&id))
                    .map(String::as_str)
                    .unwrap_or(FALLBACK_DECK);
                json!({
                    "deckName": deck,
                    "modelName": target_model,
                    "fields": map_fields(note, &target_fields, params.field_mapping.as_ref()),
                    "tags": note.tags,
                    "options": { "allowDuplicate": true },
                })
            })
            .collect();

        let created: Vec<Option<i64>> = anki
            .invoke_as("addNotes", json!({ "notes": new_notes }))
            .await?;

        let mut outcome = BatchOutcome::new();
        let mut new_note_ids = Vec::new();
        let mut replaced = Vec::new();
        for (index, note) in notes.iter().enumerate() {
            let original = note.note_id.unwrap_or_default();
            match created.get(index).copied().flatten() {
                Some(new_id) => {
                    new_note_ids.push(new_id);
                    replaced.push(original);
                    outcome.record(json!(original), Ok(json!({ "new_note_id": new_id })));
                }
                None => {
                    warn!("Replacement for note {} was not created", original);
                    outcome.record(
                        json!(original),
                        Err(ErrorDetail::new(
                            ErrorKind::Remote,
                            format!("replacement for note {} could not be created", original),
                        )),
                    );
                }
            }
        }

        if !replaced.is_empty() {
            anki.invoke("deleteNotes", json!({ "notes": replaced }))
                .await?;
        }
        info!(
            "Converted {} notes to '{}': {}",
            notes.len(),
            target_model,
            outcome.summary()
        );

        let mut original_models: Vec<String> = notes.iter().map(|n| n.model_name.clone()).collect();
        original_models.sort();
        original_models.dedup();

        let message = format!(
            "Changed note type to '{}': {}",
            target_model,
            outcome.summary()
        );
        let result = ChangeNoteTypeResult {
            target_model: target_model.to_string(),
            original_models,
            new_note_ids,
            deleted_note_ids: replaced,
            field_mapping_used: params
                .field_mapping
                .as_ref()
                .map(|m| json!(m))
                .unwrap_or_else(|| json!("auto")),
            outcome,
        };
        Ok(ResultEnvelope::ok(Self::NAME, message)
            .with_data(&result)
            .with_echo("target_model", target_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::handlers::dispatch;

    fn mock(created: Value) -> MockAnki {
        MockAnki::new()
            .on("modelNames", json!(["Basic", "Basic (and reversed card)"]))
            .on("modelFieldNames", json!(["Front", "Back"]))
            .on(
                "notesInfo",
                json!([
                    {
                        "noteId": 1, "modelName": "Basic", "tags": ["verb"], "cards": [11],
                        "fields": {"Front": {"value": "comer", "order": 0}, "Back": {"value": "eat", "order": 1}}
                    },
                    {
                        "noteId": 2, "modelName": "Basic", "tags": [], "cards": [21],
                        "fields": {"Front": {"value": "beber", "order": 0}, "Back": {"value": "drink", "order": 1}}
                    }
                ]),
            )
            .on(
                "cardsInfo",
                json!([
                    {"cardId": 11, "note": 1, "deckName": "Spanish"},
                    {"cardId": 21, "note": 2, "deckName": "Spanish::Verbs"}
                ]),
            )
            .on("addNotes", created)
            .on("deleteNotes", Value::Null)
    }

    #[tokio::test]
    async fn test_convert_keeps_decks_and_deletes_after_create() {
        let (ctx, mock) = test_context(mock(json!([101, 102])));
        let envelope = dispatch::<ChangeNoteTypeTool>(
            &ctx,
            json!({"note_ids": [1, 2], "target_model": "Basic (and reversed card)"}),
        )
        .await;

        assert!(envelope.success);
        let added = &mock.calls_to("addNotes")[0]["notes"];
        assert_eq!(added[0]["deckName"], "Spanish");
        assert_eq!(added[1]["deckName"], "Spanish::Verbs");
        assert_eq!(added[0]["fields"], json!({"Front": "comer", "Back": "eat"}));
        assert_eq!(added[0]["tags"], json!(["verb"]));

        let order: Vec<String> = mock.calls().into_iter().map(|(a, _)| a).collect();
        let add_at = order.iter().position(|a| a == "addNotes").unwrap();
        let delete_at = order.iter().position(|a| a == "deleteNotes").unwrap();
        assert!(add_at < delete_at);

        let data = envelope.data.clone().unwrap();
        assert_eq!(data["new_note_ids"], json!([101, 102]));
        assert_eq!(data["field_mapping_used"], "auto");
    }

    #[tokio::test]
    async fn test_failed_replacement_keeps_original() {
        let (ctx, mock) = test_context(mock(json!([101, null])));
        let envelope = dispatch::<ChangeNoteTypeTool>(
            &ctx,
            json!({"note_ids": [1, 2], "target_model": "Basic (and reversed card)"}),
        )
        .await;

        assert!(envelope.success);
        assert_eq!(mock.calls_to("deleteNotes"), vec![json!({"notes": [1]})]);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["failed_count"], 1);
        assert_eq!(data["results"][1]["item"], 2);
    }

    #[tokio::test]
    async fn test_field_mapping() {
        let (ctx, mock) = test_context(mock(json!([101, 102])));
        let envelope = dispatch::<ChangeNoteTypeTool>(
            &ctx,
            json!({
                "note_ids": [1, 2],
                "target_model": "Basic (and reversed card)",
                "field_mapping": {"Front": "Back", "Back": "Front"}
            }),
        )
        .await;

        assert!(envelope.success);
        let added = &mock.calls_to("addNotes")[0]["notes"];
        assert_eq!(added[0]["fields"], json!({"Front": "eat", "Back": "comer"}));
    }

    #[tokio::test]
    async fn test_unknown_model_makes_no_changes() {
        let (ctx, mock) = test_context(mock(json!([])));
        let envelope = dispatch::<ChangeNoteTypeTool>(
            &ctx,
            json!({"note_ids": [1], "target_model": "Cloze"}),
        )
        .await;

        assert_eq!(envelope.error_kind(), Some(ErrorKind::NotFound));
        assert!(mock.calls_to("addNotes").is_empty());
        assert!(mock.calls_to("deleteNotes").is_empty());
    }

    #[tokio::test]
    async fn test_mapping_to_unknown_field_rejected() {
        let (ctx, mock) = test_context(mock(json!([])));
        let envelope = dispatch::<ChangeNoteTypeTool>(
            &ctx,
            json!({"note_ids": [1], "target_model": "Basic", "field_mapping": {"Front": "Text"}}),
        )
        .await;

        assert_eq!(envelope.error_kind(), Some(ErrorKind::Validation));
        assert!(mock.calls_to("notesInfo").is_empty());
    }
}
