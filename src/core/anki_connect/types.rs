//! Typed shapes of the AnkiConnect responses the tools rely on.
//!
//! AnkiConnect answers with loosely typed JSON. Responses are coerced into
//! these structs at the client boundary so a shape mismatch becomes an
//! `InvalidResponse` error instead of a silent default deep inside a tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request body sent to AnkiConnect.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteCall<'a> {
    pub action: &'a str,
    pub version: u32,
    pub params: &'a serde_json::Value,
}

/// Response envelope returned by AnkiConnect.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteReply {
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl RemoteReply {
    /// The error message, if AnkiConnect reported one.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// One field of a note as returned by `notesInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NoteField {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub order: u32,
}

/// A note as returned by `notesInfo`.
///
/// Unknown note ids come back as empty objects, hence `note_id` is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    #[serde(default)]
    pub note_id: Option<i64>,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, NoteField>,
    #[serde(default)]
    pub cards: Vec<i64>,
}

impl NoteInfo {
    /// Field values in the note type's field order.
    pub fn ordered_fields(&self) -> Vec<(&str, &str)> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by_key(|(_, f)| f.order);
        fields
            .into_iter()
            .map(|(name, f)| (name.as_str(), f.value.as_str()))
            .collect()
    }
}

/// A card as returned by `cardsInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    #[serde(default)]
    pub card_id: i64,
    #[serde(default)]
    pub note: i64,
    #[serde(default)]
    pub deck_name: String,
    #[serde(default)]
    pub model_name: String,
    /// Days for review cards, negative seconds for cards in learning.
    #[serde(default)]
    pub interval: i64,
    #[serde(default, rename = "type")]
    pub card_type: i64,
    #[serde(default)]
    pub queue: i64,
    #[serde(default)]
    pub due: i64,
    #[serde(default)]
    pub reps: i64,
    #[serde(default)]
    pub lapses: i64,
}

/// Per-deck counters as returned by `getDeckStats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeckStats {
    #[serde(default)]
    pub deck_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub new_count: i64,
    #[serde(default)]
    pub learn_count: i64,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub total_in_deck: i64,
}
