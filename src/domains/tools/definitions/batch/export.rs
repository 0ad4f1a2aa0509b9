//! Deck export tool.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::super::common::{deck_term, require_text};
use crate::domains::tools::envelope::{ErrorDetail, ErrorKind, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportDeckParams {
    #[schemars(description = "Name of the deck to export")]
    pub deck_name: String,

    #[serde(default)]
    #[schemars(description = "Include media files in the package (default false)")]
    pub include_media: bool,

    #[serde(default)]
    #[schemars(description = "Output .apkg path, resolved by Anki (default '<deck>_export.apkg')")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExportDeckResult {
    pub deck_name: String,
    pub export_path: String,
    pub include_media: bool,
    pub total_notes_exported: usize,
}

/// Default package path for a deck.
fn default_export_path(deck_name: &str) -> String {
    format!("{}_export.apkg", deck_name.replace("::", "_"))
}

/// Exports a deck, with scheduling information, as an `.apkg` package.
pub struct ExportDeckTool;

#[async_trait]
impl AnkiTool for ExportDeckTool {
    const NAME: &'static str = "anki_export_deck";
    const DESCRIPTION: &'static str =
        "Export a deck with its scheduling information to an .apkg package.";

    type Params = ExportDeckParams;

    async fn run(ctx: &ToolContext, params: ExportDeckParams) -> Result<ResultEnvelope, ErrorDetail> {
        let deck_name = require_text(&params.deck_name, "deck_name")?;
        let export_path = params
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_export_path(deck_name));

        let anki = ctx.anki();
        let exported: bool = anki
            .invoke_as(
                "exportPackage",
                json!({
                    "deck": deck_name,
                    "path": export_path,
                    "includeSched": true,
                    "includeMedia": params.include_media,
                }),
            )
            .await?;
        if !exported {
            return Err(ErrorDetail::new(
                ErrorKind::Remote,
                format!("Anki could not export deck '{}' to {}", deck_name, export_path),
            ));
        }

        let notes: Vec<i64> = anki
            .invoke_as("findNotes", json!({ "query": deck_term(deck_name) }))
            .await?;
        info!("Exported '{}' ({} notes) to {}", deck_name, notes.len(), export_path);

        let result = ExportDeckResult {
            deck_name: deck_name.to_string(),
            export_path,
            include_media: params.include_media,
            total_notes_exported: notes.len(),
        };
        Ok(ResultEnvelope::ok(
            Self::NAME,
            format!(
                "Deck '{}' exported to {} ({} notes)",
                deck_name, result.export_path, result.total_notes_exported
            ),
        )
        .with_data(&result)
        .with_echo("deck_name", deck_name))
    }
}
