//! Note search tool with pagination.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::super::common::{default_limit, default_true, format_notes, require_text};
use crate::core::anki_connect::types::NoteInfo;
use crate::domains::tools::envelope::{ErrorDetail, ResultEnvelope};
use crate::domains::tools::handlers::{AnkiTool, ToolContext};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FindNotesParams {
    #[schemars(description = "Anki search query, e.g. 'deck:Japanese tag:verb' or 'is:new'")]
    pub query: String,

    #[serde(default = "default_limit")]
    #[schemars(description = "Maximum number of notes to return (default 20, 0 returns only the count)")]
    pub limit: usize,

    #[serde(default)]
    #[schemars(description = "Number of matching notes to skip (default 0)")]
    pub offset: usize,

    #[serde(default = "default_true")]
    #[schemars(description = "Fetch note contents (default true); false returns ids only")]
    pub with_content: bool,
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct NotePage {
    pub query: String,
    pub total_count: usize,
    pub offset: usize,
    pub limit: usize,
    pub returned_count: usize,
    pub note_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<NoteInfo>>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<usize>,
}

impl NotePage {
    fn summary(&self) -> String {
        format!("Found {} notes matching '{}'", self.total_count, self.query)
    }

    fn render(&self) -> String {
        if self.returned_count == 0 {
            return String::new();
        }

        let mut lines = vec![format!(
            "Showing {} notes (offset: {})",
            self.returned_count, self.offset
        )];
        match &self.notes {
            Some(notes) if !notes.is_empty() => {
                lines.push(String::new());
                lines.push(format_notes(notes));
            }
            _ => {
                lines.push(String::new());
                lines.push("Note IDs:".to_string());
                lines.push(
                    self.note_ids
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                );
            }
        }
        if let Some(next) = self.next_offset {
            lines.push(String::new());
            lines.push(format!(
                "More results available. Use offset={} to see next page.",
                next
            ));
        }
        lines.join("\n")
    }
}

/// Run `query` and fetch one page of matching notes.
///
/// `limit == 0` only counts the matches.
pub async fn find_page(
    ctx: &ToolContext,
    query: &str,
    limit: usize,
    offset: usize,
    with_content: bool,
) -> Result<NotePage, ErrorDetail> {
    let anki = ctx.anki();
    let all_ids: Vec<i64> = anki.invoke_as("findNotes", json!({ "query": query })).await?;
    let total_count = all_ids.len();

    if limit == 0 {
        return Ok(NotePage {
            query: query.to_string(),
            total_count,
            offset,
            ..Default::default()
        });
    }

    let page_ids: Vec<i64> = all_ids.into_iter().skip(offset).take(limit).collect();

    let notes = if with_content && !page_ids.is_empty() {
        let notes: Vec<NoteInfo> = anki
            .invoke_as("notesInfo", json!({ "notes": page_ids }))
            .await?;
        Some(notes)
    } else if with_content {
        Some(Vec::new())
    } else {
        None
    };

    let end = offset.saturating_add(limit);
    let has_more = total_count > end;
    Ok(NotePage {
        query: query.to_string(),
        total_count,
        offset,
        limit,
        returned_count: page_ids.len(),
        note_ids: page_ids,
        notes,
        has_more,
        next_offset: has_more.then_some(end),
    })
}

/// Wrap a page into a tool envelope.
pub fn page_envelope(action: &str, page: NotePage) -> ResultEnvelope {
    info!(
        "Query '{}' matched {} notes, returning {}",
        page.query, page.total_count, page.returned_count
    );
    let rendered = page.render();
    ResultEnvelope::ok(action, page.summary())
        .with_rendered(rendered)
        .with_data(&page)
}

/// Searches notes with the Anki query syntax.
pub struct FindNotesTool;

#[async_trait]
impl AnkiTool for FindNotesTool {
    const NAME: &'static str = "anki_find_notes";
    const DESCRIPTION: &'static str = "Search notes with the Anki query syntax. Supports pagination \
        (limit/offset); limit=0 returns only the total count, with_content=false returns ids only.";

    type Params = FindNotesParams;

    async fn run(ctx: &ToolContext, params: FindNotesParams) -> Result<ResultEnvelope, ErrorDetail> {
        let query = require_text(&params.query, "query")?;
        let page = find_page(ctx, query, params.limit, params.offset, params.with_content).await?;
        Ok(page_envelope(Self::NAME, page).with_echo("query", query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::domains::tools::definitions::common::test_context;
    use crate::domains::tools::envelope::ErrorKind;
    use crate::domains::tools::handlers::dispatch;
    use serde_json::Value;

    fn notes_info(params: &Value) -> crate::core::anki_connect::AnkiConnectResult<Value> {
        let ids = params["notes"].as_array().cloned().unwrap_or_default();
        Ok(Value::Array(
            ids.iter()
                .map(|id| {
                    json!({
                        "noteId": id,
                        "modelName": "Basic",
                        "tags": [],
                        "fields": {
                            "Front": {"value": format!("front {}", id), "order": 0},
                            "Back": {"value": "back", "order": 1}
                        },
                        "cards": []
                    })
                })
                .collect(),
        ))
    }

    fn mock_with(ids: Vec<i64>) -> MockAnki {
        MockAnki::new()
            .on("findNotes", json!(ids))
            .respond("notesInfo", notes_info)
    }

    #[tokio::test]
    async fn test_first_page_has_more() {
        let (ctx, mock) = test_context(mock_with((1..=25).collect()));
        let envelope = dispatch::<FindNotesTool>(&ctx, json!({"query": "tag:verb"})).await;

        assert!(envelope.success);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["total_count"], 25);
        assert_eq!(data["returned_count"], 20);
        assert_eq!(data["has_more"], true);
        assert_eq!(data["next_offset"], 20);
        assert_eq!(mock.calls_to("notesInfo")[0]["notes"].as_array().unwrap().len(), 20);

        let text = envelope.text();
        assert!(text.starts_with("Found 25 notes matching 'tag:verb'"));
        assert!(text.contains("<note id=1>"));
        assert!(text.contains("Use offset=20"));
    }

    #[tokio::test]
    async fn test_last_page() {
        let (ctx, _) = test_context(mock_with((1..=25).collect()));
        let envelope =
            dispatch::<FindNotesTool>(&ctx, json!({"query": "tag:verb", "offset": 20})).await;
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["returned_count"], 5);
        assert_eq!(data["note_ids"][0], 21);
        assert_eq!(data["has_more"], false);
        assert!(data.get("next_offset").is_none());
    }

    #[tokio::test]
    async fn test_huge_offset_is_an_empty_page() {
        let (ctx, mock) = test_context(mock_with(vec![1, 2, 3]));
        let envelope = dispatch::<FindNotesTool>(
            &ctx,
            json!({"query": "x", "offset": u64::MAX, "limit": 20}),
        )
        .await;

        assert!(envelope.success);
        let data = envelope.data.clone().unwrap();
        assert_eq!(data["total_count"], 3);
        assert_eq!(data["returned_count"], 0);
        assert_eq!(data["has_more"], false);
        assert!(data.get("next_offset").is_none());
        assert!(mock.calls_to("notesInfo").is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit_only_counts() {
        let (ctx, mock) = test_context(mock_with(vec![1, 2, 3]));
        let envelope =
            dispatch::<FindNotesTool>(&ctx, json!({"query": "is:new", "limit": 0})).await;
        assert_eq!(envelope.data.clone().unwrap()["total_count"], 3);
        assert!(mock.calls_to("notesInfo").is_empty());
    }

    #[tokio::test]
    async fn test_ids_only() {
        let (ctx, mock) = test_context(mock_with(vec![7, 8]));
        let envelope = dispatch::<FindNotesTool>(
            &ctx,
            json!({"query": "verb", "with_content": false}),
        )
        .await;
        assert!(mock.calls_to("notesInfo").is_empty());
        assert!(envelope.text().contains("Note IDs:\n7, 8"));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (ctx, mock) = test_context(MockAnki::new());
        let envelope = dispatch::<FindNotesTool>(&ctx, json!({"query": ""})).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Validation));
        assert!(mock.calls().is_empty());
    }
}
