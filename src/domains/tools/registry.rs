//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - Name-based dispatch of tool calls, used by the HTTP transport
//! - Tool metadata for listing

use std::sync::Arc;

use rmcp::model::Tool;
use serde_json::Value;
use tracing::warn;

use super::definitions::{
    AddNoteTool, BatchAddTool, BatchUpdateTagsTool, ChangeNoteTypeTool, DeckCreateTool,
    DeckListTool, DeckStatsTool, DeckViewTool, DeleteNotesTool, DueCardsTool, ExportDeckTool,
    FindNotesTool, MoveNotesTool, NoteInfoTool, NoteTypesTool, ReviewHistoryTool, ServerInfoTool,
    StudyProgressTool, SuspendNotesTool, SyncTool, UpdateNoteTool,
};
use super::error::ToolError;
use super::handlers::{AnkiTool, ToolContext, call_json, to_tool};

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    ctx: Arc<ToolContext>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            DeckListTool::NAME,
            DeckCreateTool::NAME,
            DeckStatsTool::NAME,
            DeckViewTool::NAME,
            AddNoteTool::NAME,
            FindNotesTool::NAME,
            NoteInfoTool::NAME,
            UpdateNoteTool::NAME,
            DeleteNotesTool::NAME,
            MoveNotesTool::NAME,
            SuspendNotesTool::NAME,
            DueCardsTool::NAME,
            StudyProgressTool::NAME,
            ReviewHistoryTool::NAME,
            BatchAddTool::NAME,
            BatchUpdateTagsTool::NAME,
            ExportDeckTool::NAME,
            ChangeNoteTypeTool::NAME,
            NoteTypesTool::NAME,
            SyncTool::NAME,
            ServerInfoTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            to_tool::<DeckListTool>(),
            to_tool::<DeckCreateTool>(),
            to_tool::<DeckStatsTool>(),
            to_tool::<DeckViewTool>(),
            to_tool::<AddNoteTool>(),
            to_tool::<FindNotesTool>(),
            to_tool::<NoteInfoTool>(),
            to_tool::<UpdateNoteTool>(),
            to_tool::<DeleteNotesTool>(),
            to_tool::<MoveNotesTool>(),
            to_tool::<SuspendNotesTool>(),
            to_tool::<DueCardsTool>(),
            to_tool::<StudyProgressTool>(),
            to_tool::<ReviewHistoryTool>(),
            to_tool::<BatchAddTool>(),
            to_tool::<BatchUpdateTagsTool>(),
            to_tool::<ExportDeckTool>(),
            to_tool::<ChangeNoteTypeTool>(),
            to_tool::<NoteTypesTool>(),
            to_tool::<SyncTool>(),
            to_tool::<ServerInfoTool>(),
        ]
    }

    /// Dispatch a tool call by name.
    ///
    /// Tool failures come back as `Ok` with `isError: true`; only an unknown
    /// name or an unserializable result is an `Err`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let ctx = self.ctx.as_ref();
        let result = match name {
            DeckListTool::NAME => call_json::<DeckListTool>(ctx, arguments).await,
            DeckCreateTool::NAME => call_json::<DeckCreateTool>(ctx, arguments).await,
            DeckStatsTool::NAME => call_json::<DeckStatsTool>(ctx, arguments).await,
            DeckViewTool::NAME => call_json::<DeckViewTool>(ctx, arguments).await,
            AddNoteTool::NAME => call_json::<AddNoteTool>(ctx, arguments).await,
            FindNotesTool::NAME => call_json::<FindNotesTool>(ctx, arguments).await,
            NoteInfoTool::NAME => call_json::<NoteInfoTool>(ctx, arguments).await,
            UpdateNoteTool::NAME => call_json::<UpdateNoteTool>(ctx, arguments).await,
            DeleteNotesTool::NAME => call_json::<DeleteNotesTool>(ctx, arguments).await,
            MoveNotesTool::NAME => call_json::<MoveNotesTool>(ctx, arguments).await,
            SuspendNotesTool::NAME => call_json::<SuspendNotesTool>(ctx, arguments).await,
            DueCardsTool::NAME => call_json::<DueCardsTool>(ctx, arguments).await,
            StudyProgressTool::NAME => call_json::<StudyProgressTool>(ctx, arguments).await,
            ReviewHistoryTool::NAME => call_json::<ReviewHistoryTool>(ctx, arguments).await,
            BatchAddTool::NAME => call_json::<BatchAddTool>(ctx, arguments).await,
            BatchUpdateTagsTool::NAME => call_json::<BatchUpdateTagsTool>(ctx, arguments).await,
            ExportDeckTool::NAME => call_json::<ExportDeckTool>(ctx, arguments).await,
            ChangeNoteTypeTool::NAME => call_json::<ChangeNoteTypeTool>(ctx, arguments).await,
            NoteTypesTool::NAME => call_json::<NoteTypesTool>(ctx, arguments).await,
            SyncTool::NAME => call_json::<SyncTool>(ctx, arguments).await,
            ServerInfoTool::NAME => call_json::<ServerInfoTool>(ctx, arguments).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                return Err(ToolError::not_found(name));
            }
        };
        result.map_err(ToolError::encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::core::config::Config;
    use serde_json::json;

    fn registry(mock: MockAnki) -> ToolRegistry {
        ToolRegistry::new(Arc::new(ToolContext::new(
            Arc::new(Config::default()),
            Arc::new(mock),
        )))
    }

    #[test]
    fn test_registry_tool_names() {
        let names = registry(MockAnki::new()).tool_names();
        assert_eq!(names.len(), 21);
        assert!(names.contains(&"anki_get_deck_names"));
        assert!(names.contains(&"anki_view_deck_contents"));
        assert!(names.contains(&"anki_suspend_notes"));
        assert!(names.contains(&"anki_get_review_history"));
        assert!(names.contains(&"anki_export_deck"));
        assert!(names.contains(&"anki_get_note_types"));
        assert!(names.contains(&"anki_sync"));
    }

    #[test]
    fn test_metadata_matches_names() {
        let tools = ToolRegistry::get_all_tools();
        let names = registry(MockAnki::new()).tool_names();
        assert_eq!(tools.len(), names.len());
        for tool in &tools {
            assert!(names.contains(&tool.name.as_ref()));
            assert!(tool.description.is_some());
        }
    }

    #[tokio::test]
    async fn test_registry_call() {
        let registry = registry(MockAnki::new().on("deckNames", json!(["Default"])));
        let result = registry
            .call_tool("anki_get_deck_names", json!({}))
            .await
            .unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["data"]["decks"], json!(["Default"]));
    }

    #[tokio::test]
    async fn test_registry_tool_failure_is_ok() {
        let registry = registry(MockAnki::new());
        let result = registry
            .call_tool("anki_add_note", json!({"deck_name": "D", "front": "", "back": "b"}))
            .await
            .unwrap();
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn test_registry_call_unknown() {
        let registry = registry(MockAnki::new());
        let result = registry.call_tool("unknown", json!({})).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }
}
