//! Tool Router - builds the rmcp ToolRouter for STDIO/TCP transport.
//!
//! Every tool becomes a route through the generic
//! [`create_route`](super::handlers::create_route).

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{
    AddNoteTool, BatchAddTool, BatchUpdateTagsTool, ChangeNoteTypeTool, DeckCreateTool,
    DeckListTool, DeckStatsTool, DeckViewTool, DeleteNotesTool, DueCardsTool, ExportDeckTool,
    FindNotesTool, MoveNotesTool, NoteInfoTool, NoteTypesTool, ReviewHistoryTool, ServerInfoTool,
    StudyProgressTool, SuspendNotesTool, SyncTool, UpdateNoteTool,
};
use super::handlers::{ToolContext, create_route};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(ctx: Arc<ToolContext>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        // Decks
        .with_route(create_route::<S, DeckListTool>(ctx.clone()))
        .with_route(create_route::<S, DeckCreateTool>(ctx.clone()))
        .with_route(create_route::<S, DeckStatsTool>(ctx.clone()))
        .with_route(create_route::<S, DeckViewTool>(ctx.clone()))
        // Notes
        .with_route(create_route::<S, AddNoteTool>(ctx.clone()))
        .with_route(create_route::<S, FindNotesTool>(ctx.clone()))
        .with_route(create_route::<S, NoteInfoTool>(ctx.clone()))
        .with_route(create_route::<S, UpdateNoteTool>(ctx.clone()))
        .with_route(create_route::<S, DeleteNotesTool>(ctx.clone()))
        .with_route(create_route::<S, MoveNotesTool>(ctx.clone()))
        .with_route(create_route::<S, SuspendNotesTool>(ctx.clone()))
        // Analytics
        .with_route(create_route::<S, DueCardsTool>(ctx.clone()))
        .with_route(create_route::<S, StudyProgressTool>(ctx.clone()))
        .with_route(create_route::<S, ReviewHistoryTool>(ctx.clone()))
        // Batch
        .with_route(create_route::<S, BatchAddTool>(ctx.clone()))
        .with_route(create_route::<S, BatchUpdateTagsTool>(ctx.clone()))
        .with_route(create_route::<S, ExportDeckTool>(ctx.clone()))
        // Note types
        .with_route(create_route::<S, ChangeNoteTypeTool>(ctx.clone()))
        .with_route(create_route::<S, NoteTypesTool>(ctx.clone()))
        // System
        .with_route(create_route::<S, SyncTool>(ctx.clone()))
        .with_route(create_route::<S, ServerInfoTool>(ctx))
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;
    use crate::core::anki_connect::mock::MockAnki;
    use crate::core::config::Config;

    struct TestServer {}

    fn test_ctx() -> Arc<ToolContext> {
        Arc::new(ToolContext::new(
            Arc::new(Config::default()),
            Arc::new(MockAnki::new()),
        ))
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_ctx());
        let tools = router.list_all();
        assert_eq!(tools.len(), 21);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"anki_get_deck_names"));
        assert!(names.contains(&"anki_create_deck"));
        assert!(names.contains(&"anki_add_note"));
        assert!(names.contains(&"anki_find_notes"));
        assert!(names.contains(&"anki_get_study_progress"));
        assert!(names.contains(&"anki_batch_add_notes"));
        assert!(names.contains(&"anki_change_note_type"));
        assert!(names.contains(&"anki_get_server_info"));
        assert!(names.iter().all(|n| n.starts_with("anki_")));
    }

    #[test]
    fn test_registry_matches_router() {
        // Ensure registry and router have the same tools
        let ctx = test_ctx();
        let registry = ToolRegistry::new(ctx.clone());
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(ctx);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }
}
