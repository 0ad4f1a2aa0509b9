//! Note tools: add, search, inspect, edit, delete, move and suspend.

pub mod add;
pub mod delete;
pub mod find;
pub mod info;
pub mod move_notes;
pub mod suspend;
pub mod update;

pub use add::AddNoteTool;
pub use delete::DeleteNotesTool;
pub use find::FindNotesTool;
pub use info::NoteInfoTool;
pub use move_notes::MoveNotesTool;
pub use suspend::SuspendNotesTool;
pub use update::UpdateNoteTool;

use serde_json::json;

use super::common::nid_term;
use crate::domains::tools::envelope::ErrorDetail;
use crate::domains::tools::handlers::ToolContext;

/// Card ids of the given notes, in one `findCards` call.
pub(crate) async fn cards_of_notes(
    ctx: &ToolContext,
    note_ids: &[i64],
) -> Result<Vec<i64>, ErrorDetail> {
    let cards: Vec<i64> = ctx
        .anki()
        .invoke_as("findCards", json!({ "query": nid_term(note_ids) }))
        .await?;
    Ok(cards)
}
