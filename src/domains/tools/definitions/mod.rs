//! Tool definitions module.
//!
//! Tools are grouped by what they act on; each tool lives in its own file
//! and implements [`AnkiTool`](super::AnkiTool).

pub mod analytics;
pub mod batch;
pub mod common;
pub mod deck;
pub mod model;
pub mod note;
pub mod system;

pub use analytics::{DueCardsTool, ReviewHistoryTool, StudyProgressTool};
pub use batch::{BatchAddTool, BatchUpdateTagsTool, ExportDeckTool};
pub use deck::{DeckCreateTool, DeckListTool, DeckStatsTool, DeckViewTool};
pub use model::{ChangeNoteTypeTool, NoteTypesTool};
pub use note::{
    AddNoteTool, DeleteNotesTool, FindNotesTool, MoveNotesTool, NoteInfoTool, SuspendNotesTool,
    UpdateNoteTool,
};
pub use system::{ServerInfoTool, SyncTool};
