//! Bulk tools: add notes, retag notes and export a deck.

pub mod add;
pub mod export;
pub mod update_tags;

pub use add::BatchAddTool;
pub use export::ExportDeckTool;
pub use update_tags::BatchUpdateTagsTool;
