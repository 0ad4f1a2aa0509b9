//! Analytics tools: due cards, study progress and review history.
//!
//! These query card ids with the Anki search syntax and aggregate locally.

pub mod due;
pub mod history;
pub mod progress;

pub use due::DueCardsTool;
pub use history::ReviewHistoryTool;
pub use progress::StudyProgressTool;
