//! Deck tools: listing, creation, statistics and browsing.

pub mod create;
pub mod list;
pub mod stats;
pub mod view;

pub use create::DeckCreateTool;
pub use list::DeckListTool;
pub use stats::DeckStatsTool;
pub use view::DeckViewTool;
