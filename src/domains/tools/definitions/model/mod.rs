//! Note type tools.

pub mod change_type;
pub mod list;

pub use change_type::ChangeNoteTypeTool;
pub use list::NoteTypesTool;
