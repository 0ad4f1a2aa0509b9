//! Domains module containing business logic organized by bounded contexts.
//!
//! The server only exposes tools; each tool is one Anki operation.

pub mod tools;
