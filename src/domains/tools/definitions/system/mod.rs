//! System tools: sync and server information.

pub mod server_info;
pub mod sync;

pub use server_info::ServerInfoTool;
pub use sync::SyncTool;
