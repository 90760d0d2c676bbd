//! LSP Protocol Implementation
//!
//! Maps protocol messages onto the decoration orchestrator.

pub mod backend;
pub mod handlers;
pub mod host;
pub mod notifications;
pub mod server;

pub use backend::Backend;
pub use host::ClientHost;
