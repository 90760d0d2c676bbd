//! Preview decorations
//!
//! The engine that renders snippets into decorations and the orchestrator
//! that decides when it runs.

pub mod engine;
pub mod hover;
pub mod orchestrator;

pub use engine::{Engine, RenderStats};
pub use hover::{Decoration, HoverBlock, HoverBlockKind, HoverBuilder, Messages};
pub use orchestrator::{DEFAULT_DEBOUNCE, Host, Orchestrator, OrchestratorOptions};
