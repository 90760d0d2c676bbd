//! SVG Preview Language Server
//!
//! Shows hover previews of inline `<svg>` markup and base64 image data URLs
//! found in any text document.
//!
//! This library provides:
//! - Snippet scanning and normalization
//! - SVG root rewriting with presets and target sizes
//! - A per-document render cache that never outlives its documents
//! - Debounced decoration refreshes driven by editor events
//! - LSP protocol implementation

pub mod config;
pub mod core;
pub mod decoration;
pub mod error;
pub mod lsp;
pub mod settings;
pub mod svg;
pub mod watch;

// Re-exports for clean public API
pub use config::Config;
pub use crate::core::{Document, DocumentCache, Preset, SnippetKind, scan};
pub use decoration::{Decoration, Engine, Host, Orchestrator};
pub use error::{EngineError, RenderError};
pub use settings::{ColorThemeKind, Settings};
pub use svg::Transformer;
