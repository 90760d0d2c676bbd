//! Core Preview Logic
//!
//! Text documents, snippet scanning, presets and the per-document render
//! cache.

pub mod attributes;
pub mod cache;
pub mod document;
pub mod preset;
pub mod scanner;

pub use cache::{CacheEntry, DocumentCache};
pub use document::{Document, TextSnapshot};
pub use preset::Preset;
pub use scanner::{Snippet, SnippetKind, normalize, scan};
