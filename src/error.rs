//! Error types
//!
//! Render failures are split into the benign "not an SVG we handle" case,
//! which is cached and never reported, and everything else, which is
//! logged. Lifecycle misuse is a host integration bug.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Not recognized vector markup: parse failure, wrong root, no
    /// attributes, or a namespace other than SVG.
    #[error("not recognized vector markup")]
    Ignored,
    #[error("failed to serialize markup: {0}")]
    Serialize(#[from] std::io::Error),
}

impl RenderError {
    pub fn is_ignored(&self) -> bool {
        matches!(self, RenderError::Ignored)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("preview engine is already active")]
    AlreadyActive,
}
