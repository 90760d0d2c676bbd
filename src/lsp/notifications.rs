//! Custom protocol extensions
//!
//! Editors report focus and theme through notifications LSP has no standard
//! form for, and receive decorations through one pushed by the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_lsp::lsp_types::Url;
use tower_lsp::lsp_types::notification::Notification;

use crate::decoration::Decoration;
use crate::settings::ColorThemeKind;

/// Server to client: decorations for a document, replacing earlier ones
#[derive(Debug)]
pub enum PublishDecorations {}

impl Notification for PublishDecorations {
    type Params = PublishDecorationsParams;
    const METHOD: &'static str = "svgPreview/publishDecorations";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishDecorationsParams {
    pub uri: Url,
    pub decorations: Vec<Decoration>,
}

/// Client to server: the focused editor changed
#[derive(Debug)]
pub enum DidChangeActiveEditor {}

impl Notification for DidChangeActiveEditor {
    type Params = ActiveEditorParams;
    const METHOD: &'static str = "svgPreview/didChangeActiveEditor";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEditorParams {
    /// `None` when no text editor has focus
    #[serde(default)]
    pub uri: Option<Url>,
}

/// Client to server: the set of visible editors changed
#[derive(Debug)]
pub enum DidChangeVisibleEditors {}

impl Notification for DidChangeVisibleEditors {
    type Params = VisibleEditorsParams;
    const METHOD: &'static str = "svgPreview/didChangeVisibleEditors";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleEditorsParams {
    pub uris: Vec<Url>,
}

/// Client to server: the color theme changed
#[derive(Debug)]
pub enum DidChangeColorTheme {}

impl Notification for DidChangeColorTheme {
    type Params = ColorThemeParams;
    const METHOD: &'static str = "svgPreview/didChangeColorTheme";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorThemeParams {
    pub kind: ColorThemeKind,
}

/// `initializationOptions` understood by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializationOptions {
    /// Client settings for clients without `workspace/configuration`
    pub settings: Option<Value>,
    pub color_theme: Option<ColorThemeKind>,
    pub extension_id: Option<String>,
}

impl InitializationOptions {
    /// Parse the options, logging and ignoring anything malformed.
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed initialization options: {}", e);
                Self::default()
            }),
        }
    }
}

/// Pick the preview section out of a `didChangeConfiguration` payload.
///
/// Clients send either the whole settings tree or just the section.
pub fn settings_section_value(settings: Value, section: &str) -> Value {
    match settings {
        Value::Object(mut map) if map.contains_key(section) => {
            map.remove(section).unwrap_or(Value::Null)
        }
        other => other,
    }
}
