//! Hover content for preview decorations
//!
//! A decoration carries a short list of markdown blocks the client renders
//! one by one: a title, the image, and for markup a link to the settings.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Range;

use crate::core::scanner::SnippetKind;

const OPEN_SETTINGS_COMMAND: &str = "workbench.action.openSettings";

/// A previewable range and what to show when hovering it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub range: Range,
    pub hover_message: Vec<HoverBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HoverBlockKind {
    Title,
    Image,
    SettingsLink,
}

/// One markdown block of hover content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverBlock {
    pub kind: HoverBlockKind,
    pub value: String,
    /// Commands the client may run from links in this block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_commands: Vec<String>,
    /// Whether `$(icon)` syntax should be rendered
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub support_theme_icons: bool,
}

impl HoverBlock {
    fn markdown(kind: HoverBlockKind, value: String) -> Self {
        Self {
            kind,
            value,
            enabled_commands: Vec::new(),
            support_theme_icons: false,
        }
    }
}

/// User-visible captions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub preview: &'static str,
    pub settings: &'static str,
}

impl Messages {
    pub const ENGLISH: Messages = Messages {
        preview: "Preview",
        settings: "Settings",
    };

    pub const JAPANESE: Messages = Messages {
        preview: "プレビュー",
        settings: "設定",
    };

    /// Captions for a client locale such as `ja` or `en-US`.
    pub fn for_locale(locale: Option<&str>) -> Messages {
        let language = locale
            .and_then(|locale| locale.split(['-', '_']).next())
            .unwrap_or_default();
        match language.to_ascii_lowercase().as_str() {
            "ja" => Messages::JAPANESE,
            _ => Messages::ENGLISH,
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Messages::ENGLISH
    }
}

/// Builds hover blocks for decorations
#[derive(Debug, Clone)]
pub struct HoverBuilder {
    messages: Messages,
    extension_id: String,
}

impl HoverBuilder {
    pub fn new(messages: Messages, extension_id: impl Into<String>) -> Self {
        Self {
            messages,
            extension_id: extension_id.into(),
        }
    }

    pub fn decoration(&self, range: Range, kind: SnippetKind, image: &str) -> Decoration {
        let label = match kind {
            SnippetKind::Markup => "SVG",
            SnippetKind::DataReference => "Data URL",
        };
        let mut hover_message = vec![
            HoverBlock::markdown(
                HoverBlockKind::Title,
                format!("### {} {}", label, self.messages.preview),
            ),
            HoverBlock::markdown(HoverBlockKind::Image, format!("![]({})", image)),
        ];
        if kind == SnippetKind::Markup {
            hover_message.push(self.settings_link());
        }
        Decoration {
            range,
            hover_message,
        }
    }

    fn settings_link(&self) -> HoverBlock {
        HoverBlock {
            kind: HoverBlockKind::SettingsLink,
            value: format!(
                "[$(gear) {}](command:{}?[\"@ext:{}\"])",
                self.messages.settings, OPEN_SETTINGS_COMMAND, self.extension_id
            ),
            enabled_commands: vec![OPEN_SETTINGS_COMMAND.to_string()],
            support_theme_icons: true,
        }
    }
}

impl Default for HoverBuilder {
    fn default() -> Self {
        Self::new(Messages::ENGLISH, crate::config::DEFAULT_EXTENSION_ID)
    }
}
