//! Preset attributes
//!
//! Attributes merged onto every rendered `<svg>` root at the lowest
//! precedence. `color` always comes first so `currentColor` resolves
//! against the editor theme.

use serde_json::Value;

use crate::core::attributes::is_presentation_attribute;
use crate::settings::{ColorThemeKind, Settings};

/// Ordered, plain-text (unescaped) attribute values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preset {
    attributes: Vec<(String, String)>,
}

impl Preset {
    /// Build the preset from settings and the active color theme.
    ///
    /// Preset entries that are not presentation attributes, or whose value
    /// is neither a string nor a number, are dropped.
    pub fn from_settings(settings: &Settings, theme: ColorThemeKind) -> Self {
        let color = settings
            .current_color
            .as_deref()
            .filter(|color| !color.is_empty())
            .unwrap_or_else(|| theme.default_current_color());

        let mut preset = Preset::default();
        preset.insert("color", color.to_string());

        for (name, value) in settings.preset.iter().flatten() {
            if !is_presentation_attribute(name) {
                log::debug!("Skipping preset entry '{}': not a presentation attribute", name);
                continue;
            }
            let value = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => match number.as_f64() {
                    Some(number) => format_number(number),
                    None => continue,
                },
                _ => continue,
            };
            preset.insert(name, value);
        }
        preset
    }

    fn insert(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Shortest decimal form of a number: `50`, `12.5`, `0.25`.
pub fn format_number(number: f64) -> String {
    format!("{}", number)
}
