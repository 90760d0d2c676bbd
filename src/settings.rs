//! Preview settings
//!
//! The user-facing knobs of the preview (`disable`, `preset`,
//! `currentColor`, `size`). The same shape is read from the settings file,
//! from command-line flags and from the client, and layered in that order.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Preview settings for one scope. Unset fields fall through to the layer
/// below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Turn previews off for the scope
    pub disable: Option<bool>,
    /// Presentation attributes added to every rendered `<svg>`
    pub preset: Option<Map<String, Value>>,
    /// Color used for `currentColor`; defaults from the color theme
    pub current_color: Option<String>,
    /// Target size of the longer side, in pixels
    pub size: Option<f64>,
}

impl Settings {
    /// Fill every unset field of `self` from `base`.
    pub fn layered_over(self, base: &Settings) -> Settings {
        Settings {
            disable: self.disable.or(base.disable),
            preset: self.preset.or_else(|| base.preset.clone()),
            current_color: self.current_color.or_else(|| base.current_color.clone()),
            size: self.size.or(base.size),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disable.unwrap_or(false)
    }

    /// Target size, when set to a usable positive number.
    pub fn target_size(&self) -> Option<f64> {
        self.size.filter(|size| size.is_finite() && *size > 0.0)
    }

    /// Parse settings sent by the client field by field. An unreadable
    /// field is logged and left unset; the others still apply.
    pub fn from_client_value(value: Value) -> Settings {
        let fields = match value {
            Value::Null => return Settings::default(),
            Value::Object(fields) => fields,
            other => {
                log::warn!("Ignoring preview settings that are not an object: {}", other);
                return Settings::default();
            }
        };
        Settings {
            disable: client_field(&fields, "disable"),
            preset: client_field(&fields, "preset"),
            current_color: client_field(&fields, "currentColor"),
            size: client_field(&fields, "size"),
        }
    }
}

fn client_field<T: DeserializeOwned>(fields: &Map<String, Value>, name: &str) -> Option<T> {
    let value = fields.get(name)?;
    Option::<T>::deserialize(value).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed preview setting {:?}: {}", name, e);
        None
    })
}

/// Editor color theme kind, numbered as editors report it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ColorThemeKind {
    #[default]
    Light,
    Dark,
    HighContrast,
    HighContrastLight,
}

impl ColorThemeKind {
    /// Color substituted for `currentColor` when none is configured.
    pub fn default_current_color(self) -> &'static str {
        match self {
            ColorThemeKind::Dark | ColorThemeKind::HighContrast => "white",
            ColorThemeKind::Light | ColorThemeKind::HighContrastLight => "black",
        }
    }

    /// Light and dark variants swapped.
    pub fn toggled(self) -> Self {
        match self {
            ColorThemeKind::Light => ColorThemeKind::Dark,
            ColorThemeKind::Dark => ColorThemeKind::Light,
            ColorThemeKind::HighContrast => ColorThemeKind::HighContrastLight,
            ColorThemeKind::HighContrastLight => ColorThemeKind::HighContrast,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown color theme kind {0}")]
pub struct UnknownThemeKind(u8);

impl TryFrom<u8> for ColorThemeKind {
    type Error = UnknownThemeKind;

    fn try_from(kind: u8) -> Result<Self, Self::Error> {
        match kind {
            1 => Ok(ColorThemeKind::Light),
            2 => Ok(ColorThemeKind::Dark),
            3 => Ok(ColorThemeKind::HighContrast),
            4 => Ok(ColorThemeKind::HighContrastLight),
            other => Err(UnknownThemeKind(other)),
        }
    }
}

impl From<ColorThemeKind> for u8 {
    fn from(kind: ColorThemeKind) -> u8 {
        match kind {
            ColorThemeKind::Light => 1,
            ColorThemeKind::Dark => 2,
            ColorThemeKind::HighContrast => 3,
            ColorThemeKind::HighContrastLight => 4,
        }
    }
}
