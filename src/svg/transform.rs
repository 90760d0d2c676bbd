//! SVG Attribute Transformer
//!
//! Turns a normalized `<svg>` snippet into a self-contained
//! `data:image/svg+xml;base64,…` reference with the preset and target size
//! applied to the root element.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::core::preset::{Preset, format_number};
use crate::error::RenderError;
use crate::svg::tree::{Attributes, Element, Fragment};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

const SVG_DATA_PREFIX: &str = "data:image/svg+xml;base64,";

/// Renders snippets with one preset and target size
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    preset: Preset,
    size: Option<f64>,
}

impl Transformer {
    pub fn new(preset: Preset, size: Option<f64>) -> Self {
        Self { preset, size }
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn size(&self) -> Option<f64> {
        self.size
    }

    /// Render a normalized snippet to a data reference.
    pub fn render(&self, normalized: &str) -> Result<String, RenderError> {
        let mut fragment = Fragment::parse(normalized).map_err(|_| RenderError::Ignored)?;
        let root = fragment.root_mut().ok_or(RenderError::Ignored)?;
        check_root(root)?;
        self.rewrite_root(root);

        let markup = fragment.serialize()?;
        Ok(format!("{}{}", SVG_DATA_PREFIX, BASE64.encode(markup)))
    }

    /// Merge preset < source attributes < computed size onto the root.
    fn rewrite_root(&self, root: &mut Element) {
        let size = self.size.map(|target| {
            fit_size(
                parse_dimension(root.attributes.get_unescaped("width").as_deref()),
                parse_dimension(root.attributes.get_unescaped("height").as_deref()),
                target,
            )
        });

        let mut merged = Attributes::new();
        for (name, value) in self.preset.iter() {
            merged.set(name, value);
        }
        merged.merge(std::mem::take(&mut root.attributes));
        if let Some((width, height)) = size {
            merged.set("width", &format_number(width));
            merged.set("height", &format_number(height));
        }
        root.attributes = merged;
    }
}

fn check_root(root: &Element) -> Result<(), RenderError> {
    if root.name != "svg" || root.attributes.is_empty() {
        return Err(RenderError::Ignored);
    }
    match root.attributes.get_unescaped("xmlns") {
        Some(namespace) if namespace == SVG_NAMESPACE => Ok(()),
        _ => Err(RenderError::Ignored),
    }
}

/// Read a `width`/`height` value. Missing, empty, zero and non-numeric
/// values (`100px`, `50%`) count as absent.
pub fn parse_dimension(value: Option<&str>) -> Option<f64> {
    let number: f64 = value?.trim().parse().ok()?;
    (number.is_finite() && number != 0.0).then_some(number)
}

/// Fit the original dimensions into a `target` box.
///
/// Without both dimensions the aspect ratio is unknown and the image is
/// shown as a `target` square. Otherwise the longer side becomes `target`
/// and the other keeps the ratio.
pub fn fit_size(width: Option<f64>, height: Option<f64>, target: f64) -> (f64, f64) {
    match (width, height) {
        (Some(width), Some(height)) if width < height => (width / height * target, target),
        (Some(width), Some(height)) => (target, height / width * target),
        _ => (target, target),
    }
}
