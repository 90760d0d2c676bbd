//! SVG presentation attributes
//!
//! The closed set of attribute names a user preset may inject onto the
//! root `<svg>` element. Anything else in a preset is dropped.
//!
//! See <https://developer.mozilla.org/en-US/docs/Web/SVG/Attribute#presentation_attributes>.

/// Every recognized presentation attribute, in alphabetical order.
pub const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "alignment-baseline",
    "baseline-shift",
    "clip",
    "clip-path",
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-rendering",
    "cursor",
    "d",
    "direction",
    "display",
    "dominant-baseline",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flood-color",
    "flood-opacity",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "glyph-orientation-horizontal",
    "glyph-orientation-vertical",
    "image-rendering",
    "letter-spacing",
    "lighting-color",
    "marker-end",
    "marker-mid",
    "marker-start",
    "mask",
    "opacity",
    "overflow",
    "pointer-events",
    "shape-rendering",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "transform",
    "transform-origin",
    "unicode-bidi",
    "vector-effect",
    "visibility",
    "word-spacing",
    "writing-mode",
];

/// Returns `true` when `name` is an SVG presentation attribute.
///
/// Matching is exact: names are lowercase and hyphenated, so `Fill` or
/// `strokeWidth` are rejected.
pub fn is_presentation_attribute(name: &str) -> bool {
    PRESENTATION_ATTRIBUTES.binary_search(&name).is_ok()
}
