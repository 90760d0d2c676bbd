//! SVG handling
//!
//! Markup tree plus the root attribute rewrite that produces preview images.

pub mod transform;
pub mod tree;

pub use transform::{SVG_NAMESPACE, Transformer};
pub use tree::{Attributes, Element, Fragment, Node};
