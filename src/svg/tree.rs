//! Order-preserving markup tree
//!
//! A small element tree over `quick-xml` events. Attribute values and text
//! are kept exactly as written in the source (still escaped), so a parse
//! followed by [`Fragment::serialize`] reproduces the input apart from
//! self-closing empty elements. Attribute order is preserved.

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesPI, BytesStart, BytesText, Event};
use quick_xml::escape::{escape, unescape};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Why a piece of markup could not be turned into a tree
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("xml syntax error: {0}")]
    Syntax(String),
    #[error("malformed markup: {0}")]
    Malformed(&'static str),
}

/// Ordered attribute list. Values are stored escaped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw (escaped) value of an attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value with entities resolved. Values with broken entities
    /// are returned as written.
    pub fn get_unescaped(&self, name: &str) -> Option<Cow<'_, str>> {
        let raw = self.get(name)?;
        Some(unescape(raw).unwrap_or(Cow::Borrowed(raw)))
    }

    /// Set an already-escaped value. An existing attribute keeps its
    /// position; a new one is appended.
    pub fn set_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Set a plain-text value, escaping it for markup.
    pub fn set(&mut self, name: impl Into<String>, value: &str) {
        self.set_raw(name, escape(value).into_owned());
    }

    /// Overlay every attribute of `other`, in its order.
    pub fn merge(&mut self, other: Attributes) {
        for (name, value) in other.entries {
            self.set_raw(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// A markup element with its attributes and children in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped character data, entity references included
    Text(String),
    CData(String),
    Comment(String),
    /// Processing instruction content between `<?` and `?>`
    Instruction(String),
}

/// Top-level sequence of nodes parsed from a snippet
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Parse markup into a fragment.
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(markup);
        let mut top: Vec<Node> = Vec::new();
        let mut open: Vec<Element> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ParseError::Syntax(e.to_string()))?;
            let node = match event {
                Event::Start(start) => {
                    open.push(element_from_start(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or(ParseError::Malformed("closing tag without opening tag"))?;
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(element_from_start(&start)?),
                Event::Text(text) => Node::Text(utf8(&text)?.to_string()),
                Event::GeneralRef(reference) => Node::Text(format!("&{};", utf8(&reference)?)),
                Event::CData(data) => Node::CData(utf8(&data)?.to_string()),
                Event::Comment(comment) => Node::Comment(utf8(&comment)?.to_string()),
                Event::PI(pi) => Node::Instruction(utf8(&pi)?.to_string()),
                Event::Decl(_) => return Err(ParseError::Malformed("unexpected xml declaration")),
                Event::DocType(_) => return Err(ParseError::Malformed("unexpected doctype")),
                Event::Eof => break,
            };
            let siblings = match open.last_mut() {
                Some(parent) => &mut parent.children,
                None => &mut top,
            };
            push_node(siblings, node);
        }

        if !open.is_empty() {
            return Err(ParseError::Malformed("unclosed element"));
        }
        Ok(Self { nodes: top })
    }

    /// First top-level node, if it is an element.
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        match self.nodes.first_mut() {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Write the fragment back to markup. Elements without children are
    /// written self-closing.
    pub fn serialize(&self) -> std::io::Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|_| ParseError::Malformed("invalid utf-8"))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let name = utf8(start.name().as_ref())?.to_string();
    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::Syntax(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = utf8(&attr.value)?;
        // Values are always written double-quoted
        attributes.set_raw(key, value.replace('"', "&quot;"));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Text split around entity references is joined back into one node.
fn push_node(siblings: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node {
        if let Some(Node::Text(previous)) = siblings.last_mut() {
            previous.push_str(text);
            return;
        }
    }
    siblings.push(node);
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> std::io::Result<()> {
    match node {
        Node::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (name, value) in element.attributes.iter() {
                // Raw tuple form: the value is already escaped
                start.push_attribute((name.as_bytes(), value.as_bytes()));
            }
            if element.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                let end = start.to_end().into_owned();
                writer.write_event(Event::Start(start))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(end))?;
            }
        }
        Node::Text(text) => writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?
        }
        Node::Instruction(content) => writer.write_event(Event::PI(BytesPI::new(content.as_str())))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(markup: &str) -> String {
        let fragment = Fragment::parse(markup).expect("parse");
        String::from_utf8(fragment.serialize().expect("serialize")).expect("utf-8")
    }

    #[test]
    fn test_parse_preserves_attribute_order() {
        let mut fragment =
            Fragment::parse(r#"<svg z="1" a="2" m="3"><g/></svg>"#).expect("parse");
        let root = fragment.root_mut().expect("root");
        let names: Vec<_> = root.attributes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_round_trip_keeps_markup() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 50 50"><path d="M0 0" fill="none"/><text x="1">a &amp; b &lt; c</text><!-- note --><![CDATA[x < y]]></svg>"#;
        assert_eq!(round_trip(markup), markup);
    }

    #[test]
    fn test_empty_elements_become_self_closing() {
        assert_eq!(round_trip(r#"<svg a="1"></svg>"#), r#"<svg a="1"/>"#);
        assert_eq!(round_trip(r#"<svg a="1"><g></g></svg>"#), r#"<svg a="1"><g/></svg>"#);
    }

    #[test]
    fn test_single_quoted_values_are_rewritten_with_double_quotes() {
        assert_eq!(round_trip("<svg a='x'/>"), r#"<svg a="x"/>"#);
        assert_eq!(
            round_trip(r#"<svg a='say "hi"'/>"#),
            r#"<svg a="say &quot;hi&quot;"/>"#
        );
    }

    #[test]
    fn test_set_keeps_position_and_escapes() {
        let mut attributes = Attributes::new();
        attributes.set("color", "black");
        attributes.set("xmlns", "ns");
        attributes.set("color", "a\"b<");
        let pairs: Vec<_> = attributes.iter().collect();
        assert_eq!(pairs, vec![("color", "a&quot;b&lt;"), ("xmlns", "ns")]);
        assert_eq!(attributes.get_unescaped("color").as_deref(), Some("a\"b<"));
    }

    #[test]
    fn test_parse_rejects_malformed_markup() {
        assert!(Fragment::parse(r#"<svg a="></svg>"#).is_err());
        assert!(Fragment::parse("<svg ><!--</svg>").is_err());
        assert!(Fragment::parse("<svg a=''><g></svg>").is_err());
        assert!(Fragment::parse("<svg a='' a=''/>").is_err());
        assert!(Fragment::parse("<svg a=''>").is_err());
    }

    #[test]
    fn test_root_mut_requires_leading_element() {
        let mut fragment = Fragment::parse("text<svg a=''/>").expect("parse");
        assert!(fragment.root_mut().is_none());
    }
}
