//! Snippet Scanner
//!
//! Finds inline `<svg …>…</svg>` markup and `data:image/…;base64,…`
//! references in a document's text.

use std::sync::LazyLock;

use regex::Regex;

/// Markup first, then bare data references. `(?s)` lets markup span lines.
/// The word boundary before `data:` is ASCII-only, so a reference right
/// after a CJK or accented letter still matches.
static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)(<svg\s[^>]*>.*?</svg>)|(?-u:\b)data:image/[A-Za-z0-9_]+(?:\+[A-Za-z0-9_]+)?;base64,[A-Za-z0-9+/]+=*",
    )
    .expect("snippet pattern is valid")
});

static TAG_WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+|\s+<").expect("whitespace pattern is valid"));

/// Byte range of a snippet within the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetKind {
    /// Inline `<svg …>` markup, rendered through the transformer
    Markup,
    /// A `data:image/…;base64,…` reference, shown as-is
    DataReference,
}

/// A candidate image reference found in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet<'t> {
    pub span: Span,
    pub text: &'t str,
    pub kind: SnippetKind,
}

impl Snippet<'_> {
    pub fn is_data_reference(&self) -> bool {
        self.kind == SnippetKind::DataReference
    }
}

/// Lazy iterator over the snippets of a text, in document order.
///
/// Cloning yields an independent iterator resuming at the same position.
#[derive(Debug, Clone)]
pub struct Snippets<'t> {
    text: &'t str,
    pos: usize,
}

/// Scan `text` for snippets.
pub fn scan(text: &str) -> Snippets<'_> {
    Snippets { text, pos: 0 }
}

impl<'t> Iterator for Snippets<'t> {
    type Item = Snippet<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() {
            return None;
        }
        let caps = SNIPPET_RE.captures_at(self.text, self.pos)?;
        let whole = caps.get(0)?;
        // Neither alternative can match empty, so this always advances
        self.pos = whole.end();

        let kind = if caps.get(1).is_some() {
            SnippetKind::Markup
        } else {
            SnippetKind::DataReference
        };

        Some(Snippet {
            span: Span {
                start: whole.start(),
                len: whole.len(),
            },
            text: whole.as_str(),
            kind,
        })
    }
}

/// Cache key for a markup snippet: whitespace right after `>` or right
/// before `<` is dropped, so reindenting markup does not force a re-render.
pub fn normalize(markup: &str) -> String {
    TAG_WHITESPACE_RE
        .replace_all(markup, |caps: &regex::Captures| {
            let matched = &caps[0];
            if matched.starts_with('>') {
                ">"
            } else {
                "<"
            }
        })
        .into_owned()
}
