//! Document Management
//!
//! Open text buffers with a stable identity. Edits replace the content of a
//! [`Document`] in place, so the same `Arc<Document>` keeps identifying the
//! buffer for its whole open lifetime.

use std::sync::{Arc, PoisonError, RwLock};

use tower_lsp::lsp_types::{Position, Range, Url};

/// An open text buffer owned by the host.
#[derive(Debug)]
pub struct Document {
    uri: Url,
    content: RwLock<Arc<TextSnapshot>>,
}

/// Immutable view of a document's text at one version.
#[derive(Debug)]
pub struct TextSnapshot {
    pub text: String,
    pub version: i32,
    pub language_id: String,
    lines: LineIndex,
}

impl Document {
    pub fn new(uri: Url, text: String, version: i32, language_id: String) -> Arc<Self> {
        Arc::new(Self {
            uri,
            content: RwLock::new(Arc::new(TextSnapshot::new(text, version, language_id))),
        })
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Current content. Cheap: the snapshot is shared, not copied.
    pub fn snapshot(&self) -> Arc<TextSnapshot> {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole text, keeping the language mode.
    pub fn replace_text(&self, text: String, version: i32) {
        let mut content = self.content.write().unwrap_or_else(PoisonError::into_inner);
        let language_id = content.language_id.clone();
        *content = Arc::new(TextSnapshot::new(text, version, language_id));
    }

    /// Replace text and language mode, as happens when a buffer is reopened.
    pub fn reopen(&self, text: String, version: i32, language_id: String) {
        let mut content = self.content.write().unwrap_or_else(PoisonError::into_inner);
        *content = Arc::new(TextSnapshot::new(text, version, language_id));
    }
}

impl TextSnapshot {
    pub fn new(text: String, version: i32, language_id: String) -> Self {
        let lines = LineIndex::new(&text);
        Self {
            text,
            version,
            language_id,
            lines,
        }
    }

    /// Convert a byte offset into an LSP position (UTF-16 columns).
    pub fn position_at(&self, offset: usize) -> Position {
        self.lines.position_at(&self.text, offset)
    }

    /// Range covering `len` bytes starting at byte `start`.
    pub fn range_of(&self, start: usize, len: usize) -> Range {
        Range::new(self.position_at(start), self.position_at(start + len))
    }
}

/// Byte offsets of line starts.
#[derive(Debug, Clone)]
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { starts }
    }

    fn position_at(&self, text: &str, offset: usize) -> Position {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.starts[line];
        let character = text[line_start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }
}
