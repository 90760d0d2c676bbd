//! Per-Document Render Cache
//!
//! Maps a document, by identity, to the renders of its markup snippets keyed
//! by normalized text. Only a [`Weak`] handle to the document is kept: once
//! the document is dropped its entry reads as absent and is pruned, so the
//! cache never keeps a closed document alive.
//!
//! Each refresh of a document builds a new [`Generation`] from the previous
//! one and [commits](DocumentCache::commit) it back.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::core::document::Document;

/// Result of rendering one normalized snippet
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// Self-contained image reference
    Rendered(Arc<str>),
    /// Rendering failed before; fail again without retrying
    Failed,
}

pub type RenderMap = HashMap<String, CacheEntry>;

#[derive(Debug)]
struct CachedDocument {
    document: Weak<Document>,
    renders: Arc<RenderMap>,
}

/// What [`DocumentCache::commit`] did with a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The generation became the document's map
    Replaced,
    /// Nothing material changed; the previous map was kept
    Unchanged,
    /// The generation was empty and the previous map was dropped
    Removed,
    /// Empty generation and nothing cached before
    Skipped,
}

/// Renders cached per document identity
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: HashMap<usize, CachedDocument>,
}

/// Renders collected during one refresh of a document
#[derive(Debug)]
pub struct Generation {
    key: usize,
    document: Weak<Document>,
    previous: Option<Arc<RenderMap>>,
    next: RenderMap,
    fresh: bool,
}

fn identity(document: &Arc<Document>) -> usize {
    Arc::as_ptr(document) as usize
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous-generation map for a live document.
    fn renders(&self, document: &Arc<Document>) -> Option<&Arc<RenderMap>> {
        let cached = self.documents.get(&identity(document))?;
        // A dead handle at the same address belongs to a dropped document
        let live = cached.document.upgrade()?;
        Arc::ptr_eq(&live, document).then_some(&cached.renders)
    }

    pub fn get(&self, document: &Arc<Document>, key: &str) -> Option<&CacheEntry> {
        self.renders(document)?.get(key)
    }

    pub fn contains(&self, document: &Arc<Document>) -> bool {
        self.renders(document).is_some()
    }

    /// Number of cached snippets for a document.
    pub fn entry_count(&self, document: &Arc<Document>) -> Option<usize> {
        self.renders(document).map(|renders| renders.len())
    }

    /// Number of live documents with cached renders.
    pub fn len(&self) -> usize {
        self.documents
            .values()
            .filter(|cached| cached.document.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn begin_generation(&mut self, document: &Arc<Document>) -> Generation {
        self.prune();
        Generation {
            key: identity(document),
            document: Arc::downgrade(document),
            previous: self.renders(document).cloned(),
            next: RenderMap::new(),
            fresh: false,
        }
    }

    /// Store a finished generation.
    ///
    /// The previous map is replaced only when the generation holds an entry
    /// the previous one did not, or the number of entries changed. An empty
    /// generation removes the document altogether.
    pub fn commit(&mut self, generation: Generation) -> CommitOutcome {
        let Generation {
            key,
            document,
            previous,
            next,
            fresh,
        } = generation;

        if document.strong_count() == 0 {
            self.documents.remove(&key);
            return CommitOutcome::Skipped;
        }

        if next.is_empty() {
            return match previous {
                Some(_) => {
                    self.documents.remove(&key);
                    CommitOutcome::Removed
                }
                None => CommitOutcome::Skipped,
            };
        }

        let changed = fresh || previous.as_ref().map(|renders| renders.len()) != Some(next.len());
        if !changed {
            return CommitOutcome::Unchanged;
        }

        self.documents.insert(
            key,
            CachedDocument {
                document,
                renders: Arc::new(next),
            },
        );
        CommitOutcome::Replaced
    }

    pub fn remove(&mut self, document: &Arc<Document>) {
        if self.contains(document) {
            self.documents.remove(&identity(document));
        }
    }

    /// Drop entries whose document is gone.
    fn prune(&mut self) {
        self.documents
            .retain(|_, cached| cached.document.strong_count() > 0);
    }
}

impl Generation {
    /// Entry for `key` recorded earlier in this generation, or carried over
    /// from the previous one.
    pub fn lookup(&self, key: &str) -> Option<&CacheEntry> {
        self.next
            .get(key)
            .or_else(|| self.previous.as_ref()?.get(key))
    }

    /// Record the entry for `key`. Keys unknown to the previous generation
    /// mark the generation as fresh.
    pub fn record(&mut self, key: String, entry: CacheEntry) {
        let known = self
            .previous
            .as_ref()
            .is_some_and(|renders| renders.contains_key(&key));
        if !known {
            self.fresh = true;
        }
        self.next.insert(key, entry);
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}
