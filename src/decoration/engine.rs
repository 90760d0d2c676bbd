//! Preview engine
//!
//! Holds the current preset, target size and render cache, and turns a
//! document's text into decorations. Everything here is synchronous; timing
//! and host interaction live in the orchestrator.

use std::sync::Arc;

use crate::core::cache::{CacheEntry, DocumentCache, Generation};
use crate::core::document::Document;
use crate::core::preset::Preset;
use crate::core::scanner::{Snippet, SnippetKind, normalize, scan};
use crate::decoration::hover::{Decoration, HoverBuilder};
use crate::settings::{ColorThemeKind, Settings};
use crate::svg::Transformer;

/// Counters over the engine's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Snippets sent through the transformer
    pub transforms: usize,
    /// Snippets answered from the cache, failures included
    pub cache_hits: usize,
    /// Transforms that failed
    pub failures: usize,
}

/// Engine state for one activation
#[derive(Debug)]
pub struct Engine {
    transformer: Transformer,
    cache: DocumentCache,
    hover: HoverBuilder,
    stats: RenderStats,
}

impl Engine {
    pub fn new(settings: &Settings, theme: ColorThemeKind, hover: HoverBuilder) -> Self {
        Self {
            transformer: transformer_for(settings, theme),
            cache: DocumentCache::new(),
            hover,
            stats: RenderStats::default(),
        }
    }

    /// Rebuild the preset and size and start over with an empty cache.
    /// Returns the discarded cache.
    pub fn reset(&mut self, settings: &Settings, theme: ColorThemeKind) -> DocumentCache {
        self.transformer = transformer_for(settings, theme);
        std::mem::take(&mut self.cache)
    }

    pub fn preset(&self) -> &Preset {
        self.transformer.preset()
    }

    pub fn size(&self) -> Option<f64> {
        self.transformer.size()
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Decorations for the current text of `document`, in document order.
    ///
    /// With previews disabled for the document this returns nothing and
    /// leaves the cache alone.
    pub fn refresh(&mut self, document: &Arc<Document>, settings: &Settings) -> Vec<Decoration> {
        if settings.is_disabled() {
            return Vec::new();
        }

        let snapshot = document.snapshot();
        let mut generation = self.cache.begin_generation(document);
        let mut decorations = Vec::new();

        for snippet in scan(&snapshot.text) {
            if let Some(image) = self.render_snippet(&snippet, &mut generation) {
                let range = snapshot.range_of(snippet.span.start, snippet.span.len);
                decorations.push(self.hover.decoration(range, snippet.kind, &image));
            }
        }

        let outcome = self.cache.commit(generation);
        log::debug!(
            "Refreshed {} (v{}): {} decorations, cache {:?}, {:?}",
            document.uri(),
            snapshot.version,
            decorations.len(),
            outcome,
            self.stats
        );
        decorations
    }

    fn render_snippet(&mut self, snippet: &Snippet<'_>, generation: &mut Generation) -> Option<Arc<str>> {
        if snippet.kind == SnippetKind::DataReference {
            return Some(Arc::from(snippet.text));
        }

        let key = normalize(snippet.text);
        if let Some(entry) = generation.lookup(&key).cloned() {
            self.stats.cache_hits += 1;
            let image = match &entry {
                CacheEntry::Rendered(image) => Some(image.clone()),
                CacheEntry::Failed => None,
            };
            generation.record(key, entry);
            return image;
        }

        self.stats.transforms += 1;
        match self.transformer.render(&key) {
            Ok(image) => {
                let image: Arc<str> = Arc::from(image);
                generation.record(key, CacheEntry::Rendered(image.clone()));
                Some(image)
            }
            Err(err) => {
                self.stats.failures += 1;
                if !err.is_ignored() {
                    log::error!("Failed to render SVG preview: {}", err);
                }
                generation.record(key, CacheEntry::Failed);
                None
            }
        }
    }
}

fn transformer_for(settings: &Settings, theme: ColorThemeKind) -> Transformer {
    Transformer::new(Preset::from_settings(settings, theme), settings.target_size())
}
