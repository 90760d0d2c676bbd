//! Shared helpers for orchestrator-level tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::Notify;
use tower_lsp::lsp_types::Url;

use svg_preview_language_server::decoration::{
    Decoration, HoverBlockKind, Host, Orchestrator, OrchestratorOptions,
};
use svg_preview_language_server::settings::{ColorThemeKind, Settings};

pub const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#;

/// Host that serves fixed settings and records every publish
#[derive(Default)]
pub struct RecordingHost {
    global: Mutex<Settings>,
    scoped: Mutex<HashMap<Url, Settings>>,
    published: Mutex<Vec<(Url, Vec<Decoration>)>>,
    /// Next per-document settings lookup waits for `release`
    hold_next: AtomicBool,
    holding: AtomicBool,
    released: Notify,
}

impl RecordingHost {
    pub fn with_settings(settings: Settings) -> Self {
        let host = Self::default();
        host.set_global(settings);
        host
    }

    pub fn set_global(&self, settings: Settings) {
        *self.global.lock().unwrap() = settings;
    }

    pub fn set_scoped(&self, uri: &Url, settings: Settings) {
        self.scoped.lock().unwrap().insert(uri.clone(), settings);
    }

    pub fn hold_next_scoped_lookup(&self) {
        self.hold_next.store(true, Ordering::SeqCst);
    }

    pub fn is_holding(&self) -> bool {
        self.holding.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    pub fn publish_count(&self, uri: &Url) -> usize {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(published, _)| published == uri)
            .count()
    }

    pub fn last_published(&self, uri: &Url) -> Option<Vec<Decoration>> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(published, _)| published == uri)
            .map(|(_, decorations)| decorations.clone())
    }
}

#[tower_lsp::async_trait]
impl Host for RecordingHost {
    async fn settings(&self, scope: Option<&Url>) -> Settings {
        if scope.is_some() && self.hold_next.swap(false, Ordering::SeqCst) {
            self.holding.store(true, Ordering::SeqCst);
            self.released.notified().await;
            self.holding.store(false, Ordering::SeqCst);
        }
        let global = self.global.lock().unwrap().clone();
        let scoped = scope.and_then(|uri| self.scoped.lock().unwrap().get(uri).cloned());
        match scoped {
            Some(settings) => settings.layered_over(&global),
            None => global,
        }
    }

    async fn publish(&self, uri: &Url, decorations: &[Decoration]) {
        self.published
            .lock()
            .unwrap()
            .push((uri.clone(), decorations.to_vec()));
    }
}

pub fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{}", name)).unwrap()
}

pub fn orchestrator(host: RecordingHost) -> Orchestrator<RecordingHost> {
    Orchestrator::new(host, OrchestratorOptions::default())
}

pub fn orchestrator_with_theme(host: RecordingHost, theme: ColorThemeKind) -> Orchestrator<RecordingHost> {
    Orchestrator::new(
        host,
        OrchestratorOptions {
            theme,
            ..Default::default()
        },
    )
}

/// Decoded markup of a decoration's image block.
pub fn rendered_markup(decoration: &Decoration) -> String {
    let block = decoration
        .hover_message
        .iter()
        .find(|block| block.kind == HoverBlockKind::Image)
        .expect("image block");
    let url = block
        .value
        .strip_prefix("![](")
        .and_then(|rest| rest.strip_suffix(')'))
        .expect("markdown image");
    let payload = url
        .strip_prefix("data:image/svg+xml;base64,")
        .expect("svg data reference");
    String::from_utf8(BASE64.decode(payload).expect("base64")).expect("utf-8")
}
