//! Decoration Orchestrator
//!
//! Reacts to editor events and decides when the engine recomputes
//! decorations. Edits to the active document are debounced; view switches,
//! theme and configuration changes refresh immediately.
//!
//! All state sits behind a single async mutex that is released before any
//! call into the host, and there is at most one pending debounce timer.
//! Publishes carry a revision so a stale render never replaces a newer one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_lsp::lsp_types::{Position, Range, Url};

use crate::core::document::Document;
use crate::decoration::engine::{Engine, RenderStats};
use crate::decoration::hover::{Decoration, HoverBuilder};
use crate::error::EngineError;
use crate::settings::{ColorThemeKind, Settings};

/// Delay between the last edit and the refresh it triggers
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// The editor side: settings lookup and the decoration sink
#[tower_lsp::async_trait]
pub trait Host: Send + Sync + 'static {
    /// Settings the client has for `scope`, or its global settings.
    async fn settings(&self, scope: Option<&Url>) -> Settings;

    /// Replace the decorations shown for `uri`.
    async fn publish(&self, uri: &Url, decorations: &[Decoration]);
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Settings below anything the client sends (settings file, CLI)
    pub base_settings: Settings,
    pub theme: ColorThemeKind,
    pub hover: HoverBuilder,
    pub debounce: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            base_settings: Settings::default(),
            theme: ColorThemeKind::default(),
            hover: HoverBuilder::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug)]
enum RefreshState {
    Idle,
    Debouncing {
        uri: Url,
        ticket: u64,
        timer: JoinHandle<()>,
    },
}

#[derive(Debug)]
struct State {
    engine: Option<Engine>,
    refresh: RefreshState,
    next_ticket: u64,
    documents: HashMap<Url, Arc<Document>>,
    published: HashMap<Url, Vec<Decoration>>,
    /// Latest revision handed to the host per document
    revisions: HashMap<Url, u64>,
    next_revision: u64,
    active: Option<Url>,
    visible: Option<Vec<Url>>,
    /// Set once the client reports active editors itself
    tracks_active_editor: bool,
    theme: ColorThemeKind,
    hover: HoverBuilder,
    base_settings: Settings,
}

impl State {
    fn cancel_pending(&mut self) {
        if let RefreshState::Debouncing { timer, .. } =
            std::mem::replace(&mut self.refresh, RefreshState::Idle)
        {
            timer.abort();
        }
    }

    fn next_revision(&mut self, uri: &Url) -> u64 {
        self.next_revision += 1;
        self.revisions.insert(uri.clone(), self.next_revision);
        self.next_revision
    }

    fn can_refresh(&self, uri: &Url) -> bool {
        self.engine.is_some() && self.documents.contains_key(uri)
    }

    /// Documents currently shown. Without reports from the client this is
    /// just the active one.
    fn visible_uris(&self) -> Vec<Url> {
        match &self.visible {
            Some(visible) => visible.clone(),
            None => self.active.iter().cloned().collect(),
        }
    }
}

struct Shared<H> {
    host: H,
    debounce: Duration,
    /// Never held across a host call
    state: Mutex<State>,
    /// Serializes publishing so an older result cannot overtake a newer one
    publishing: Mutex<()>,
}

/// Drives the engine from editor events
pub struct Orchestrator<H> {
    shared: Arc<Shared<H>>,
}

impl<H> Clone for Orchestrator<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<H: Host> Orchestrator<H> {
    pub fn new(host: H, options: OrchestratorOptions) -> Self {
        let state = State {
            engine: None,
            refresh: RefreshState::Idle,
            next_ticket: 0,
            documents: HashMap::new(),
            published: HashMap::new(),
            revisions: HashMap::new(),
            next_revision: 0,
            active: None,
            visible: None,
            tracks_active_editor: false,
            theme: options.theme,
            hover: options.hover,
            base_settings: options.base_settings,
        };
        Self {
            shared: Arc::new(Shared {
                host,
                debounce: options.debounce,
                state: Mutex::new(state),
                publishing: Mutex::new(()),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// Client details known only after the handshake. Takes effect at the
    /// next activation or reset.
    pub async fn set_client_context(&self, theme: ColorThemeKind, hover: HoverBuilder) {
        let mut state = self.shared.state.lock().await;
        state.theme = theme;
        state.hover = hover;
    }

    /// Start the engine and decorate the active document.
    ///
    /// Activating twice is a host integration bug and fails.
    pub async fn activate(&self) -> Result<(), EngineError> {
        if self.is_active().await {
            return Err(EngineError::AlreadyActive);
        }
        let client = self.shared.host.settings(None).await;

        let active = {
            let mut state = self.shared.state.lock().await;
            // Another activation may have won while settings were fetched
            if state.engine.is_some() {
                return Err(EngineError::AlreadyActive);
            }
            let settings = client.layered_over(&state.base_settings);
            state.engine = Some(Engine::new(&settings, state.theme, state.hover.clone()));
            state.active.clone()
        };
        log::info!("SVG preview engine activated");

        if let Some(active) = active {
            self.refresh(&active).await;
        }
        Ok(())
    }

    /// Stop the engine, cancel pending work and clear every decoration.
    /// Calling it again does nothing.
    pub async fn deactivate(&self) {
        let cleared = {
            let mut state = self.shared.state.lock().await;
            if state.engine.take().is_none() {
                return;
            }
            state.cancel_pending();
            let uris: Vec<Url> = state.published.drain().map(|(uri, _)| uri).collect();
            let mut cleared = Vec::with_capacity(uris.len());
            for uri in uris {
                let revision = state.next_revision(&uri);
                cleared.push((uri, revision));
            }
            cleared
        };
        for (uri, revision) in cleared {
            self.publish(&uri, revision, &[]).await;
        }
        log::info!("SVG preview engine deactivated");
    }

    pub async fn is_active(&self) -> bool {
        self.shared.state.lock().await.engine.is_some()
    }

    /// A document was opened, or reopened with a new language mode.
    pub async fn did_open(&self, uri: Url, text: String, version: i32, language_id: String) {
        let is_active = {
            let mut state = self.shared.state.lock().await;
            match state.documents.get(&uri) {
                Some(document) => document.reopen(text, version, language_id),
                None => {
                    let document = Document::new(uri.clone(), text, version, language_id);
                    state.documents.insert(uri.clone(), document);
                }
            }
            if !state.tracks_active_editor {
                state.active = Some(uri.clone());
            }
            let is_active = state.active.as_ref() == Some(&uri);
            if is_active {
                state.cancel_pending();
            }
            is_active
        };
        if is_active {
            self.refresh(&uri).await;
        }
    }

    /// Full-text change. Refreshes the active document after the debounce
    /// window; a newer edit restarts the window.
    pub async fn did_change(&self, uri: Url, text: String, version: i32) {
        let mut state = self.shared.state.lock().await;
        let Some(document) = state.documents.get(&uri) else {
            log::warn!("Change for unknown document {}", uri);
            return;
        };
        document.replace_text(text, version);

        if !state.tracks_active_editor {
            state.active = Some(uri.clone());
        }
        if state.engine.is_none() || state.active.as_ref() != Some(&uri) {
            return;
        }
        self.schedule(&mut state, uri);
    }

    pub async fn did_close(&self, uri: &Url) {
        let mut state = self.shared.state.lock().await;
        // The cache only holds a weak handle; dropping ours releases it
        state.documents.remove(uri);
        state.published.remove(uri);
        state.revisions.remove(uri);
        if matches!(&state.refresh, RefreshState::Debouncing { uri: pending, .. } if pending == uri) {
            state.cancel_pending();
        }
        if !state.tracks_active_editor && state.active.as_ref() == Some(uri) {
            state.active = None;
        }
    }

    /// The focused editor changed (`None` when no editor has focus).
    pub async fn active_editor_changed(&self, uri: Option<Url>) {
        {
            let mut state = self.shared.state.lock().await;
            state.tracks_active_editor = true;
            state.active = uri.clone();
            state.cancel_pending();
        }
        if let Some(uri) = uri {
            self.refresh(&uri).await;
        }
    }

    pub async fn visible_editors_changed(&self, uris: Vec<Url>) {
        let mut state = self.shared.state.lock().await;
        state.visible = Some(uris);
    }

    pub async fn color_theme_changed(&self, theme: ColorThemeKind) {
        self.shared.state.lock().await.theme = theme;
        self.reset().await;
    }

    pub async fn configuration_changed(&self) {
        self.reset().await;
    }

    /// Replace the settings below the client's (settings file, CLI) and
    /// apply them like any configuration change.
    pub async fn set_base_settings(&self, settings: Settings) {
        self.shared.state.lock().await.base_settings = settings;
        self.reset().await;
    }

    /// Decoration under `position`, from the last refresh of `uri`.
    pub async fn decoration_at(&self, uri: &Url, position: Position) -> Option<Decoration> {
        let state = self.shared.state.lock().await;
        state
            .published
            .get(uri)?
            .iter()
            .find(|decoration| range_contains(&decoration.range, position))
            .cloned()
    }

    pub async fn decorations(&self, uri: &Url) -> Vec<Decoration> {
        let state = self.shared.state.lock().await;
        state.published.get(uri).cloned().unwrap_or_default()
    }

    /// Document awaiting a debounced refresh, if any.
    pub async fn pending_refresh(&self) -> Option<Url> {
        let state = self.shared.state.lock().await;
        match &state.refresh {
            RefreshState::Idle => None,
            RefreshState::Debouncing { uri, .. } => Some(uri.clone()),
        }
    }

    pub async fn stats(&self) -> Option<RenderStats> {
        let state = self.shared.state.lock().await;
        state.engine.as_ref().map(Engine::stats)
    }

    /// Whether the engine holds cached renders for `uri`.
    pub async fn is_cached(&self, uri: &Url) -> bool {
        let state = self.shared.state.lock().await;
        match (&state.engine, state.documents.get(uri)) {
            (Some(engine), Some(document)) => engine.cache().contains(document),
            _ => false,
        }
    }

    /// Rebuild preset and size, drop the cache, and redo visible documents
    /// that had renders before.
    async fn reset(&self) {
        if !self.is_active().await {
            return;
        }
        let client = self.shared.host.settings(None).await;

        let stale: Vec<Url> = {
            let mut state = self.shared.state.lock().await;
            let settings = client.layered_over(&state.base_settings);
            let theme = state.theme;
            let Some(engine) = state.engine.as_mut() else {
                return;
            };
            let previous = engine.reset(&settings, theme);
            state
                .visible_uris()
                .into_iter()
                .filter(|uri| {
                    state
                        .documents
                        .get(uri)
                        .is_some_and(|document| previous.contains(document))
                })
                .collect()
        };
        for uri in stale {
            self.refresh(&uri).await;
        }
    }

    fn schedule(&self, state: &mut State, uri: Url) {
        state.cancel_pending();
        state.next_ticket += 1;
        let ticket = state.next_ticket;

        let this = self.clone();
        let delay = self.shared.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.fire(ticket).await;
        });
        state.refresh = RefreshState::Debouncing { uri, ticket, timer };
    }

    async fn fire(&self, ticket: u64) {
        let uri = {
            let mut state = self.shared.state.lock().await;
            let uri = match &state.refresh {
                RefreshState::Debouncing {
                    uri,
                    ticket: pending,
                    ..
                } if *pending == ticket => uri.clone(),
                // Superseded while waiting for the lock
                _ => return,
            };
            state.refresh = RefreshState::Idle;
            uri
        };
        self.refresh(&uri).await;
    }

    /// Render `uri` against its current text and hand the result to the
    /// host. Settings are fetched before the state lock is taken.
    async fn refresh(&self, uri: &Url) {
        if !self.shared.state.lock().await.can_refresh(uri) {
            return;
        }
        let scoped = self.shared.host.settings(Some(uri)).await;

        let (revision, decorations) = {
            let mut state = self.shared.state.lock().await;
            // Closed or deactivated while settings were fetched
            let Some(document) = state.documents.get(uri).cloned() else {
                return;
            };
            let settings = scoped.layered_over(&state.base_settings);
            let Some(engine) = state.engine.as_mut() else {
                return;
            };
            let decorations = engine.refresh(&document, &settings);
            state.published.insert(uri.clone(), decorations.clone());
            (state.next_revision(uri), decorations)
        };
        self.publish(uri, revision, &decorations).await;
    }

    /// Publish unless a newer revision of `uri` was produced meanwhile or
    /// the document was closed.
    async fn publish(&self, uri: &Url, revision: u64, decorations: &[Decoration]) {
        let _publishing = self.shared.publishing.lock().await;
        let latest = self.shared.state.lock().await.revisions.get(uri).copied();
        if latest != Some(revision) {
            log::debug!("Skipping superseded decorations for {}", uri);
            return;
        }
        self.shared.host.publish(uri, decorations).await;
    }
}

fn range_contains(range: &Range, position: Position) -> bool {
    let at = (position.line, position.character);
    (range.start.line, range.start.character) <= at && at <= (range.end.line, range.end.character)
}
