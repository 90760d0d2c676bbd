use std::sync::{Mutex, PoisonError};

use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::Config;
use crate::decoration::{HoverBuilder, Messages, Orchestrator, OrchestratorOptions};
use crate::lsp::handlers::{HandleConfiguration, HandleEditorEvents, HandleHover};
use crate::lsp::host::ClientHost;
use crate::lsp::notifications::{
    ActiveEditorParams, ColorThemeParams, InitializationOptions, VisibleEditorsParams,
};
use crate::settings::Settings;
use crate::watch::{SettingsWatcher, watch_settings_file};

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub orchestrator: Orchestrator<ClientHost>,
    pub config: Config,
    watcher: Mutex<Option<SettingsWatcher>>,
}

impl Backend {
    pub fn new(client: Client, config: Config, base_settings: Settings) -> Self {
        let host = ClientHost::new(client.clone(), config.section());
        let orchestrator = Orchestrator::new(
            host,
            OrchestratorOptions {
                base_settings,
                debounce: config.debounce,
                hover: HoverBuilder::new(Messages::ENGLISH, config.extension_id.clone()),
                ..Default::default()
            },
        );

        Self {
            client,
            orchestrator,
            config,
            watcher: Mutex::new(None),
        }
    }

    /// Custom notification: focused editor changed
    pub async fn did_change_active_editor(&self, params: ActiveEditorParams) {
        self.handle_active_editor(params).await;
    }

    /// Custom notification: visible editors changed
    pub async fn did_change_visible_editors(&self, params: VisibleEditorsParams) {
        self.handle_visible_editors(params).await;
    }

    /// Custom notification: color theme changed
    pub async fn did_change_color_theme(&self, params: ColorThemeParams) {
        self.handle_color_theme(params).await;
    }

    fn start_watching(&self) {
        let Some(path) = self.config.settings_path.clone() else {
            return;
        };
        match watch_settings_file(
            path,
            self.config.cli_settings.clone(),
            self.orchestrator.clone(),
        ) {
            Ok(watcher) => {
                log::info!("Watching settings file {}", watcher.path().display());
                *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(watcher);
            }
            Err(e) => log::warn!("Settings file will not be reloaded: {:#}", e),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        let options = InitializationOptions::from_value(params.initialization_options);

        let pull_configuration = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.configuration)
            .unwrap_or(false);
        let host = self.orchestrator.host();
        host.set_pull_configuration(pull_configuration);
        if let Some(settings) = options.settings {
            host.set_pushed_settings(settings);
        }

        let extension_id = options
            .extension_id
            .unwrap_or_else(|| self.config.extension_id.clone());
        let hover = HoverBuilder::new(Messages::for_locale(params.locale.as_deref()), extension_id);
        self.orchestrator
            .set_client_context(options.color_theme.unwrap_or_default(), hover)
            .await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        if let Err(e) = self.orchestrator.activate().await {
            log::error!("{}", e);
            self.client.log_message(MessageType::ERROR, e.to_string()).await;
            return;
        }
        self.start_watching();
        self.client
            .log_message(MessageType::INFO, "svg-preview-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        self.orchestrator.deactivate().await;
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }

    async fn hover(&self, params: HoverParams) -> tower_lsp::jsonrpc::Result<Option<Hover>> {
        self.handle_hover(params).await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.orchestrator
            .did_open(
                document.uri,
                document.text,
                document.version,
                document.language_id,
            )
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            self.orchestrator
                .did_change(params.text_document.uri, change.text, params.text_document.version)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.orchestrator.did_close(&params.text_document.uri).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.handle_did_change_configuration(params).await;
    }
}
