use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::decoration::HoverBlock;
use crate::lsp::backend::Backend;
use crate::lsp::notifications::{
    ActiveEditorParams, ColorThemeParams, VisibleEditorsParams, settings_section_value,
};

/// Trait for handling hover requests
#[tower_lsp::async_trait]
pub trait HandleHover {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>>;
}

/// Trait for handling configuration pushes from the client
#[tower_lsp::async_trait]
pub trait HandleConfiguration {
    async fn handle_did_change_configuration(&self, params: DidChangeConfigurationParams);
}

/// Trait for handling editor view notifications
#[tower_lsp::async_trait]
pub trait HandleEditorEvents {
    async fn handle_active_editor(&self, params: ActiveEditorParams);
    async fn handle_visible_editors(&self, params: VisibleEditorsParams);
    async fn handle_color_theme(&self, params: ColorThemeParams);
}

#[tower_lsp::async_trait]
impl HandleHover for Backend {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let tdpp = params.text_document_position_params;
        let uri = tdpp.text_document.uri;
        let pos = tdpp.position;

        let Some(decoration) = self.orchestrator.decoration_at(&uri, pos).await else {
            return Ok(None);
        };

        let blocks = decoration
            .hover_message
            .into_iter()
            .map(|HoverBlock { value, .. }| MarkedString::String(value))
            .collect();
        Ok(Some(Hover {
            contents: HoverContents::Array(blocks),
            range: Some(decoration.range),
        }))
    }
}

#[tower_lsp::async_trait]
impl HandleConfiguration for Backend {
    async fn handle_did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let host = self.orchestrator.host();
        host.set_pushed_settings(settings_section_value(params.settings, host.section()));
        self.orchestrator.configuration_changed().await;
    }
}

#[tower_lsp::async_trait]
impl HandleEditorEvents for Backend {
    async fn handle_active_editor(&self, params: ActiveEditorParams) {
        self.orchestrator.active_editor_changed(params.uri).await;
    }

    async fn handle_visible_editors(&self, params: VisibleEditorsParams) {
        self.orchestrator.visible_editors_changed(params.uris).await;
    }

    async fn handle_color_theme(&self, params: ColorThemeParams) {
        log::debug!("Color theme changed to {:?}", params.kind);
        self.orchestrator.color_theme_changed(params.kind).await;
    }
}
