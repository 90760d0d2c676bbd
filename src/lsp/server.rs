use anyhow::Result;
use std::thread;
use std::time::Duration;
use tokio::io::{stdin, stdout};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::{LspService, Server};

use crate::Config;
use crate::lsp::backend::Backend;
use crate::lsp::notifications::{
    DidChangeActiveEditor, DidChangeColorTheme, DidChangeVisibleEditors,
};

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);

    let base_settings = match config.base_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring settings file: {:#}", e);
            config.cli_settings.clone()
        }
    };

    // If running under the integration test, exit after a short delay so the test can read stdout to EOF.
    if std::env::var("SVG_PREVIEW_LS_TEST_EXIT").as_deref() == Ok("1") {
        thread::spawn(|| {
            thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone(), base_settings.clone()))
            .custom_method(DidChangeActiveEditor::METHOD, Backend::did_change_active_editor)
            .custom_method(
                DidChangeVisibleEditors::METHOD,
                Backend::did_change_visible_editors,
            )
            .custom_method(DidChangeColorTheme::METHOD, Backend::did_change_color_theme)
            .finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}

/// Log to stderr; stdout carries the protocol. `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}
