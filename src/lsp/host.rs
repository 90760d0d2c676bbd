//! The LSP client as decoration host
//!
//! Settings come from `workspace/configuration` when the client supports it,
//! otherwise from the last settings it pushed. Decorations go out as
//! [`PublishDecorations`] notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tower_lsp::Client;
use tower_lsp::lsp_types::{ConfigurationItem, Url};

use crate::decoration::{Decoration, Host};
use crate::lsp::notifications::{PublishDecorations, PublishDecorationsParams};
use crate::settings::Settings;

pub struct ClientHost {
    client: Client,
    section: String,
    pull_configuration: AtomicBool,
    pushed: RwLock<Settings>,
}

impl ClientHost {
    pub fn new(client: Client, section: impl Into<String>) -> Self {
        Self {
            client,
            section: section.into(),
            pull_configuration: AtomicBool::new(false),
            pushed: RwLock::new(Settings::default()),
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Whether to ask the client through `workspace/configuration`.
    pub fn set_pull_configuration(&self, enabled: bool) {
        self.pull_configuration.store(enabled, Ordering::Relaxed);
    }

    /// Remember settings pushed by the client.
    pub fn set_pushed_settings(&self, value: Value) {
        let settings = Settings::from_client_value(value);
        *self.pushed.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    fn pushed_settings(&self) -> Settings {
        self.pushed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[tower_lsp::async_trait]
impl Host for ClientHost {
    async fn settings(&self, scope: Option<&Url>) -> Settings {
        if !self.pull_configuration.load(Ordering::Relaxed) {
            return self.pushed_settings();
        }

        let item = ConfigurationItem {
            scope_uri: scope.cloned(),
            section: Some(self.section.clone()),
        };
        match self.client.configuration(vec![item]).await {
            Ok(values) => match values.into_iter().next() {
                Some(value) => Settings::from_client_value(value),
                None => self.pushed_settings(),
            },
            Err(e) => {
                log::warn!("workspace/configuration failed: {}", e);
                self.pushed_settings()
            }
        }
    }

    async fn publish(&self, uri: &Url, decorations: &[Decoration]) {
        self.client
            .send_notification::<PublishDecorations>(PublishDecorationsParams {
                uri: uri.clone(),
                decorations: decorations.to_vec(),
            })
            .await;
    }
}
