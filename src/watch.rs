//! Settings file watching
//!
//! Reloads the settings file when it changes on disk and applies it like a
//! configuration change.

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::load_settings_file;
use crate::decoration::{Host, Orchestrator};
use crate::settings::Settings;

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    SettingsFileChanged,
    WatcherError(notify::Error),
}

/// Keeps the watch alive; dropping it stops reloading.
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl SettingsWatcher {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Watch `path` and push `cli_settings` layered over its content into the
/// orchestrator on every change.
pub fn watch_settings_file<H: Host>(
    path: PathBuf,
    cli_settings: Settings,
    orchestrator: Orchestrator<H>,
) -> Result<SettingsWatcher> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let file_name = path.file_name().map(|name| name.to_os_string());

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                    event.kind
                {
                    let ours = event
                        .paths
                        .iter()
                        .any(|changed| changed.file_name().map(|n| n.to_os_string()) == file_name);
                    if ours {
                        let _ = tx.send(WatcherEvent::SettingsFileChanged);
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::WatcherError(e));
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    // Editors often replace the file on save, so watch its directory
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    let reload_path = path.clone();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                WatcherEvent::SettingsFileChanged => {
                    log::info!("Settings file changed: {}", reload_path.display());
                    let file_settings = if reload_path.is_file() {
                        match load_settings_file(&reload_path) {
                            Ok(settings) => settings,
                            Err(e) => {
                                log::warn!("Keeping previous settings: {:#}", e);
                                continue;
                            }
                        }
                    } else {
                        Settings::default()
                    };
                    orchestrator
                        .set_base_settings(cli_settings.clone().layered_over(&file_settings))
                        .await;
                }
                WatcherEvent::WatcherError(e) => {
                    log::error!("Settings file watcher error: {}", e);
                }
            }
        }
    });

    Ok(SettingsWatcher {
        _watcher: watcher,
        path,
    })
}
