//! Configuration management for the SVG preview language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Settings file discovery and loading
//! - Layering of file and command-line settings

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::settings::Settings;

/// Identifier of the editor extension hosting the server
pub const DEFAULT_EXTENSION_ID: &str = "svg-preview.svg-preview-on-code";

/// Project-local settings file, looked up in the working directory
pub const PROJECT_SETTINGS_FILE: &str = ".svg-preview.toml";

/// Command-line arguments for the SVG preview language server
#[derive(Debug, Parser)]
#[command(name = "svg-preview-ls")]
#[command(about = "Language server showing previews of inline SVG and image data URLs")]
#[command(version)]
pub struct Args {
    /// Target size for the longer side of previews
    #[arg(long, help = "Preview size in pixels (longer side)")]
    pub size: Option<f64>,

    /// Color substituted for `currentColor`
    #[arg(long, help = "Color used for currentColor (defaults from the color theme)")]
    pub current_color: Option<String>,

    /// Disable previews unless the client turns them back on
    #[arg(long, help = "Disable previews")]
    pub disable: bool,

    /// Explicit settings file
    #[arg(long, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,

    /// Debounce window for edits
    #[arg(
        long,
        default_value_t = 500,
        help = "Delay in milliseconds between the last edit and the refresh"
    )]
    pub debounce_ms: u64,

    /// Extension identifier used by the settings link
    #[arg(
        long,
        default_value = DEFAULT_EXTENSION_ID,
        help = "Extension id opened by the settings link in hovers"
    )]
    pub extension_id: String,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings given on the command line
    pub cli_settings: Settings,
    /// Settings file in effect, if any
    pub settings_path: Option<PathBuf>,
    /// Debounce window for edits
    pub debounce: Duration,
    /// Extension identifier; its part after the first `.` is the settings section
    pub extension_id: String,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let settings_path = match args.config {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Settings file not found: {}", path.display());
                }
                Some(path)
            }
            None => discover_settings_file(),
        };

        Ok(Config {
            cli_settings: Settings {
                disable: args.disable.then_some(true),
                preset: None,
                current_color: args.current_color,
                size: args.size,
            },
            settings_path,
            debounce: Duration::from_millis(args.debounce_ms),
            extension_id: args.extension_id,
            log_level: args.log_level,
        })
    }

    /// Section name the client stores the settings under.
    pub fn section(&self) -> &str {
        settings_section(&self.extension_id)
    }

    /// Settings from the file, or empty settings without one.
    pub fn file_settings(&self) -> Result<Settings> {
        match &self.settings_path {
            Some(path) => load_settings_file(path),
            None => Ok(Settings::default()),
        }
    }

    /// File settings with command-line settings on top.
    pub fn base_settings(&self) -> Result<Settings> {
        Ok(self.cli_settings.clone().layered_over(&self.file_settings()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cli_settings: Settings::default(),
            settings_path: None,
            debounce: Duration::from_millis(500),
            extension_id: DEFAULT_EXTENSION_ID.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Text after the first `.` of an extension id, or the whole id.
pub fn settings_section(extension_id: &str) -> &str {
    extension_id
        .split_once('.')
        .map_or(extension_id, |(_, name)| name)
}

/// First settings file found in the working directory, then the user config
/// directory.
fn discover_settings_file() -> Option<PathBuf> {
    let project = PathBuf::from(PROJECT_SETTINGS_FILE);
    if project.is_file() {
        return Some(project);
    }
    dirs::config_dir()
        .map(|dir| dir.join("svg-preview-ls").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Read a TOML settings file.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_section() {
        assert_eq!(settings_section("svg-preview.svg-preview-on-code"), "svg-preview-on-code");
        assert_eq!(settings_section("a.b.c"), "b.c");
        assert_eq!(settings_section("standalone"), "standalone");
    }

    #[test]
    fn test_cli_settings_from_args() {
        let args = Args::parse_from(["svg-preview-ls", "--size", "32", "--current-color", "red", "--disable"]);
        let config = Config::from_args(args).expect("config");
        assert_eq!(config.cli_settings.size, Some(32.0));
        assert_eq!(config.cli_settings.current_color.as_deref(), Some("red"));
        assert_eq!(config.cli_settings.disable, Some(true));
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.section(), "svg-preview-on-code");
    }

    #[test]
    fn test_missing_explicit_settings_file_is_an_error() {
        let args = Args::parse_from(["svg-preview-ls", "--config", "/definitely/not/here.toml"]);
        assert!(Config::from_args(args).is_err());
    }
}
