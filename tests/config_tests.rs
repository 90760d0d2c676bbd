//! Settings file loading and layering
use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;

use svg_preview_language_server::config::{Args, Config, load_settings_file};
use svg_preview_language_server::settings::Settings;

fn settings_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write settings");
    file
}

fn config_for(file: &NamedTempFile, extra: &[&str]) -> Config {
    let path = file.path().to_str().expect("utf-8 path");
    let mut argv = vec!["svg-preview-ls", "--config", path];
    argv.extend_from_slice(extra);
    Config::from_args(Args::parse_from(argv)).expect("config")
}

#[test]
fn test_load_settings_file() {
    let file = settings_file(
        r#"
size = 48
currentColor = "teal"

[preset]
stroke = "currentColor"
stroke-width = 2
"#,
    );
    let settings = load_settings_file(file.path()).expect("load");
    assert_eq!(settings.size, Some(48.0));
    assert_eq!(settings.current_color.as_deref(), Some("teal"));
    assert_eq!(settings.disable, None);

    let preset = settings.preset.expect("preset");
    assert_eq!(preset.len(), 2);
    assert_eq!(preset["stroke"], "currentColor");
    assert_eq!(preset["stroke-width"], 2);
}

#[test]
fn test_malformed_settings_file_reports_path() {
    let file = settings_file("size = [");
    let err = load_settings_file(file.path()).expect_err("parse failure");
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to parse settings file"), "{message}");
    assert!(message.contains(&file.path().display().to_string()), "{message}");
}

#[test]
fn test_command_line_overrides_file() {
    let file = settings_file("size = 48\ncurrentColor = \"teal\"\ndisable = false\n");
    let config = config_for(&file, &["--size", "16", "--disable"]);

    let base = config.base_settings().expect("base settings");
    assert_eq!(base.size, Some(16.0));
    assert_eq!(base.current_color.as_deref(), Some("teal"));
    assert_eq!(base.disable, Some(true));
}

#[test]
fn test_client_settings_override_base() {
    let file = settings_file("size = 48\ncurrentColor = \"teal\"\n");
    let base = config_for(&file, &[]).base_settings().expect("base settings");

    let client = Settings::from_client_value(serde_json::json!({ "currentColor": "plum" }));
    let effective = client.layered_over(&base);
    assert_eq!(effective.current_color.as_deref(), Some("plum"));
    assert_eq!(effective.size, Some(48.0));
}

#[test]
fn test_debounce_and_extension_id_flags() {
    let file = settings_file("");
    let config = config_for(&file, &["--debounce-ms", "120", "--extension-id", "acme.previewer"]);
    assert_eq!(config.debounce.as_millis(), 120);
    assert_eq!(config.section(), "previewer");
    assert_eq!(config.base_settings().expect("empty file"), Settings::default());
}
