//! End-to-end rendering through the orchestrator
mod common;

use std::time::Duration;

use serde_json::json;
use tower_lsp::lsp_types::Position;

use common::{RecordingHost, SVG, orchestrator, orchestrator_with_theme, rendered_markup, uri};
use svg_preview_language_server::core::normalize;
use svg_preview_language_server::settings::{ColorThemeKind, Settings};

fn sized(size: f64) -> Settings {
    Settings {
        size: Some(size),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_minimal_svg_gets_theme_color_and_no_size() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;

    let decorations = orchestrator.host().last_published(&page).expect("published");
    assert_eq!(decorations.len(), 1);
    assert_eq!(
        rendered_markup(&decorations[0]),
        r#"<svg color="black" xmlns="http://www.w3.org/2000/svg"/>"#
    );
    assert_eq!(decorations[0].hover_message.len(), 3);
}

#[tokio::test]
async fn test_configured_size_without_dimensions() {
    let orchestrator = orchestrator(RecordingHost::with_settings(sized(50.0)));
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;

    let decorations = orchestrator.decorations(&page).await;
    let markup = rendered_markup(&decorations[0]);
    assert!(markup.contains(r#"width="50" height="50""#), "{markup}");
}

#[tokio::test]
async fn test_configured_size_keeps_aspect_ratio() {
    let orchestrator = orchestrator(RecordingHost::with_settings(sized(50.0)));
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    let text = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="25"></svg>"#;
    orchestrator
        .did_open(page.clone(), text.to_string(), 1, "html".to_string())
        .await;

    let decorations = orchestrator.decorations(&page).await;
    let markup = rendered_markup(&decorations[0]);
    assert!(markup.contains(r#"width="50" height="12.5""#), "{markup}");
}

#[tokio::test]
async fn test_markup_without_namespace_is_not_decorated() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), r#"<svg a=""></svg>"#.to_string(), 1, "html".to_string())
        .await;

    assert_eq!(orchestrator.host().last_published(&page), Some(vec![]));
}

#[tokio::test]
async fn test_data_reference_passes_through() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("styles.css");
    orchestrator
        .did_open(
            page.clone(),
            "background: url(data:image/png;base64,AAAA);".to_string(),
            1,
            "css".to_string(),
        )
        .await;

    let decorations = orchestrator.decorations(&page).await;
    assert_eq!(decorations.len(), 1);
    let blocks: Vec<_> = decorations[0]
        .hover_message
        .iter()
        .map(|block| block.value.as_str())
        .collect();
    assert_eq!(
        blocks,
        vec!["### Data URL Preview", "![](data:image/png;base64,AAAA)"]
    );
    assert_eq!(decorations[0].range.start, Position::new(0, 16));
    assert_eq!(decorations[0].range.end, Position::new(0, 42));
}

#[tokio::test]
async fn test_theme_toggle_rederives_color_without_edit() {
    let orchestrator = orchestrator_with_theme(RecordingHost::default(), ColorThemeKind::Light);
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;
    assert!(rendered_markup(&orchestrator.decorations(&page).await[0]).contains(r#"color="black""#));

    orchestrator
        .color_theme_changed(ColorThemeKind::Light.toggled())
        .await;

    let decorations = orchestrator.host().last_published(&page).expect("republished");
    assert!(rendered_markup(&decorations[0]).contains(r#"color="white""#));
    assert_eq!(orchestrator.host().publish_count(&page), 2);
    assert_eq!(orchestrator.stats().await.unwrap().transforms, 2);
}

#[tokio::test(start_paused = true)]
async fn test_removing_all_snippets_drops_cache_entry() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;
    assert!(orchestrator.is_cached(&page).await);

    orchestrator
        .did_change(page.clone(), "<p>no images</p>".to_string(), 2)
        .await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(orchestrator.host().last_published(&page), Some(vec![]));
    assert!(!orchestrator.is_cached(&page).await);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_snippet_is_not_transformed_again() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;

    let edited = format!("<div>\n  {}\n</div>", SVG);
    orchestrator.did_change(page.clone(), edited, 2).await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let stats = orchestrator.stats().await.unwrap();
    assert_eq!(stats.transforms, 1);
    assert_eq!(stats.cache_hits, 1);
    let decorations = orchestrator.decorations(&page).await;
    assert_eq!(decorations[0].range.start, Position::new(1, 2));
}

#[tokio::test]
async fn test_duplicate_snippets_share_one_transform() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("icons.md");
    let text = format!("{}\n{}\n", SVG, SVG.replace("><", ">\n<"));
    assert_eq!(normalize(SVG), normalize(&SVG.replace("><", ">\n<")));
    orchestrator
        .did_open(page.clone(), text, 1, "markdown".to_string())
        .await;

    assert_eq!(orchestrator.decorations(&page).await.len(), 2);
    let stats = orchestrator.stats().await.unwrap();
    assert_eq!(stats.transforms, 1);
    assert_eq!(stats.cache_hits, 1);
}

#[tokio::test]
async fn test_hover_lookup_by_position() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), format!("<p>\n{}\n</p>", SVG), 1, "html".to_string())
        .await;

    let hit = orchestrator
        .decoration_at(&page, Position::new(1, 10))
        .await
        .expect("decoration under cursor");
    assert_eq!(hit.hover_message[0].value, "### SVG Preview");
    assert!(orchestrator.decoration_at(&page, Position::new(0, 1)).await.is_none());
    assert!(orchestrator.decoration_at(&uri("other.html"), Position::new(1, 10)).await.is_none());
}

#[tokio::test]
async fn test_disabled_document_shows_nothing() {
    let host = RecordingHost::default();
    let page = uri("page.html");
    host.set_scoped(
        &page,
        Settings {
            disable: Some(true),
            ..Default::default()
        },
    );
    let orchestrator = orchestrator(host);
    orchestrator.activate().await.unwrap();

    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;
    assert_eq!(orchestrator.host().last_published(&page), Some(vec![]));

    let other = uri("other.html");
    orchestrator
        .did_open(other.clone(), SVG.to_string(), 1, "html".to_string())
        .await;
    assert_eq!(orchestrator.decorations(&other).await.len(), 1);
}

#[tokio::test]
async fn test_configuration_change_applies_preset() {
    let orchestrator = orchestrator(RecordingHost::default());
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;

    orchestrator.host().set_global(Settings::from_client_value(json!({
        "currentColor": "tomato",
        "preset": { "stroke": "currentColor", "onclick": "alert(1)", "opacity": 0.5 }
    })));
    orchestrator.configuration_changed().await;

    let decorations = orchestrator.host().last_published(&page).expect("republished");
    assert_eq!(
        rendered_markup(&decorations[0]),
        r#"<svg color="tomato" stroke="currentColor" opacity="0.5" xmlns="http://www.w3.org/2000/svg"/>"#
    );
}

#[tokio::test]
async fn test_base_settings_sit_below_client_settings() {
    let orchestrator = orchestrator(RecordingHost::with_settings(sized(20.0)));
    orchestrator.activate().await.unwrap();

    let page = uri("page.html");
    orchestrator
        .did_open(page.clone(), SVG.to_string(), 1, "html".to_string())
        .await;

    orchestrator
        .set_base_settings(Settings {
            size: Some(80.0),
            current_color: Some("navy".to_string()),
            ..Default::default()
        })
        .await;

    let markup = rendered_markup(&orchestrator.decorations(&page).await[0]);
    assert_eq!(
        markup,
        r#"<svg color="navy" xmlns="http://www.w3.org/2000/svg" width="20" height="20"/>"#
    );
}
