//! End-to-end behaviour of the configuration model.
//!
//! These tests walk configurations through creation, saves and publishes
//! using only the public API.

use pretty_assertions::assert_eq;
use serde_json::json;
use studio_model::{
    validate, Configuration, DeploymentDescriptorGenerator, DeploymentSurface, PublishState,
    VersioningEngine,
};

/// Two defaults for the same name differ only in identity and timestamps.
#[test]
fn create_default_is_deterministic() {
    let a = Configuration::create_default("Support Bot");
    let b = Configuration::create_default("Support Bot");

    let normalize = |mut config: Configuration| {
        config.id = a.id.clone();
        config.created_at = a.created_at;
        config.updated_at = a.updated_at;
        for record in &mut config.versions {
            record.id = a.versions[0].id.clone();
            record.created_at = a.versions[0].created_at;
        }
        config
    };

    assert_ne!(a.id, b.id);
    assert_eq!(normalize(b), a.clone());
}

/// Publishing twice without a save leaves two markers; the newer one wins.
#[test]
fn consecutive_publishes_leave_two_markers() {
    let engine = VersioningEngine::new("editor");
    let mut config = Configuration::create_default("Support Bot");
    engine.save(&mut config, "draft");

    engine.publish(&mut config).unwrap();
    let second = engine.publish(&mut config).unwrap();

    let markers = config.versions.iter().filter(|v| v.is_published).count();
    assert_eq!(markers, 2);
    assert_eq!(VersioningEngine::latest_published(&config), Some(&second));
}

/// Full lifecycle: save, publish, edit, save again.
///
/// The live published record stays at 1.1 while the draft moves to 1.2.
#[test]
fn full_lifecycle_keeps_published_version_behind_draft() {
    let engine = VersioningEngine::new("editor");
    let mut config = Configuration::create_default("Support Bot");
    config.website = "https://support.example.com".to_string();
    assert!(validate(&config).is_valid());

    engine.save(&mut config, "initial setup");
    assert_eq!(config.current_version, "1.1");

    engine.publish(&mut config).unwrap();
    assert!(config.is_published);
    let published: Vec<_> = config.versions.iter().filter(|v| v.is_published).collect();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].version, "1.1");

    config.presentation.set("/colors/primary", json!("#16a34a"));
    config.touch();
    engine.save(&mut config, "green theme");

    assert_eq!(config.current_version, "1.2");
    assert!(config.is_published);
    assert_eq!(VersioningEngine::state(&config), PublishState::PublishedWithDraft);

    let live = VersioningEngine::latest_published(&config).unwrap();
    assert_eq!(live.version, "1.1");
    assert_ne!(live.version, config.current_version);

    let live_snapshot = live.config_snapshot.as_ref().unwrap();
    assert_eq!(
        live_snapshot.presentation.get("/colors/primary"),
        Some(&json!("#2563eb"))
    );
}

/// Embed snippets are stable across calls and differ only in `type=`.
#[test]
fn embed_snippet_tracks_surface_only() {
    let generator = DeploymentDescriptorGenerator::new("https://studio.example.com");
    let mut config = Configuration::create_default("Support Bot");

    let popover = generator.generate(&config);
    assert_eq!(popover, generator.generate(&config));

    config.deployment.surface = DeploymentSurface::Fullpage;
    let fullpage = generator.generate(&config);

    let strip = |s: &str| s.replace("type=popover", "").replace("type=fullpage", "");
    assert_eq!(strip(&popover), strip(&fullpage));
    assert!(fullpage.contains("type=fullpage"));
}
