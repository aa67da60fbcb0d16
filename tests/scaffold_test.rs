// Integration tests for the scout assistant scaffold.

use std::path::PathBuf;

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Verify that config/scout.toml is valid TOML.
#[test]
fn scout_toml_is_valid() {
    let content = std::fs::read_to_string(root().join("config/scout.toml"))
        .expect("config/scout.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "config/scout.toml is not valid TOML: {:?}", parsed.err());
}

/// Verify that defaults/scout.toml is valid TOML.
#[test]
fn default_scout_toml_is_valid() {
    let content = std::fs::read_to_string(root().join("defaults/scout.toml"))
        .expect("defaults/scout.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "defaults/scout.toml is not valid TOML: {:?}", parsed.err());
}

/// Verify that defaults/credentials.toml.example is valid TOML.
#[test]
fn credentials_example_is_valid_toml() {
    let content = std::fs::read_to_string(root().join("defaults/credentials.toml.example"))
        .expect("defaults/credentials.toml.example should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(
        parsed.is_ok(),
        "defaults/credentials.toml.example is not valid TOML: {:?}",
        parsed.err()
    );
}

/// Verify that the shipped sample dataset loads through the engine.
#[test]
fn sample_dataset_builds_an_engine() {
    let engine = scout_assistant::engine::ScoutEngine::from_path(
        &root().join("data/players_sample.csv"),
    )
    .expect("sample dataset should build an engine");
    assert!(!engine.list_player_names().is_empty());
}
