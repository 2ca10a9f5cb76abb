//! Tests for layered settings loading

use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use dictree::application::ApplicationError;
use dictree::config::Settings;

fn write_config(temp: &TempDir, content: &str) -> PathBuf {
    let path = temp.path().join("dictree.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_explicit_config_when_load_then_overrides_store_path_and_languages() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
store_path = "/srv/dictree/store.toml"

[[default_languages]]
iso = "da-DK"
name = "Danish"
"#,
    );

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(settings.store_path, PathBuf::from("/srv/dictree/store.toml"));
    let languages = settings.seed_languages();
    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].id.as_str(), "da-DK");
}

#[test]
fn given_home_variable_in_store_path_when_load_then_expanded() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, r#"store_path = "$HOME/dict.toml""#);

    let settings = Settings::load(Some(&path)).unwrap();

    let home = std::env::var("HOME").unwrap();
    assert_eq!(settings.store_path, PathBuf::from(home).join("dict.toml"));
}

#[rstest]
#[case::missing_file(None)]
#[case::invalid_toml(Some("store_path = ["))]
fn given_bad_explicit_config_when_load_then_config_error(#[case] content: Option<&str>) {
    let temp = TempDir::new().unwrap();
    let path = match content {
        Some(content) => write_config(&temp, content),
        None => temp.path().join("absent.toml"),
    };

    let result = Settings::load(Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_settings_when_serialized_then_round_trips_through_toml() {
    let settings = Settings::default();

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
