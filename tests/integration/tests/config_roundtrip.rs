//! Project config loading from disk.

use std::path::PathBuf;

use envcreds_core::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_config_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("envcreds.json5");
    std::fs::write(
        &path,
        r#"{
            // deployment defaults
            environment: "production",
            credentialsDir: "config/credentials",
            editor: "code --wait",
        }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.environment.as_deref(), Some("production"));
    assert_eq!(config.credentials_dir, Some(PathBuf::from("config/credentials")));
    assert_eq!(config.editor.as_deref(), Some("code --wait"));
}

#[test]
fn test_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(&dir.path().join("absent.json5"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("envcreds.json5");
    std::fs::write(&path, "{ editor: 'nano' }").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(
        config,
        Config {
            editor: Some("nano".to_string()),
            ..Config::default()
        }
    );
}
