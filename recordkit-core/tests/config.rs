use recordkit_core::config::{ConfigError, ConfigValue, DataSourceConfig, RecordkitConfig};
use std::fs;

#[test]
fn test_empty_config() {
    let config = RecordkitConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get_or() {
    let mut config = RecordkitConfig::empty();
    config.set("app.name", ConfigValue::String("records".into()));
    assert_eq!(config.get::<String>("app.name").unwrap(), "records");
    assert_eq!(config.get_or("app.port", 8080i64), 8080);
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
recordkit:
  datasource:
    url: "sqlite::memory:"
    max-connections: 3
  origins:
    - "http://localhost"
    - "https://prod.example"
"#;
    let config = RecordkitConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(config.get::<String>("recordkit.datasource.url").unwrap(), "sqlite::memory:");
    assert_eq!(config.get::<u32>("recordkit.datasource.max-connections").unwrap(), 3);
    let origins: Vec<String> = config.get("recordkit.origins").unwrap();
    assert_eq!(origins, vec!["http://localhost", "https://prod.example"]);
}

#[test]
fn test_invalid_yaml() {
    let err = RecordkitConfig::from_yaml_str("recordkit: [unclosed", "test").unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn test_env_overlay_matches_dashed_keys() {
    let mut config = RecordkitConfig::from_yaml_str(
        "recordkit:\n  datasource:\n    url: \"sqlite::memory:\"\n    max-connections: 3\n",
        "test",
    )
    .unwrap();
    config.overlay([
        ("RECORDKIT_DATASOURCE_URL".to_string(), "postgres://db/records".to_string()),
        ("RECORDKIT_DATASOURCE_MAX_CONNECTIONS".to_string(), "12".to_string()),
    ]);

    let ds: DataSourceConfig = config.section().unwrap();
    assert_eq!(ds.url, "postgres://db/records");
    assert_eq!(ds.max_connections, 12);
}

#[test]
fn test_profile_file_overrides_base() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "recordkit:\n  datasource:\n    url: \"sqlite::memory:\"\n    max-connections: 4\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("application-prod.yaml"),
        "recordkit:\n  datasource:\n    url: \"postgres://prod/records\"\n",
    )
    .unwrap();

    let config = RecordkitConfig::load_from(dir.path(), "prod").unwrap();
    assert_eq!(config.profile(), "prod");
    let ds: DataSourceConfig = config.section().unwrap();
    assert_eq!(ds.url, "postgres://prod/records");
    assert_eq!(ds.max_connections, 4);
}

#[test]
fn test_missing_files_yield_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = RecordkitConfig::load_from(dir.path(), "dev").unwrap();
    assert!(!config.contains_key("recordkit.datasource.url"));
}
