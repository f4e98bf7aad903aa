use super::{ConfigError, ConfigProperties, RecordkitConfig};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// The `recordkit.datasource` section.
///
/// ```yaml
/// recordkit:
///   datasource:
///     url: "sqlite::memory:"
///     max-connections: 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceConfig {
    /// Connection URL; its scheme selects the driver and SQL dialect.
    pub url: String,
    pub max_connections: u32,
}

impl DataSourceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Whether the URL names a private in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:") && self.url.contains(":memory:")
    }
}

impl ConfigProperties for DataSourceConfig {
    fn prefix() -> &'static str {
        "recordkit.datasource"
    }

    fn from_config(config: &RecordkitConfig) -> Result<Self, ConfigError> {
        let url = config.get(&Self::key("url"))?;
        let max_connections = match config.get::<u32>(&Self::key("max-connections")) {
            Ok(n) => n,
            Err(ConfigError::NotFound(_)) => DEFAULT_MAX_CONNECTIONS,
            Err(e) => return Err(e),
        };
        Ok(Self {
            url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_max_connections() {
        let config = RecordkitConfig::from_yaml_str(
            "recordkit:\n  datasource:\n    url: \"postgres://db/app\"\n",
            "test",
        )
        .unwrap();
        let ds: DataSourceConfig = config.section().unwrap();
        assert_eq!(ds, DataSourceConfig::new("postgres://db/app"));
        assert!(!ds.is_in_memory());
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = RecordkitConfig::empty().section::<DataSourceConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(key) if key == "recordkit.datasource.url"));
    }

    #[test]
    fn bad_max_connections_is_reported() {
        let config = RecordkitConfig::from_yaml_str(
            "recordkit:\n  datasource:\n    url: \"sqlite::memory:\"\n    max-connections: lots\n",
            "test",
        )
        .unwrap();
        let err = config.section::<DataSourceConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }
}
