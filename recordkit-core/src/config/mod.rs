mod datasource;
mod loader;
pub mod typed;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use datasource::DataSourceConfig;
pub use typed::ConfigProperties;
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "RECORDKIT_PROFILE";

/// Failure to read or convert a configuration value.
#[derive(Debug)]
pub enum ConfigError {
    /// No value under this key.
    NotFound(String),
    /// A value exists but has the wrong shape.
    TypeMismatch { key: String, expected: &'static str },
    /// A file could not be read or is not valid YAML.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "missing configuration key '{key}'"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "configuration key '{key}' is not a valid {expected}")
            }
            ConfigError::Load(msg) => write!(f, "cannot load configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Flat dot-keyed settings for one profile.
///
/// Sources, later ones winning:
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env` then `.env.{profile}` (loaded into the process environment,
///    never overwriting variables that are already set)
/// 4. Environment variables: `RECORDKIT_DATASOURCE_URL` overrides
///    `recordkit.datasource.url`. Dashes in existing keys match underscores,
///    so `RECORDKIT_DATASOURCE_MAX_CONNECTIONS` overrides
///    `recordkit.datasource.max-connections`.
///
/// The profile is `RECORDKIT_PROFILE` if set, else the argument.
#[derive(Debug, Clone)]
pub struct RecordkitConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl RecordkitConfig {
    /// Load configuration for `profile` from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    /// Load configuration for `profile` from files in `dir`.
    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let active_profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut values = HashMap::new();
        loader::load_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::load_yaml_file(&dir.join(format!("application-{active_profile}.yaml")), &mut values)?;

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{active_profile}")));

        overlay_env(&mut values, std::env::vars());

        tracing::debug!(profile = %active_profile, keys = values.len(), "configuration loaded");
        Ok(RecordkitConfig {
            values,
            profile: active_profile,
        })
    }

    /// Parse an in-memory YAML document, without files or environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(RecordkitConfig {
            values,
            profile: profile.to_string(),
        })
    }

    /// No values, profile `test`.
    pub fn empty() -> Self {
        RecordkitConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    /// Insert or replace one key.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Overlay `(NAME, value)` pairs the way process environment variables are applied.
    pub fn overlay<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        overlay_env(&mut self.values, vars);
    }

    /// Read `key` (e.g. `recordkit.datasource.url`) as `V`.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Like [`get`](Self::get), falling back to `default` on any error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Build a typed section.
    pub fn section<C: ConfigProperties>(&self) -> Result<C, ConfigError> {
        C::from_config(self)
    }
}

fn overlay_env<I>(values: &mut HashMap<String, ConfigValue>, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (env_key, env_val) in vars {
        let normalized = env_key.to_lowercase().replace('_', ".");
        let key = values
            .keys()
            .find(|existing| existing.replace('-', ".") == normalized)
            .cloned()
            .unwrap_or(normalized);
        values.insert(key, ConfigValue::String(env_val));
    }
}

