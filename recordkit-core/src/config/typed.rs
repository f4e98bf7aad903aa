use super::{ConfigError, RecordkitConfig};

/// Strongly-typed configuration section.
///
/// ```ignore
/// pub struct ServerConfig {
///     pub port: u16,
/// }
///
/// impl ConfigProperties for ServerConfig {
///     fn prefix() -> &'static str {
///         "server"
///     }
///
///     fn from_config(config: &RecordkitConfig) -> Result<Self, ConfigError> {
///         Ok(Self { port: config.get_or(&Self::key("port"), 8080) })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"recordkit.datasource"`).
    fn prefix() -> &'static str;

    fn from_config(config: &RecordkitConfig) -> Result<Self, ConfigError>;

    /// Absolute key of a property in this section.
    fn key(property: &str) -> String {
        format!("{}.{property}", Self::prefix())
    }
}
