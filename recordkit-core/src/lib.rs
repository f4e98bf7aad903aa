//! # recordkit-core
//!
//! Ambient support shared by the recordkit crates:
//!
//! | Item | Description |
//! |------|-------------|
//! | [`RecordkitConfig`] | Layered configuration (YAML files, `.env`, environment) |
//! | [`ConfigProperties`] | Typed configuration sections built from a [`RecordkitConfig`] |
//! | [`DataSourceConfig`] | The `recordkit.datasource` section |
//! | [`init_tracing`] | Global `tracing` subscriber with `RUST_LOG` support |

pub mod config;
pub mod layers;

pub use config::{
    ConfigError, ConfigProperties, ConfigValue, DataSourceConfig, FromConfigValue, RecordkitConfig,
};
pub use layers::init_tracing;
