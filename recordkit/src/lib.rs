//! recordkit: a generic record service over a SQL repository.
//!
//! This facade crate re-exports the recordkit sub-crates through a single
//! dependency with feature flags:
//!
//! ```ignore
//! use recordkit::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate                           |
//! |------------|---------|---------------------------------|
//! | `sqlx`     | **yes** | `recordkit-data-sqlx`           |
//! | `sqlite`   | no      | `recordkit-data-sqlx/sqlite`    |
//! | `postgres` | no      | `recordkit-data-sqlx/postgres`  |
//! | `mysql`    | no      | `recordkit-data-sqlx/mysql`     |
//! | `axum`     | no      | `IntoResponse` for envelopes    |

pub use recordkit_core;
pub use recordkit_data;
pub use recordkit_service;

#[cfg(feature = "sqlx")]
pub use recordkit_data_sqlx;

pub use recordkit_core::{init_tracing, ConfigError, DataSourceConfig, RecordkitConfig};
pub use recordkit_data::DataError;
pub use recordkit_service::{GenericRecordService, RequestEnvelope, ResponseEnvelope};

pub mod prelude {
    //! Everything needed to declare entities and serve them.
    pub use recordkit_core::{init_tracing, ConfigProperties, DataSourceConfig, RecordkitConfig};
    pub use recordkit_data::prelude::*;
    pub use recordkit_data::{DataError, Dialect, ROOT_ALIAS};
    pub use recordkit_service::{
        GenericRecordService, Outcome, RequestEnvelope, ResponseEnvelope, Verb,
    };

    #[cfg(feature = "sqlx")]
    pub use recordkit_data_sqlx::{connect, SqlxRepository};
}
