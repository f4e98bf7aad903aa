//! # recordkit-data-sqlx
//!
//! [SQLx](https://github.com/launchbadge/sqlx) backend for the recordkit data
//! layer. It implements [`recordkit_data::Repository`] over the runtime
//! selected `Any` driver, so one build can talk to SQLite, PostgreSQL or
//! MySQL depending on the datasource URL.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`SqlxRepository`] | Generic repository over an `AnyPool` |
//! | [`connect`] | Build a pool from a [`DataSourceConfig`](recordkit_core::DataSourceConfig) |
//! | [`SqlxErrorExt`] | Convert `sqlx::Error` into `DataError` (`.into_data_error()`) |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```ignore
//! use recordkit_data_sqlx::prelude::*;
//!
//! let datasource: DataSourceConfig = config.section()?;
//! let pool = connect(&datasource).await?;
//! let people = SqlxRepository::<Person>::new(pool, Dialect::from_url(&datasource.url));
//! let page = people
//!     .get_many(&people.query("object").left_join_and_select("team", "team").limit(10))
//!     .await?;
//! ```

mod codec;
pub mod error;
pub mod pool;
pub mod repository;
mod statement;

pub use error::SqlxErrorExt;
pub use pool::connect;
pub use repository::SqlxRepository;

/// Re-exports of the most commonly used types from `recordkit-data` and this crate.
pub mod prelude {
    pub use crate::{connect, SqlxErrorExt, SqlxRepository};
    pub use recordkit_core::DataSourceConfig;
    pub use recordkit_data::prelude::*;
    pub use recordkit_data::{Dialect, ROOT_ALIAS};
}
