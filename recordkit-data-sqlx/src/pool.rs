use crate::error::SqlxErrorExt;
use recordkit_core::DataSourceConfig;
use recordkit_data::{DataError, Dialect};
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::{AnyPool, Executor};

/// Open a pool for the configured datasource.
///
/// The driver is picked from the URL scheme and must be compiled in through
/// the matching feature. An in-memory SQLite database lives only as long as
/// its connection, so such a pool is pinned to one connection that never
/// expires.
pub async fn connect(config: &DataSourceConfig) -> Result<AnyPool, DataError> {
    install_default_drivers();
    let sqlite = Dialect::from_url(&config.url) == Dialect::Sqlite;

    let options = if config.is_in_memory() {
        AnyPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        AnyPoolOptions::new().max_connections(config.max_connections.max(1))
    };

    let pool = options
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if sqlite {
                    conn.execute("PRAGMA case_sensitive_like = ON").await?;
                }
                Ok(())
            })
        })
        .connect(&config.url)
        .await
        .map_err(|e| e.into_data_error())?;

    tracing::info!(
        dialect = ?Dialect::from_url(&config.url),
        max_connections = pool.options().get_max_connections(),
        "datasource connected"
    );
    Ok(pool)
}
