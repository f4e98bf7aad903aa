use recordkit::prelude::*;

mod models;
mod routes;
mod state;

use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let config = RecordkitConfig::load("dev")?;
    let datasource: DataSourceConfig = config.section()?;
    let pool = connect(&datasource).await?;
    state::apply_schema(&pool).await?;

    let app = routes::router(AppState::new(pool, Dialect::from_url(&datasource.url)));

    let port: u16 = config.get_or("server.port", 3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
