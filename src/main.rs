use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use hotelstj_web::booking::store::PgBookingStore;
use hotelstj_web::cache::AppCache;
use hotelstj_web::catalog::Catalog;
use hotelstj_web::config::Config;
use hotelstj_web::routes;
use hotelstj_web::session::InMemoryKeyValueStore;
use hotelstj_web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotelstj_web=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::load().await.context("Failed to load hotel catalog")?;
    info!("Loaded catalog with {} hotels", catalog.len());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = AppState {
        catalog: Arc::new(catalog),
        cache: AppCache::new(),
        store: Arc::new(PgBookingStore::new(pool)),
        sessions: Arc::new(InMemoryKeyValueStore::new()),
    };

    let app = routes::router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!("Listening on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
