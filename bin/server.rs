// Plate Catalog - Web Server

use anyhow::{Context, Result};
use plate_catalog::api::{router, AppState};
use plate_catalog::{logging, seed_defaults, CatalogConfig, SqlitePlateStore};
use rusqlite::Connection;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = CatalogConfig::from_env()?;

    // Open database
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("failed to open database {:?}", config.database_path))?;
    let store = SqlitePlateStore::new(conn)?;
    info!(path = ?config.database_path, "database opened");

    if config.seed_defaults {
        store.with_conn(seed_defaults)?;
    }

    let app = router(AppState::new(Arc::new(store)), config.path_base.as_deref());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        path_base = config.path_base.as_deref().unwrap_or(""),
        "plate catalog server running"
    );

    axum::serve(listener, app)
        .await
        .context("server stopped with an error")?;

    Ok(())
}
