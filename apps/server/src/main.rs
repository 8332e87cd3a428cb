//! # Stockroom
//!
//! Inventory REST API server.
//!
//! ```bash
//! # Defaults: 0.0.0.0:3000, ./data/stockroom.db, ./uploads
//! cargo run -p stockroom-server
//!
//! # Serve the frontend too, on another port
//! STOCKROOM_PORT=8080 STOCKROOM_STATIC_DIR=./public cargo run -p stockroom-server
//! ```

use stockroom_db::Database;
use stockroom_server::config::ServerConfig;
use stockroom_server::{build_router, init_tracing, shutdown_signal, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Stockroom server...");

    let config = ServerConfig::load()?;
    info!(
        addr = %config.bind_address(),
        database = %config.database_path.display(),
        uploads = %config.uploads_dir.display(),
        id_scheme = ?config.id_scheme,
        "Configuration loaded"
    );

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    let addr = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}
