//! # Stockroom Server
//!
//! REST API over the Stockroom database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Server                                 │
//! │                                                                         │
//! │  Request ──► TraceLayer ──► CorsLayer ──► Router                        │
//! │                                              │                          │
//! │          ┌───────────────┬───────────────────┼──────────────┐           │
//! │          ▼               ▼                   ▼              ▼           │
//! │     /login/*        /items/*          /transactions/*   /dashboard/*   │
//! │          │               │                   │              │           │
//! │          └───────────────┴─────── AppState.db ┴──────────────┘           │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                                 stockroom-db                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`build_router`] is used by `main` and by the HTTP tests, which drive the
//! router directly without binding a socket.

pub mod config;
pub mod error;
pub mod routes;
pub mod uploads;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use stockroom_db::Database;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

pub use crate::error::{ApiError, ErrorCode};

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,stockroom=debug,sqlx=warn";

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the full application: API routes, uploaded photos, optional
/// frontend, plus tracing and CORS layers.
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let mut router = routes::router()
        .nest_service(uploads::PUBLIC_PREFIX, ServeDir::new(&state.config.uploads_dir));

    if let Some(static_dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Installs the global tracing subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
