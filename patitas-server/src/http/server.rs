//! Axum server setup
//!
//! - Migrations run before the listener binds
//! - Localhost-only CORS by default
//! - Bearer-token middleware over the whole surface (allow-list inside)
//! - Static `/uploads` serving
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::{middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use patitas_core::AppConfig;

use crate::db::migrations;
use crate::state::AppState;

use super::auth;
use super::routes;

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Build the application router with all routes and layers.
pub fn build_router(state: Arc<AppState>, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                "http://localhost:4200".parse().unwrap(),
                "http://localhost:8080".parse().unwrap(),
                "http://127.0.0.1:4200".parse().unwrap(),
                "http://127.0.0.1:8080".parse().unwrap(),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::pets::router())
        .merge(routes::postings::router())
        .merge(routes::sightings::router())
        .nest_service("/uploads", ServeDir::new(state.files.root()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::from_env()?;
/// let pool = create_pool(&config.database_url).await?;
/// run_server(pool, config).await?;
/// ```
pub async fn run_server(pool: PgPool, config: AppConfig) -> Result<(), ServerError> {
    migrations::run(&pool).await?;

    // The upload root must exist before ServeDir points at it
    std::fs::create_dir_all(&config.upload_dir)?;

    let bind_addr = config.bind_addr;
    let cors_permissive = config.cors_permissive;
    let state = Arc::new(AppState::new(pool, &config));

    let app = build_router(state, cors_permissive);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
