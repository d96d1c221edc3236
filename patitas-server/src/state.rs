//! Application state shared across handlers

use sqlx::PgPool;

use patitas_core::{AppConfig, TokenSigner};

use crate::uploads::FileStore;

/// Shared application state; cheap to clone behind the router's `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenSigner,
    pub files: FileStore,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            pool,
            tokens: TokenSigner::new(&config.jwt_secret, config.token_ttl_hours),
            files: FileStore::new(&config.upload_dir),
        }
    }
}
