//! Runtime configuration from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::DEFAULT_TOKEN_TTL_HOURS;

/// Default bind address for the HTTP server
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Fallback signing secret for local development
const DEV_JWT_SECRET: &str = "patitas-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL not set")]
    MissingDatabaseUrl,

    #[error("invalid {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration.
///
/// Every field comes from the environment; the CLI layers its flags on top.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: PathBuf,
    /// Allow any origin instead of the localhost allow-list
    pub cors_permissive: bool,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` is required; everything else has a default:
    /// - `PATITAS_BIND` (default `127.0.0.1:8080`)
    /// - `PATITAS_JWT_SECRET` (dev fallback, warn when unset)
    /// - `PATITAS_TOKEN_TTL_HOURS` (default 24)
    /// - `PATITAS_UPLOAD_DIR` (default `uploads`)
    /// - `PATITAS_CORS_PERMISSIVE` (default false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let bind_addr = match env::var("PATITAS_BIND") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "PATITAS_BIND",
                value: raw,
            })?,
            Err(_) => DEFAULT_BIND.parse().expect("default bind parses"),
        };

        let jwt_secret = env::var("PATITAS_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("PATITAS_JWT_SECRET not set, using development secret");
            DEV_JWT_SECRET.to_owned()
        });

        let token_ttl_hours = match env::var("PATITAS_TOKEN_TTL_HOURS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "PATITAS_TOKEN_TTL_HOURS",
                value: raw,
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        let upload_dir = env::var("PATITAS_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let cors_permissive = env::var("PATITAS_CORS_PERMISSIVE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            upload_dir,
            cors_permissive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_parses() {
        let addr: SocketAddr = DEFAULT_BIND.parse().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
