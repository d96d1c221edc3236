//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use patitas_core::AppConfig;
use patitas_server::db::create_pool;
use patitas_server::http::run_server;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides PATITAS_BIND)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run(args: ServeArgs) -> Result<()> {
    if let Some(url) = &args.database_url {
        // AppConfig reads the environment; make the flag win
        std::env::set_var("DATABASE_URL", url);
    }

    let mut config = AppConfig::from_env().context(
        "configuration error. Set DATABASE_URL via --database-url, the environment, or .env",
    )?;

    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.cors_permissive {
        config.cors_permissive = true;
    }

    tracing::info!("Starting patitas server on {}", config.bind_addr);

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
