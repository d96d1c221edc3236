//! patitas CLI - lost & found pets backend
//!
//! Entry point for the `patitas` binary:
//! - `serve` runs the HTTP API server
//! - `migrate` applies the schema and exits

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "patitas",
    author,
    version,
    about = "Lost & found pets classifieds backend",
    long_about = "Backend for reporting, searching, and tracking lost and found pets: \
                  user accounts, pet records, postings, and geo-tagged sightings."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply database migrations and exit
    Migrate(commands::migrate::MigrateArgs),
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Migrate(args) => commands::migrate::run(args).await?,
    }

    Ok(())
}
