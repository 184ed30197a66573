//! Schema migration command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use clubhouse_server::db::{create_pool, migrations};

use super::load_config;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// TOML config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

/// Create or update the schema, then exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    let pool = create_pool(&config.database_url, 1)
        .await
        .context("Failed to connect to database")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;
    pool.close().await;

    tracing::info!("Schema is up to date");
    Ok(())
}
