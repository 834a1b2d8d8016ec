//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use animectl_server::config::DatabaseConfig;
use animectl_server::db;
use animectl_server::AppConfig;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create the anime and user tables if missing
pub async fn run_migrate(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path).context("Failed to load configuration")?;
    let database_url = args
        .database_url
        .or_else(|| config.database.url.clone())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or config file")?;

    // Migrating is the point of this command, whatever the config says
    let database = DatabaseConfig {
        run_migrations: true,
        ..config.database
    };
    db::connect(&database_url, &database)
        .await
        .context("Migration failed")?;
    println!("Migrations applied");

    Ok(())
}
