//! animectl CLI - anime catalogue API server and its tooling
//!
//! - `serve`: run the HTTP API
//! - `migrate`: create the database tables
//! - `hash-password`: encode a password for the config file
//! - `user add`: create an account

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "animectl",
    author,
    version,
    about = "Anime catalogue REST API with role-based Basic authentication"
)]
struct Cli {
    /// Config file (default: ~/.animectl/config.toml)
    #[arg(long, short = 'c', global = true, env = "ANIMECTL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),

    /// Create missing database tables
    Migrate(commands::migrate::MigrateArgs),

    /// Encode a password for the config file or the user table
    HashPassword(commands::user::HashPasswordArgs),

    /// Manage user accounts
    User(commands::user::UserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present, ignore missing
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_path).await?,
        Commands::Migrate(args) => commands::run_migrate(args, config_path).await?,
        Commands::HashPassword(args) => commands::run_hash_password(args)?,
        Commands::User(args) => commands::run_user(args, config_path).await?,
    }

    Ok(())
}
