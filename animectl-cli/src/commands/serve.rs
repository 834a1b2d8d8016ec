//! HTTP server command
//!
//! Loads the config file, applies command-line overrides and runs the
//! anime API until shutdown.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use animectl_server::{AppConfig, StoreKind};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config, default: 127.0.0.1:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Use the in-memory store instead of PostgreSQL
    #[arg(long)]
    pub memory: bool,

    /// Serve every route without authentication or role checks
    #[arg(long)]
    pub no_security: bool,

    /// Skip creating missing tables at startup
    #[arg(long)]
    pub skip_migrations: bool,
}

impl ServeArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(bind) = self.bind {
            config.server.bind_addr = bind;
        }
        if self.cors_permissive {
            config.server.cors_permissive = true;
        }
        if let Some(url) = self.database_url {
            config.database.url = Some(url);
        }
        if self.memory {
            config.store = StoreKind::Memory;
        }
        if self.no_security {
            config.security.enabled = false;
        }
        if self.skip_migrations {
            config.database.run_migrations = false;
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = AppConfig::load(config_path).context("Failed to load configuration")?;
    args.apply(&mut config);

    tracing::info!(
        bind = %config.server.bind_addr,
        store = ?config.store,
        security = config.security.enabled,
        "Starting animectl server"
    );

    // Run server (blocks until shutdown)
    animectl_server::serve(config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = ServeArgs::parse_from([
            "serve",
            "--bind",
            "0.0.0.0:9999",
            "--memory",
            "--no-security",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.bind_addr.port(), 9999);
        assert_eq!(config.store, StoreKind::Memory);
        assert!(!config.security.enabled);
        assert!(config.database.run_migrations);
    }
}
