//! PostgreSQL pool for the anime and user stores
//!
//! Pool limits come from the `[database]` config section. `connect`
//! also brings the schema up to date when `run_migrations` is set, so
//! every caller (server, `migrate`, `user add`) sees the same tables.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::migrations;
use crate::config::DatabaseConfig;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Pool options derived from `[database]`.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// Connect to `database_url` and run migrations if the config asks for it.
pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        max_connections = config.max_connections,
        run_migrations = config.run_migrations,
        "connecting to anime store"
    );
    let pool = pool_options(config).connect(database_url).await?;

    if config.run_migrations {
        migrations::run(&pool).await?;
    }

    Ok(pool)
}
