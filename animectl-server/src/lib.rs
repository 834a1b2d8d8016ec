//! animectl-server: anime CRUD over HTTP
//!
//! Request pipeline: routes (`http`) -> `service` -> repositories (`db`),
//! guarded by Basic authentication with role checks (`auth`) and finished
//! by the error body formatter (`http::error_attributes`).

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod service;

use std::sync::Arc;

pub use config::{AppConfig, ServerConfig, StoreKind};
pub use service::{AnimeService, ServiceError};

use auth::Authenticator;
use db::{AnimeRepository, DbError, MemoryAnimeRepo, MemoryUserRepo, PgAnimeRepo, PgUserRepo, UserRepository};
use http::AppState;
use models::User;

/// Startup error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("DATABASE_URL not set (required for the postgres store)")]
    MissingDatabaseUrl,
}

pub type Result<T> = std::result::Result<T, ServerError>;

struct Stores {
    animes: Arc<dyn AnimeRepository>,
    users: Arc<dyn UserRepository>,
}

async fn open_stores(config: &AppConfig) -> Result<Stores> {
    match config.store {
        StoreKind::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .ok_or(ServerError::MissingDatabaseUrl)?;
            let pool = db::connect(url, &config.database).await?;

            Ok(Stores {
                animes: Arc::new(PgAnimeRepo::new(pool.clone())),
                users: Arc::new(PgUserRepo::new(pool)),
            })
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store - data is lost on shutdown");
            Ok(Stores {
                animes: Arc::new(MemoryAnimeRepo::new()),
                users: Arc::new(MemoryUserRepo::new()),
            })
        }
    }
}

/// Create configured accounts whose username is still free.
pub async fn seed_users(users: &dyn UserRepository, seeds: Vec<User>) -> Result<()> {
    for user in seeds {
        let username = user.username.clone();
        match users.create(user).await {
            Ok(_) => tracing::info!(%username, "seeded user"),
            Err(DbError::Conflict { .. }) => tracing::debug!(%username, "user already exists"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Open the configured stores and serve HTTP until shutdown.
pub async fn serve(config: AppConfig) -> Result<()> {
    let stores = open_stores(&config).await?;

    let seeds = config.security.users.iter().cloned().map(User::from).collect();
    seed_users(stores.users.as_ref(), seeds).await?;

    let state = AppState::new(AnimeService::new(stores.animes));
    let security = config
        .security
        .enabled
        .then(|| Authenticator::new(stores.users, config.security.realm.clone()));

    http::run_server(state, security, config.server).await?;
    Ok(())
}
