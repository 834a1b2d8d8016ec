//! Anime service - business rules between the HTTP routes and the store
//!
//! Absence becomes `ServiceError::NotFound`, rule violations and failed
//! writes become `ServiceError::BadRequest`. Anything else the store
//! reports propagates as `ServiceError::Store`.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::db::{AnimeRepository, DbError};
use crate::models::Anime;

pub const ANIME_NOT_FOUND: &str = "Anime not found";
pub const INVALID_NAME: &str = "Invalid name";

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    BadRequest {
        message: String,
        #[source]
        source: Option<DbError>,
    },

    #[error("store error: {0}")]
    Store(#[from] DbError),
}

impl ServiceError {
    fn not_found() -> Self {
        Self::NotFound(ANIME_NOT_FOUND.to_owned())
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            source: None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Anime business operations over any `AnimeRepository`.
#[derive(Clone)]
pub struct AnimeService {
    repo: Arc<dyn AnimeRepository>,
}

impl AnimeService {
    pub fn new(repo: Arc<dyn AnimeRepository>) -> Self {
        Self { repo }
    }

    /// Stream every anime. Store failures surface as stream items.
    pub fn find_all(&self) -> BoxStream<'_, ServiceResult<Anime>> {
        debug!(store = self.repo.backend(), "find_all");
        self.repo.find_all().map_err(ServiceError::from).boxed()
    }

    pub async fn find_by_id(&self, id: i32) -> ServiceResult<Anime> {
        let found = self.repo.find_by_id(id).await?;
        debug!(id, found = found.is_some(), "find_by_id");
        found.ok_or_else(ServiceError::not_found)
    }

    /// Persist one anime. Every store failure is reported as a bad request.
    pub async fn save(&self, anime: Anime) -> ServiceResult<Anime> {
        self.repo.save(anime).await.map_err(|e| {
            warn!(error = %e, "save failed");
            ServiceError::BadRequest {
                message: format!("Fail save anime. Details: {}", e),
                source: Some(e),
            }
        })
    }

    /// Persist a batch atomically.
    ///
    /// Names are checked before anything is written, so a batch containing
    /// an empty name is rejected as a whole and the store is left untouched.
    pub async fn save_batch(&self, animes: Vec<Anime>) -> ServiceResult<Vec<Anime>> {
        if let Some(invalid) = animes.iter().find(|a| a.validate().is_err()) {
            warn!(anime = ?invalid, "rejecting batch with empty name");
            return Err(ServiceError::bad_request(INVALID_NAME));
        }

        let saved = self.repo.save_all(animes).await?;
        info!(count = saved.len(), "batch saved");
        Ok(saved)
    }

    /// Replace the name of an existing anime, keeping its id.
    pub async fn update(&self, id: i32, anime: Anime) -> ServiceResult<()> {
        let existing = self.find_by_id(id).await?;
        let updated = existing.with_name(anime.name);
        self.repo.save(updated).await?;
        info!(id, "anime updated");
        Ok(())
    }

    /// Backend name and whether it answered a round-trip.
    pub async fn store_health(&self) -> (&'static str, bool) {
        let backend = self.repo.backend();
        match self.repo.ping().await {
            Ok(()) => (backend, true),
            Err(e) => {
                warn!(store = backend, error = %e, "store unreachable");
                (backend, false)
            }
        }
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.find_by_id(id).await?;
        self.repo.delete(id).await?;
        info!(id, "anime deleted");
        Ok(())
    }
}
