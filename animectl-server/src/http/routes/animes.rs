//! Anime endpoints
//!
//! Role requirements are enforced by `auth::authorize` before these
//! handlers run; here only body and path validation happens.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use futures::TryStreamExt;
use tracing::info;

use crate::http::error::ApiError;
use crate::http::extractors::{Actor, AnimeId, JsonBody, ValidAnime};
use crate::http::server::AppState;
use crate::models::Anime;

/// GET /animes - list every anime
async fn list_animes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Anime>>, ApiError> {
    let animes: Vec<Anime> = state.animes.find_all().try_collect().await?;
    Ok(Json(animes))
}

/// GET /animes/{id} - get a single anime
async fn get_anime(
    State(state): State<Arc<AppState>>,
    AnimeId(id): AnimeId,
) -> Result<Json<Anime>, ApiError> {
    let anime = state.animes.find_by_id(id).await?;
    Ok(Json(anime))
}

/// POST /animes - create an anime
async fn create_anime(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ValidAnime(anime): ValidAnime,
) -> Result<(StatusCode, Json<Anime>), ApiError> {
    let saved = state.animes.save(anime).await?;
    info!(actor = actor.name(), id = ?saved.id, "anime created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// POST /animes/batch - create several animes at once
async fn create_batch(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    JsonBody(animes): JsonBody<Vec<Anime>>,
) -> Result<(StatusCode, Json<Vec<Anime>>), ApiError> {
    let saved = state.animes.save_batch(animes).await?;
    info!(actor = actor.name(), count = saved.len(), "anime batch created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /animes/{id} - rename an existing anime
async fn update_anime(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    AnimeId(id): AnimeId,
    ValidAnime(anime): ValidAnime,
) -> Result<StatusCode, ApiError> {
    state.animes.update(id, anime).await?;
    info!(actor = actor.name(), id, "anime renamed");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /animes/{id} - delete an anime
async fn delete_anime(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    AnimeId(id): AnimeId,
) -> Result<StatusCode, ApiError> {
    state.animes.delete(id).await?;
    info!(actor = actor.name(), id, "anime removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Anime routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/animes", get(list_animes).post(create_anime))
        .route("/animes/batch", post(create_batch))
        .route(
            "/animes/{id}",
            get(get_anime).put(update_anime).delete(delete_anime),
        )
}
