//! Custom Axum extractors
//!
//! Rejections are mapped to `ApiError::Validation` so malformed input is
//! always a 400 with the standard error body.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::auth::CurrentUser;
use crate::models::{Anime, ValidationError};

/// JSON body whose decoding failures are reported as 400
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::MalformedBody {
                reason: rejection.body_text(),
            })
        })?;

        Ok(Self(value))
    }
}

/// Anime body that passed the non-empty name check
pub struct ValidAnime(pub Anime);

impl<S> FromRequest<S> for ValidAnime
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(anime) = JsonBody::<Anime>::from_request(req, state).await?;
        anime.validate()?;
        Ok(Self(anime))
    }
}

/// Extract an integer anime id from path
pub struct AnimeId(pub i32);

impl<S> FromRequestParts<S> for AnimeId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<i32> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "id",
                    reason: "must be an integer",
                })
            })?;

        Ok(Self(id))
    }
}

/// Username of the authenticated caller, for audit logging.
///
/// `None` when the router runs without security.
pub struct Actor(pub Option<String>);

impl Actor {
    pub fn name(&self) -> &str {
        self.0.as_deref().unwrap_or("anonymous")
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .extensions
            .get::<CurrentUser>()
            .map(|CurrentUser(user)| user.username.clone());
        Ok(Self(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};

    fn parts_with(user: Option<User>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/animes");
        if let Some(user) = user {
            builder = builder.extension(CurrentUser(user));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn actor_reads_authenticated_user() {
        let mut parts = parts_with(Some(User {
            id: Some(2),
            name: "Fabricio".into(),
            username: "fabricio".into(),
            password: "{noop}1234".into(),
            roles: vec![Role::Admin],
        }));

        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.name(), "fabricio");
    }

    #[tokio::test]
    async fn actor_without_security_is_anonymous() {
        let mut parts = parts_with(None);
        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.0, None);
        assert_eq!(actor.name(), "anonymous");
    }

    #[tokio::test]
    async fn wrong_field_type_is_malformed_body() {
        let err = JsonBody::<Anime>::from_request(
            axum::http::Request::builder()
                .method("POST")
                .uri("/animes")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{\"name\": 3}"))
                .unwrap(),
            &(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::MalformedBody { .. })
        ));
    }
}
