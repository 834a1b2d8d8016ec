//! HTTP Basic authentication and role-based authorization
//!
//! The `authorize` middleware runs before routing: it looks up the access
//! rule for the request in `policy`, authenticates the Basic credentials
//! against a `UserRepository` and checks the required role.

pub mod basic;
pub mod password;
pub mod policy;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

pub use basic::BasicCredentials;
pub use policy::{required_access, Access};

use crate::db::{DbError, UserRepository};
use crate::http::error::ApiError;
use crate::models::User;

/// Authentication failure
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Full authentication is required to access this resource")]
    MissingCredentials,

    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("user store error: {0}")]
    Store(#[from] DbError),
}

/// Authenticated account, available to handlers as an extension
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Verifies Basic credentials against the user store
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    realm: Arc<str>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, realm: impl Into<String>) -> Self {
        Self {
            users,
            realm: Arc::from(realm.into()),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Resolve the account behind an `Authorization` header.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, header: Option<&HeaderValue>) -> Result<User, AuthError> {
        let header = header.ok_or(AuthError::MissingCredentials)?;
        let header = header.to_str().map_err(|_| AuthError::MalformedHeader)?;
        let creds = BasicCredentials::parse(header)?;

        let user = self
            .users
            .find_by_username(&creds.username)
            .await?
            .ok_or(AuthError::BadCredentials)?;

        if !password::matches(&creds.password, &user.password) {
            debug!(username = %creds.username, "password mismatch");
            return Err(AuthError::BadCredentials);
        }

        Ok(user)
    }

    fn reject(&self, err: AuthError) -> ApiError {
        match err {
            AuthError::Store(e) => ApiError::Internal {
                message: format!("user lookup failed: {}", e),
            },
            other => ApiError::Unauthorized {
                realm: self.realm.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Middleware enforcing the route-to-role table.
pub async fn authorize(
    State(auth): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let access = required_access(request.method(), request.uri().path());
    if access == Access::PermitAll {
        return Ok(next.run(request).await);
    }

    let user = auth
        .authenticate(request.headers().get(AUTHORIZATION))
        .await
        .map_err(|e| auth.reject(e))?;

    if let Access::Role(role) = access {
        if !user.has_role(role) {
            warn!(
                username = %user.username,
                %role,
                method = %request.method(),
                path = request.uri().path(),
                "access denied"
            );
            return Err(ApiError::Forbidden {
                reason: format!("Access denied: role {} required", role),
            });
        }
    }

    debug!(username = %user.username, "authenticated");
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserRepo;
    use crate::models::Role;

    fn authenticator() -> Authenticator {
        let users = MemoryUserRepo::with_users([User {
            id: None,
            name: "Lucas".into(),
            username: "lucas".into(),
            password: password::encode("1234"),
            roles: vec![Role::User],
        }]);
        Authenticator::new(Arc::new(users), "animectl")
    }

    fn header(user: &str, pass: &str) -> HeaderValue {
        HeaderValue::from_str(&BasicCredentials::header_value(user, pass)).unwrap()
    }

    #[tokio::test]
    async fn valid_credentials_resolve_user() {
        let user = authenticator()
            .authenticate(Some(&header("lucas", "1234")))
            .await
            .unwrap();
        assert_eq!(user.username, "lucas");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_bad_credentials() {
        let auth = authenticator();
        let err = auth.authenticate(Some(&header("lucas", "nope"))).await.unwrap_err();
        assert!(matches!(err, AuthError::BadCredentials));

        let err = auth.authenticate(Some(&header("ghost", "1234"))).await.unwrap_err();
        assert!(matches!(err, AuthError::BadCredentials));
    }

    #[tokio::test]
    async fn authenticated_user_reaches_handler() {
        use axum::body::{to_bytes, Body};
        use axum::routing::get;
        use axum::{middleware, Router};
        use tower::ServiceExt;

        use crate::http::extractors::Actor;

        let app = Router::new()
            .route("/animes", get(|actor: Actor| async move { actor.name().to_owned() }))
            .layer(middleware::from_fn_with_state(authenticator(), authorize));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/animes")
                    .header(AUTHORIZATION, header("lucas", "1234"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"lucas");
    }

    #[tokio::test]
    async fn missing_header_is_reported() {
        let err = authenticator().authenticate(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }
}
