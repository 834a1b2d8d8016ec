//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Each response also carries an `ErrorDetails` extension that the
//! `error_attributes` layer turns into the final error body.

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationError;
use crate::service::ServiceError;

/// Developer note attached to every typed error body
pub const DEVELOPER_MESSAGE: &str = "A response status error happened";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request body or path failed validation (400)
    Validation(ValidationError),

    /// Business rule or store write rejected the request (400)
    BadRequest { message: String, trace: Vec<String> },

    /// Resource not found (404)
    NotFound { message: String },

    /// Missing or invalid credentials (401)
    Unauthorized { realm: String, message: String },

    /// Authenticated but lacking the role (403)
    Forbidden { reason: String },

    /// Internal error (500, logged)
    Internal { message: String },
}

/// Failure description handed to the error formatter through response extensions
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    pub developer_message: Option<&'static str>,
    pub trace: Vec<String>,
}

/// Display strings of an error and every source below it.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(e) = source {
        chain.push(e.to_string());
        source = e.source();
    }
    chain
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> ErrorDetails {
        let typed = |message: String, trace: Vec<String>| ErrorDetails {
            trace: if trace.is_empty() { vec![message.clone()] } else { trace },
            message,
            developer_message: Some(DEVELOPER_MESSAGE),
        };

        match self {
            Self::Validation(e) => typed(e.to_string(), error_chain(e)),
            Self::BadRequest { message, trace } => typed(message.clone(), trace.clone()),
            Self::NotFound { message } => typed(message.clone(), Vec::new()),
            Self::Unauthorized { message, .. } => typed(message.clone(), Vec::new()),
            Self::Forbidden { reason } => typed(reason.clone(), Vec::new()),
            Self::Internal { message } => ErrorDetails {
                message: "an internal error occurred".to_owned(),
                developer_message: None,
                trace: vec![message.clone()],
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = self.details();

        if let Self::Internal { message } = &self {
            // Log the actual error, return generic message
            tracing::error!("Internal error: {}", message);
        }

        let body = json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": details.message,
        });
        let mut response = (status, Json(body)).into_response();

        if let Self::Unauthorized { realm, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
                response.headers_mut().insert(WWW_AUTHENTICATE, value);
            }
        }

        response.extensions_mut().insert(details);
        response
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(message) => Self::NotFound { message },
            ServiceError::BadRequest { ref message, .. } => Self::BadRequest {
                message: message.clone(),
                trace: error_chain(&e),
            },
            ServiceError::Store(db) => Self::Internal {
                message: db.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let details = response.extensions().get::<ErrorDetails>().unwrap();
        assert_eq!(details.message, "name cannot be empty");
        assert_eq!(details.developer_message, Some(DEVELOPER_MESSAGE));
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::from(ServiceError::NotFound("Anime not found".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unauthorized_sets_challenge() {
        let err = ApiError::Unauthorized {
            realm: "animectl".into(),
            message: "Bad credentials".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"animectl\""
        );
    }

    #[tokio::test]
    async fn forbidden_is_403() {
        let err = ApiError::Forbidden {
            reason: "role ADMIN required".into(),
        };
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn store_failure_is_hidden_500() {
        let err = ApiError::from(ServiceError::Store(DbError::Corrupt {
            resource: "anime",
            reason: "boom".into(),
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let details = response.extensions().get::<ErrorDetails>().unwrap();
        assert_eq!(details.message, "an internal error occurred");
        assert_eq!(details.developer_message, None);
    }

    #[test]
    fn bad_request_trace_includes_source() {
        let err = ServiceError::BadRequest {
            message: "Fail save anime. Details: not found: anime '9'".into(),
            source: Some(DbError::NotFound {
                resource: "anime",
                id: "9".into(),
            }),
        };
        match ApiError::from(err) {
            ApiError::BadRequest { trace, .. } => {
                assert_eq!(trace.len(), 2);
                assert_eq!(trace[1], "not found: anime '9'");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
