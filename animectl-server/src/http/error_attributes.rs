//! Error body formatter
//!
//! Every response with a 4xx/5xx status leaves the server as
//!
//! ```json
//! { "timestamp": "...", "path": "/animes/1", "status": 404, "error": "Not Found",
//!   "message": "Anime not found", "developerMessage": "...", "trace": [...] }
//! ```
//!
//! Typed errors (`ApiError`) contribute their message, developer note and
//! source chain. Anything else (extractor rejections, unmatched routes,
//! timeouts) gets the default attributes built from the status and the
//! original plain-text body. `trace` is only included when the query
//! string contains `trace=true`.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::ErrorDetails;

const NO_MESSAGE: &str = "No message available";

/// Largest original body read back when building default attributes
const MAX_ORIGINAL_BODY: usize = 64 * 1024;

/// Serialized error body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAttributes {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

impl ErrorAttributes {
    pub fn new(status: StatusCode, path: String, details: ErrorDetails, include_trace: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            path,
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_owned(),
            message: details.message,
            developer_message: details.developer_message.map(str::to_owned),
            trace: include_trace.then_some(details.trace),
        }
    }
}

/// Whether the raw query string asks for the error trace.
pub fn is_trace_enabled(query: Option<&str>) -> bool {
    query.is_some_and(|q| !q.is_empty() && q.contains("trace=true"))
}

async fn default_details(body: Body) -> ErrorDetails {
    let message = match to_bytes(body, MAX_ORIGINAL_BODY).await {
        Ok(bytes) => String::from_utf8(bytes.to_vec())
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_MESSAGE.to_owned()),
        Err(_) => NO_MESSAGE.to_owned(),
    };

    ErrorDetails {
        trace: vec![message.clone()],
        message,
        developer_message: None,
    }
}

/// Middleware rewriting every error response into `ErrorAttributes`.
pub async fn format_errors(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let include_trace = is_trace_enabled(request.uri().query());

    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let details = match parts.extensions.remove::<ErrorDetails>() {
        Some(details) => details,
        None => default_details(body).await,
    };

    let attributes = ErrorAttributes::new(status, path, details, include_trace);
    let bytes = match serde_json::to_vec(&attributes) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to serialize error attributes: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, Body::from(bytes))
}
