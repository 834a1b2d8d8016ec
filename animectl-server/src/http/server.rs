//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing and timeout middleware
//! - Error body formatting for every 4xx/5xx
//! - Basic authentication (unless disabled)
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::{error_attributes, routes};
use crate::auth::{self, Authenticator};
use crate::config::ServerConfig;
use crate::service::AnimeService;

/// Shared application state
pub struct AppState {
    pub animes: AnimeService,
}

impl AppState {
    pub fn new(animes: AnimeService) -> Self {
        Self { animes }
    }
}

const LOCAL_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = LOCAL_ORIGINS
        .iter()
        .copied()
        .map(HeaderValue::from_static)
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router.
///
/// With `security` set to `None` the same routes are served without
/// authentication or role checks.
pub fn build_router(
    state: AppState,
    security: Option<Authenticator>,
    config: &ServerConfig,
) -> Router {
    let mut app = Router::new()
        .merge(routes::health::router())
        .merge(routes::animes::router())
        .with_state(Arc::new(state));

    match security {
        Some(authenticator) => {
            tracing::info!(realm = authenticator.realm(), "Basic authentication enabled");
            app = app.layer(middleware::from_fn_with_state(authenticator, auth::authorize));
        }
        None => tracing::warn!("Security disabled - all routes are public"),
    }

    app.layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(middleware::from_fn(error_attributes::format_errors))
        .layer(cors_layer(config.cors_permissive))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(
    state: AppState,
    security: Option<Authenticator>,
    config: ServerConfig,
) -> Result<(), std::io::Error> {
    let app = build_router(state, security, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
