//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: link store, click queue (public)
//! - `/links*`           - Link management (Bearer token, see [`crate::api::routes`])
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging without query strings
//! - **Rate limiting** - Per-IP token bucket on redirects and link management
//! - **Authentication** - Bearer token on link management routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

fn resolution_and_link_routes(state: &AppState) -> Router<AppState> {
    let links = api::routes::link_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/{code}", get(redirect_handler))
        .merge(links)
}

/// Routes without rate limiting, tracing and path normalization.
///
/// Used by tests that supply their own `ConnectInfo`.
pub fn service_router(state: AppState) -> Router {
    resolution_and_link_routes(&state)
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// When `state.behind_proxy` is set, rate limiting reads the client IP from
/// `X-Forwarded-For` / `X-Real-IP` instead of the peer socket address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = resolution_and_link_routes(&state)
        .layer(rate_limit::layer(state.behind_proxy))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
