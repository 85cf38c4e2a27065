//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`                 - Liveness (public)
//! - `GET  /healthcheck/app`  - Liveness (public)
//! - `GET  /healthcheck/db`   - Database probe (public)
//! - `/auth/*`                - Sign-up and login (public, rate limited)
//! - `/tasks/*`               - Task API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin, method and header
//! - **Rate limiting** - Per-IP token bucket on `/auth`
//! - **Authentication** - Bearer token on `/tasks`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{app_health_handler, db_health_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

fn routes(state: AppState, rate_limited: bool) -> Router {
    let task_router = api::routes::task_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let auth_router = if rate_limited {
        api::routes::auth_routes().layer(rate_limit::auth_layer())
    } else {
        api::routes::auth_routes()
    };

    Router::new()
        .route("/", get(app_health_handler))
        .route("/healthcheck/app", get(app_health_handler))
        .route("/healthcheck/db", get(db_health_handler))
        .merge(auth_router)
        .merge(task_router)
        .with_state(state)
}

/// All routes, without the rate limiter and the outer middleware.
///
/// Integration tests serve this directly, since the limiter needs the peer
/// address from `ConnectInfo`.
pub fn base_router(state: AppState) -> Router {
    routes(state, false)
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = routes(state, true)
        .layer(CorsLayer::permissive())
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
