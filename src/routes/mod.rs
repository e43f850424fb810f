//! HTTP routes for Credit Throttle
//!
//! This module defines all HTTP endpoints exposed by the admin API.

pub mod bulk;
pub mod health;
pub mod metrics;
pub mod settings;
pub mod team;
pub mod usage_config;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::AppState;

/// Largest accepted request body (CSV uploads)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/settings", get(settings::get_settings))
        .route("/api/usage-config/get", post(usage_config::get_usage_config))
        .route("/api/usage-config/set", post(usage_config::set_usage_config))
        .route("/api/team/config", get(team::get_team_config))
        .route(
            "/api/team/cap",
            put(team::set_team_cap).delete(team::clear_team_cap),
        )
        .route("/api/users", get(users::list_users))
        .route("/api/users/check", post(users::check_users))
        .route("/api/users/custom-caps", get(users::custom_caps))
        .route("/api/users/custom-caps/clear", post(users::clear_custom_caps))
        .route(
            "/api/users/:email/cap",
            put(users::set_user_cap).delete(users::clear_user_cap),
        )
        .route("/api/bulk/preview", post(bulk::preview_caps))
        .route("/api/bulk/apply", post(bulk::apply_bulk_caps));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
