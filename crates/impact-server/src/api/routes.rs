//! REST API routes.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::api::auth::{self, AdminToken, RateLimiter};
use crate::api::{airports, compare, layers, zones};
use crate::config::Config;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let compare_limiter = RateLimiter::new(
        config.rate_limit_rps,
        config.rate_limit_enabled,
        config.trust_proxy,
    );
    let admin_token = AdminToken(Arc::new(config.admin_token.clone()));

    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/stats", get(layers::get_stats))
        .route("/v1/heatmap", get(layers::get_heatmap))
        .route("/v1/conflicts", get(layers::get_conflicts))
        .route("/v1/airports", get(airports::list_airports))
        .route("/v1/airports/:iata", get(airports::get_airport));

    // Only comparison is rate limited.
    let compare_routes = Router::new()
        .route(
            "/v1/routes/compare",
            get(compare::compare_query).post(compare::compare_body),
        )
        .layer(middleware::from_fn_with_state(compare_limiter, auth::rate_limit));

    let admin_routes = Router::new()
        .route(
            "/v1/admin/zones/:id",
            put(zones::upsert_zone).delete(zones::delete_zone),
        )
        .layer(middleware::from_fn_with_state(admin_token, auth::require_admin));

    public_routes.merge(compare_routes).merge(admin_routes)
}
