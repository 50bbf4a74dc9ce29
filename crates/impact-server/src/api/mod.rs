//! API routes for the impact server.

pub mod airports;
pub mod auth;
pub mod compare;
pub mod error;
pub mod layers;
pub mod request_id;
mod routes;
pub mod zones;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

pub use error::ApiError;

pub fn routes(config: &Config) -> Router<Arc<AppState>> {
    routes::create_router(config)
}

/// Fully layered application: routes, tracing, request ids, CORS.
pub fn app(state: Arc<AppState>) -> Router {
    let config = state.config().clone();
    routes(&config)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests;
