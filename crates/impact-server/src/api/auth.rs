//! Admin token check and per-client rate limiting.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Configured admin token.
#[derive(Clone)]
pub struct AdminToken(pub Arc<String>);

/// Require `Authorization: Bearer <admin_token>`.
pub async fn require_admin(
    State(admin_token): State<AdminToken>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    match token {
        Some(token) if token == admin_token.0.as_str() => next.run(request).await,
        Some(_) => {
            tracing::warn!("Rejected admin request with invalid token");
            (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Invalid admin token" })),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "Authorization required",
                "hint": "Add header: Authorization: Bearer <admin_token>"
            })),
        )
            .into_response(),
    }
}

/// Sliding one-second window per client address.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<String, Vec<Instant>>>,
    last_cleanup: Arc<Mutex<Instant>>,
    cleanup_interval: Duration,
    max_rps: u32,
    enabled: bool,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(max_rps: u32, enabled: bool, trust_proxy: bool) -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
            cleanup_interval: Duration::from_secs(60),
            max_rps,
            enabled,
            trust_proxy,
        }
    }

    /// Record a request from `client`; `false` once the window is full.
    pub fn check(&self, client: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let now = Instant::now();
        let window = Duration::from_secs(1);
        let do_cleanup = match self.last_cleanup.lock() {
            Ok(mut last_cleanup) if now.duration_since(*last_cleanup) >= self.cleanup_interval => {
                *last_cleanup = now;
                true
            }
            _ => false,
        };
        if do_cleanup {
            self.purge_stale_entries(now, window);
        }

        let mut entry = self.requests.entry(client.to_string()).or_default();
        let timestamps = entry.value_mut();
        timestamps.retain(|t| now.duration_since(*t) < window);

        if timestamps.len() < self.max_rps as usize {
            timestamps.push(now);
            true
        } else {
            false
        }
    }

    fn purge_stale_entries(&self, now: Instant, window: Duration) {
        self.requests
            .retain(|_, stamps| stamps.iter().any(|t| now.duration_since(*t) < window));
    }

    fn client_key(&self, request: &Request) -> String {
        let forwarded = if self.trust_proxy {
            request
                .headers()
                .get("X-Forwarded-For")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        } else {
            None
        };

        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = limiter.client_key(&request);

    if limiter.check(&client) {
        next.run(request).await
    } else {
        tracing::debug!("Rate limit exceeded for {}", client);
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "Rate limit exceeded",
                "retry_after": "1 second"
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_caps_requests_per_client() {
        let limiter = RateLimiter::new(2, true, false);
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
    }

    #[test]
    fn disabled_limiter_allows_everything() {
        let limiter = RateLimiter::new(0, false, false);
        assert!((0..10).all(|_| limiter.check("10.0.0.1")));
    }
}
