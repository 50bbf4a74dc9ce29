//! Server configuration from environment.

use chrono::{DateTime, Utc};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    pub admin_token: String,
    /// Seed airports and zones into an empty store
    pub seed_reference: bool,
    /// Seed sample flights when stats are requested from a cold store
    pub generate_samples: bool,
    /// Cap on the during window; open-ended when `None`
    pub during_end: Option<DateTime<Utc>>,
    pub rate_limit_enabled: bool,
    pub rate_limit_rps: u32,
    pub trust_proxy: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("IMPACT_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("IMPACT_DATABASE_PATH")
                .unwrap_or_else(|_| "data/airspace-impact.db".to_string()),
            database_max_connections: env::var("IMPACT_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(5),
            admin_token: env::var("IMPACT_ADMIN_TOKEN")
                .unwrap_or_else(|_| "change-me-admin-token".to_string()),
            seed_reference: env_flag("IMPACT_SEED_REFERENCE", true),
            generate_samples: env_flag("IMPACT_GENERATE_SAMPLES", true),
            during_end: env::var("IMPACT_DURING_END")
                .ok()
                .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            rate_limit_enabled: env_flag("IMPACT_RATE_LIMIT_ENABLED", true),
            rate_limit_rps: env::var("IMPACT_RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            trust_proxy: env_flag("IMPACT_TRUST_PROXY", false),
            log_format: match env::var("IMPACT_LOG_FORMAT") {
                Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
