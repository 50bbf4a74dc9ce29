//! HTTP client for the impact server API.

use anyhow::{bail, Result};
use impact_core::Period;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Client for querying the impact server.
pub struct ImpactClient {
    base_url: String,
    client: reqwest::Client,
}

impl ImpactClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Baseline vs. during comparison for one route.
    pub async fn compare(&self, origin: &str, destination: &str) -> Result<Value> {
        self.get_json("/v1/routes/compare", &[("origin", origin), ("destination", destination)])
            .await
    }

    pub async fn stats(&self, period: Period) -> Result<Value> {
        self.get_json("/v1/stats", &[("period", period.as_str())]).await
    }

    pub async fn heatmap(&self, period: Period) -> Result<Value> {
        self.get_json("/v1/heatmap", &[("period", period.as_str())]).await
    }

    pub async fn conflicts(&self, period: Period) -> Result<Value> {
        self.get_json("/v1/conflicts", &[("period", period.as_str())]).await
    }

    pub async fn airports(&self) -> Result<Value> {
        self.get_json("/v1/airports", &[]).await
    }

    pub async fn airport(&self, iata: &str) -> Result<Value> {
        self.get_json(&format!("/v1/airports/{}", iata), &[]).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["error"].as_str().unwrap_or("request failed");
            bail!("{} ({})", message, status);
        }
        Ok(body)
    }
}

/// Decode a raw response into one of the API types.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}
