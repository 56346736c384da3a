use crate::error::FetchError;
use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Source of raw provider JSON
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    /// GET `url` and return the decoded body unmodified
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// URL builder for the SportsDataIO stats API
#[derive(Clone)]
pub struct ProviderUrls {
    base_url: String,
    api_key: String,
}

impl ProviderUrls {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), api_key: api_key.into() }
    }

    /// `{base}/PlayerGameStatsBySeason/{season}/{playerId}/all?key={key}`
    pub fn player_game_stats_by_season(&self, season: &str, player_id: &str) -> String {
        format!(
            "{}/PlayerGameStatsBySeason/{}/{}/all?key={}",
            self.base_url,
            urlencoding::encode(season),
            urlencoding::encode(player_id),
            urlencoding::encode(&self.api_key)
        )
    }

    /// `{base}/Teams/{season}?key={key}`
    pub fn teams(&self, season: &str) -> String {
        format!(
            "{}/Teams/{}?key={}",
            self.base_url,
            urlencoding::encode(season),
            urlencoding::encode(&self.api_key)
        )
    }
}

/// Strip the API key from a URL before it is logged
pub fn redact_key(url: &str) -> String {
    match url.find("key=") {
        Some(start) => {
            let value_start = start + "key=".len();
            let value_end =
                url[value_start..].find('&').map(|i| value_start + i).unwrap_or(url.len());
            format!("{}<redacted>{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}

/// HTTP client for SportsDataIO with a fixed per-request timeout and no retries
pub struct SportsDataIOFetcher {
    client: Client,
}

impl SportsDataIOFetcher {
    /// Create a new fetcher instance
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn get_body(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let body = self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        Ok(body.to_vec())
    }
}

/// Decode a provider body; an empty (or whitespace-only) body means "no data" and becomes `null`
pub fn decode_body(body: &[u8]) -> serde_json::Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

#[async_trait::async_trait]
impl StatsProvider for SportsDataIOFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        debug!("Fetching {}", redact_key(url));

        let body = self.get_body(url).await.map_err(|e| {
            // reqwest errors embed the URL; strip it so the key stays out of the logs
            error!("Error fetching data from {}: {}", redact_key(url), e.without_url());
            FetchError
        })?;

        decode_body(&body).map_err(|e| {
            error!("Error decoding data from {}: {}", redact_key(url), e);
            FetchError
        })
    }
}
