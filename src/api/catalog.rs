//! Catalog API client
//!
//! Fetches the playback record for a video by id. The catalog service
//! returns the stored record as JSON; only the fields the player needs are
//! read, the rest is ignored.

use anyhow::Result;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::models::PlaybackRecord;

/// Catalog API error types
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Video not found (404)")]
    NotFound,

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Catalog API client
pub struct CatalogClient {
    base_url: String,
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a client for a catalog service root (e.g. "https://example.com")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the playback record for a video id
    pub async fn fetch(&self, id: &str) -> Result<PlaybackRecord> {
        let url = format!(
            "{}/api/videos/{}",
            self.base_url,
            urlencoding::encode(id.trim())
        );
        tracing::debug!(%url, "fetching catalog record");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(CatalogError::from)?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await.map_err(CatalogError::from)?;
                let record: PlaybackRecord = serde_json::from_str(&body).map_err(|e| {
                    CatalogError::InvalidResponse(format!("JSON parse error: {}", e))
                })?;
                Ok(record)
            }
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound.into()),
            status => Err(CatalogError::ServerError(status.as_u16()).into()),
        }
    }
}
