//! HLS manifest client
//!
//! Downloads a master playlist so its renditions can be inspected
//! before playback.

use anyhow::{Context, Result};

use crate::stream::hls::MasterPlaylist;

/// Master playlist fetcher
pub struct ManifestClient {
    client: reqwest::Client,
}

impl ManifestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch and parse a master playlist
    pub async fn fetch_master(&self, url: &str) -> Result<MasterPlaylist> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch manifest")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Manifest returned HTTP {}", status);
        }

        let text = response
            .text()
            .await
            .context("Failed to read manifest body")?;

        if !text.trim_start().starts_with("#EXTM3U") {
            anyhow::bail!("Not an HLS playlist");
        }

        Ok(MasterPlaylist::parse(&text, url))
    }
}

impl Default for ManifestClient {
    fn default() -> Self {
        Self::new()
    }
}
