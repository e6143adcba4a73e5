//! Configuration management for StreamWatch
//!
//! Handles config file loading and player preferences.
//! Config is stored at ~/.config/streamwatch/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{AudioSelection, Resolution, ResolutionChoice};
use crate::player::PlayerOptions;
use crate::stream::PlayerType;

/// Environment override for the catalog service root
pub const CATALOG_URL_ENV: &str = "STREAMWATCH_CATALOG_URL";

/// Catalog used when nothing is configured
const DEFAULT_CATALOG_URL: &str = "http://localhost:3000";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog service root
    pub catalog_url: Option<String>,
    /// Local player for handoff (vlc, mpv)
    pub player: Option<String>,
    /// Start volume, 0.0 - 1.0
    pub volume: Option<f32>,
    /// Preferred progressive resolution (360, 480, 720, 1080)
    pub preferred_resolution: Option<String>,
    /// Subtitle language to enable on open
    pub subtitle_language: Option<String>,
    /// Alternate audio language to enable on open
    pub audio_language: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/streamwatch/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("streamwatch").join("config.toml"))
    }

    /// Load config from the default path, or defaults if missing/invalid
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load config from a specific file, or defaults if missing/invalid
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Catalog URL with fallback chain:
    /// 1. Environment variable STREAMWATCH_CATALOG_URL
    /// 2. Config file
    /// 3. Local default
    pub fn catalog_url(&self) -> String {
        if let Ok(url) = std::env::var(CATALOG_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.catalog_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string())
    }

    /// Configured handoff player, defaulting to mpv
    pub fn player_type(&self) -> PlayerType {
        self.player
            .as_deref()
            .and_then(PlayerType::from_name)
            .unwrap_or_default()
    }

    /// Controller preferences derived from this config
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            volume: self.volume.map(|v| v.clamp(0.0, 1.0)).unwrap_or(1.0),
            muted: false,
            resolution: self
                .preferred_resolution
                .as_deref()
                .and_then(Resolution::from_str_loose)
                .map(ResolutionChoice::Fixed)
                .unwrap_or_default(),
            subtitle: self.subtitle_language.clone(),
            audio: self
                .audio_language
                .as_deref()
                .map(AudioSelection::parse)
                .unwrap_or_default(),
        }
    }
}
