//! Data structures and types for StreamWatch
//!
//! Contains the shared models used across the engine, organized by domain:
//! - **Catalog**: the playback record fetched for a watch session
//! - **Sources**: resolved candidate sources (direct streams and embeds)
//! - **Tracks**: subtitle and alternate-audio track references
//! - **Playback**: speed set and time formatting helpers

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// Catalog Models
// =============================================================================

/// Kind of catalog entry; decides between movie and episode mirror paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    #[serde(alias = "tv", alias = "show")]
    Series,
    Drama,
    Anime,
}

impl MediaKind {
    /// Whether season/episode numbers apply to this kind
    pub fn is_episodic(&self) -> bool {
        !matches!(self, MediaKind::Movie)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "Movie"),
            MediaKind::Series => write!(f, "Series"),
            MediaKind::Drama => write!(f, "Drama"),
            MediaKind::Anime => write!(f, "Anime"),
        }
    }
}

/// Progressive file resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "360")]
    R360,
    #[serde(rename = "480")]
    R480,
    #[serde(rename = "720")]
    R720,
    #[serde(rename = "1080")]
    R1080,
}

impl Resolution {
    /// Pick order for the default progressive source.
    ///
    /// Not monotonic in quality. Existing records depend on 720 winning over
    /// 1080, so the order is kept as is.
    pub const PRIORITY: [Resolution; 4] = [
        Resolution::R720,
        Resolution::R480,
        Resolution::R1080,
        Resolution::R360,
    ];

    /// All resolutions, best quality first (menu order)
    pub const DESCENDING: [Resolution; 4] = [
        Resolution::R1080,
        Resolution::R720,
        Resolution::R480,
        Resolution::R360,
    ];

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        match self {
            Resolution::R360 => 360,
            Resolution::R480 => 480,
            Resolution::R720 => 720,
            Resolution::R1080 => 1080,
        }
    }

    /// Parse from "720", "720p", "hd" and similar
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s_lower = s.trim().to_lowercase();
        let digits = s_lower.trim_end_matches('p');
        match digits {
            "360" => Some(Resolution::R360),
            "480" | "sd" => Some(Resolution::R480),
            "720" | "hd" => Some(Resolution::R720),
            "1080" | "fhd" => Some(Resolution::R1080),
            _ => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

/// Resolution menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionChoice {
    /// Whatever the resolver picked
    #[default]
    Auto,
    Fixed(Resolution),
}

impl fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionChoice::Auto => write!(f, "auto"),
            ResolutionChoice::Fixed(r) => write!(f, "{}", r),
        }
    }
}

/// Direct progressive file URLs keyed by resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectSources {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url360: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url480: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url720: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url1080: Option<String>,
}

impl DirectSources {
    /// URL for a resolution, ignoring blank values
    pub fn get(&self, resolution: Resolution) -> Option<&str> {
        let slot = match resolution {
            Resolution::R360 => &self.url360,
            Resolution::R480 => &self.url480,
            Resolution::R720 => &self.url720,
            Resolution::R1080 => &self.url1080,
        };
        present(slot)
    }

    /// First populated resolution in pick order
    pub fn best_available(&self) -> Option<(Resolution, &str)> {
        Resolution::PRIORITY
            .iter()
            .find_map(|r| self.get(*r).map(|url| (*r, url)))
    }

    /// Populated resolutions, best quality first
    pub fn available(&self) -> Vec<Resolution> {
        Resolution::DESCENDING
            .iter()
            .copied()
            .filter(|r| self.get(*r).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.best_available().is_none()
    }
}

/// Third-party identifiers used to build embed mirror URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIds {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tmdb_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub anilist_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", alias = "legacyId")]
    pub legacy_provider_id: Option<String>,
}

impl ExternalIds {
    pub fn tmdb(&self) -> Option<&str> {
        present(&self.tmdb_id)
    }

    pub fn mal(&self) -> Option<&str> {
        present(&self.mal_id)
    }

    pub fn anilist(&self) -> Option<&str> {
        present(&self.anilist_id)
    }

    pub fn legacy(&self) -> Option<&str> {
        present(&self.legacy_provider_id)
    }

    pub fn is_empty(&self) -> bool {
        self.tmdb().is_none()
            && self.mal().is_none()
            && self.anilist().is_none()
            && self.legacy().is_none()
    }
}

/// A subtitle or alternate-audio track reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(alias = "lang", alias = "label")]
    pub language: String,
    #[serde(default)]
    pub url: String,
}

impl Track {
    pub fn new(language: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.language, self.url)
    }
}

/// Catalog record handed to the player when the watch view opens
///
/// Only identifiers live here; the record is read-only for the engine.
/// Season and episode are the initial values, the controller tracks changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRecord {
    #[serde(flatten)]
    pub direct_sources: DirectSources,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "hlsUrl",
        alias = "m3u8Url"
    )]
    pub manifest_url: Option<String>,
    #[serde(flatten)]
    pub external_ids: ExternalIds,
    #[serde(default, alias = "type")]
    pub media_kind: MediaKind,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(default, alias = "subtitles")]
    pub subtitle_tracks: Vec<Track>,
    #[serde(default)]
    pub audio_tracks: Vec<Track>,
    #[serde(default = "default_speed")]
    pub default_speed: f32,
    #[serde(default, alias = "autoplayRequested")]
    pub autoplay: bool,
}

fn default_speed() -> f32 {
    1.0
}

impl Default for PlaybackRecord {
    fn default() -> Self {
        Self {
            direct_sources: DirectSources::default(),
            manifest_url: None,
            external_ids: ExternalIds::default(),
            media_kind: MediaKind::Movie,
            season: None,
            episode: None,
            subtitle_tracks: Vec::new(),
            audio_tracks: Vec::new(),
            default_speed: default_speed(),
            autoplay: false,
        }
    }
}

impl PlaybackRecord {
    /// Adaptive manifest URL, ignoring blank values
    pub fn manifest(&self) -> Option<&str> {
        present(&self.manifest_url)
    }

    /// Whether any direct (manifest or progressive) source exists
    pub fn has_direct_source(&self) -> bool {
        self.manifest().is_some() || !self.direct_sources.is_empty()
    }
}

// =============================================================================
// Source Models
// =============================================================================

/// How a direct source is fed to the primary sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Plain file URL, browser-native buffering
    Progressive,
    /// Adaptive-bitrate manifest driven by the adaptive engine
    Manifest,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Progressive => write!(f, "progressive"),
            StreamKind::Manifest => write!(f, "manifest"),
        }
    }
}

/// One playback option produced by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CandidateSource {
    Direct { url: String, kind: StreamKind },
    Embed { name: String, url: String },
}

impl CandidateSource {
    pub fn url(&self) -> &str {
        match self {
            CandidateSource::Direct { url, .. } => url,
            CandidateSource::Embed { url, .. } => url,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, CandidateSource::Direct { .. })
    }

    /// Short label for menus and logs
    pub fn label(&self) -> String {
        match self {
            CandidateSource::Direct { kind, .. } => format!("Direct ({})", kind),
            CandidateSource::Embed { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.label(), self.url())
    }
}

// =============================================================================
// Track Models
// =============================================================================

/// Which audio source is audible
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSelection {
    /// The primary sink's own audio
    #[default]
    Default,
    /// An out-of-band track played through the secondary sink
    Alternate(String),
}

impl AudioSelection {
    /// Parse a menu value; "default" (any case) or empty selects the primary audio
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("default") {
            AudioSelection::Default
        } else {
            AudioSelection::Alternate(trimmed.to_string())
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            AudioSelection::Default => None,
            AudioSelection::Alternate(lang) => Some(lang),
        }
    }
}

impl fmt::Display for AudioSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSelection::Default => write!(f, "default"),
            AudioSelection::Alternate(lang) => write!(f, "{}", lang),
        }
    }
}

// =============================================================================
// Playback Helpers
// =============================================================================

/// Playback rates offered by the speed menu
pub const SPEED_OPTIONS: [f32; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// Whether a rate is one of the menu rates
pub fn is_supported_speed(rate: f32) -> bool {
    SPEED_OPTIONS.iter().any(|s| (s - rate).abs() < f32::EPSILON)
}

/// Closest menu rate to an arbitrary value (used for catalog defaults)
pub fn snap_speed(rate: f32) -> f32 {
    if !rate.is_finite() {
        return 1.0;
    }
    SPEED_OPTIONS
        .iter()
        .copied()
        .min_by(|a, b| {
            (a - rate)
                .abs()
                .partial_cmp(&(b - rate).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(1.0)
}

/// Format seconds as M:SS or H:MM:SS
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Treat missing and blank strings alike
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Accept strings, numbers or null; blank strings become None
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    let raw: Option<Raw> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Str(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Raw::Str(_)) => None,
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
        None => None,
    })
}

// =============================================================================
// Tests
// =============================================================================
