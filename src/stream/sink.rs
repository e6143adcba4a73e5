//! Sink contracts
//!
//! The engine never touches a real media element. Hosts implement these
//! traits over whatever they render with (DOM elements, a native player,
//! test doubles) and feed element callbacks back as [`SinkEvent`]s.

use thiserror::Error;

use crate::models::Track;
use crate::stream::hls::Variant;

/// Errors a sink can report synchronously
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("Play request rejected: {0}")]
    PlayRejected(String),
    #[error("Sink unavailable")]
    Unavailable,
}

/// Anything that plays audio: the secondary track sink, and the video sink
pub trait AudioSink {
    /// Bind a new source URL, replacing any previous one
    fn set_source(&mut self, url: &str);
    /// Drop the current source and release buffers
    fn clear_source(&mut self);
    /// Request playback; hosts may reject (autoplay policy)
    fn play(&mut self) -> Result<(), SinkError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// Current media position in seconds
    fn position(&self) -> f64;
    fn is_paused(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
    fn set_rate(&mut self, rate: f32);
}

/// The primary video sink
pub trait VideoSink: AudioSink {
    /// Show a subtitle track, or hide text rendering with `None`
    fn set_text_track(&mut self, track: Option<&Track>);
    /// Rendered size in pixels, `(0, 0)` when unknown
    fn display_size(&self) -> (u32, u32);
}

/// Sandbox tokens applied to embed surfaces
pub const EMBED_SANDBOX: &str = "allow-scripts allow-same-origin allow-presentation";

/// Isolated surface hosting a third-party player page
pub trait EmbedSurface {
    fn mount(&mut self, url: &str, sandbox: &str);
    fn unmount(&mut self);
}

/// Settings handed to the adaptive engine when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveConfig {
    pub cap_level_to_player_size: bool,
    pub auto_start_load: bool,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            cap_level_to_player_size: true,
            auto_start_load: true,
        }
    }
}

/// Segment-fetching engine bound to the primary video sink
pub trait AdaptiveEngine {
    /// Start a session for a manifest URL
    fn start(&mut self, manifest_url: &str, config: &AdaptiveConfig);
    /// Limit automatic rendition selection to `max_level` (None lifts the cap)
    fn cap_level(&mut self, max_level: Option<usize>);
    /// Stop loading and release the session
    fn stop(&mut self);
}

/// Callbacks delivered by the host, in event-loop order
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// Primary sink position moved
    TimeUpdate { position: f64 },
    DurationChange { duration: f64 },
    /// Primary sink has metadata and can start
    LoadedMetadata,
    /// Primary sink actually started playing
    Play,
    /// Primary sink actually paused
    Pause,
    Ended,
    /// Decode or network failure on the primary sink
    Error { message: String },
    /// Adaptive engine parsed the master playlist
    ManifestParsed { variants: Vec<Variant> },
    AdaptiveError { fatal: bool, details: String },
    /// Embed surface fired its load event
    EmbedLoaded,
}

/// The set of host surfaces owned by one watch session
pub struct Sinks {
    pub video: Box<dyn VideoSink>,
    pub audio: Box<dyn AudioSink>,
    pub embed: Box<dyn EmbedSurface>,
    pub adaptive: Box<dyn AdaptiveEngine>,
}

impl std::fmt::Debug for Sinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks").finish_non_exhaustive()
    }
}
