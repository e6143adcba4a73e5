//! Playback session state

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::{AudioSelection, Resolution, ResolutionChoice};
use crate::player::tracks::TrackError;

/// Lifecycle phase of a watch session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum Phase {
    /// Created, nothing attached yet
    #[default]
    Idle,
    /// Source attached, waiting for the sink to become ready
    Loading,
    /// Playable; whether it is moving is `PlaybackState::playing`
    Ready,
    Ended,
    /// Attached source failed; needs a resolution/mirror switch or close
    Error(String),
    /// Nothing to play for this record
    NoSource,
}

impl Phase {
    pub fn is_error(&self) -> bool {
        matches!(self, Phase::Error(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Loading => write!(f, "Loading..."),
            Phase::Ready => write!(f, "Ready"),
            Phase::Ended => write!(f, "Ended"),
            Phase::Error(e) => write!(f, "Error: {}", e),
            Phase::NoSource => write!(f, "No Video Source"),
        }
    }
}

/// Mutable session state, owned by the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub playing: bool,
    /// Media position, or elapsed session time when `session_clock` is set
    pub current_time: f64,
    pub duration: f64,
    /// 0.0 - 1.0
    pub volume: f32,
    pub muted: bool,
    pub rate: f32,
    pub active_resolution: ResolutionChoice,
    pub active_subtitle: Option<String>,
    pub active_audio: AudioSelection,
    pub active_embed_index: usize,
    /// Embed loading indicator
    pub loading: bool,
    /// `current_time` is a wall-clock estimate (embed mode)
    pub session_clock: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            active_resolution: ResolutionChoice::Auto,
            active_subtitle: None,
            active_audio: AudioSelection::Default,
            active_embed_index: 0,
            loading: false,
            session_clock: false,
        }
    }
}

/// Errors from controller operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    #[error("No playable source is attached")]
    NoSource,
    #[error("Unsupported playback rate {0}")]
    UnsupportedRate(f32),
    #[error("Resolution {0} is not available")]
    ResolutionUnavailable(Resolution),
    #[error("Resolution switching needs a progressive source")]
    NotProgressive,
    #[error("Mirror index {0} is out of range")]
    EmbedOutOfRange(usize),
    #[error("Mirrors are only used when the record has no direct source")]
    NotEmbedMode,
    #[error("Seeking is not available for embedded players")]
    SeekUnsupported,
    #[error(transparent)]
    Track(#[from] TrackError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::NoSource.to_string(), "No Video Source");
        assert_eq!(Phase::Error("boom".into()).to_string(), "Error: boom");
        assert!(Phase::Error(String::new()).is_error());
        assert!(!Phase::Ready.is_error());
    }

    #[test]
    fn test_default_state() {
        let state = PlaybackState::default();
        assert!(!state.playing);
        assert_eq!(state.volume, 1.0);
        assert_eq!(state.active_audio, AudioSelection::Default);
        assert_eq!(state.active_resolution, ResolutionChoice::Auto);
    }
}
