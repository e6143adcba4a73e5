//! Local Player - VLC/mpv handoff
//!
//! Opens a resolved direct source in VLC or mpv, carrying over the
//! subtitle track, the alternate audio track, start position and speed.
//! Embed mirrors are third-party pages and cannot be handed off.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::models::CandidateSource;

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// mpv media player (default)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Parse a config/CLI value
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "vlc" => Some(PlayerType::Vlc),
            "mpv" => Some(PlayerType::Mpv),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum LocalPlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Embedded mirrors cannot be opened in a local player: {0}")]
    EmbedNotSupported(String),
}

/// What to open and how
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandoffRequest {
    pub url: String,
    pub subtitle_url: Option<String>,
    /// Alternate-language audio played instead of the file's own
    pub audio_url: Option<String>,
    pub start_seconds: Option<f64>,
    pub speed: Option<f32>,
}

impl HandoffRequest {
    /// Build a request from a resolved candidate; embeds are refused
    pub fn from_candidate(candidate: &CandidateSource) -> Result<Self, LocalPlayerError> {
        match candidate {
            CandidateSource::Direct { url, .. } => Ok(Self {
                url: url.clone(),
                ..Self::default()
            }),
            CandidateSource::Embed { url, .. } => {
                Err(LocalPlayerError::EmbedNotSupported(url.clone()))
            }
        }
    }
}

/// Local player for direct sources
pub struct LocalPlayer {
    player_type: PlayerType,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        Self { player_type }
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Command-line arguments for a request
    pub fn args(&self, request: &HandoffRequest) -> Vec<String> {
        let mut args = vec![request.url.clone()];

        match self.player_type {
            PlayerType::Vlc => {
                if let Some(sub) = &request.subtitle_url {
                    args.push(format!("--sub-file={}", sub));
                }
                if let Some(audio) = &request.audio_url {
                    args.push(format!("--input-slave={}", audio));
                    // Slave audio is the second track once attached
                    args.push("--audio-track=1".to_string());
                }
                if let Some(start) = request.start_seconds {
                    args.push(format!("--start-time={:.1}", start));
                }
                if let Some(speed) = request.speed {
                    args.push(format!("--rate={}", speed));
                }
                args.push("--no-video-title-show".to_string());
            }
            PlayerType::Mpv => {
                if let Some(sub) = &request.subtitle_url {
                    args.push(format!("--sub-file={}", sub));
                }
                if let Some(audio) = &request.audio_url {
                    args.push(format!("--audio-file={}", audio));
                    args.push("--aid=2".to_string());
                }
                if let Some(start) = request.start_seconds {
                    args.push(format!("--start={:.1}", start));
                }
                if let Some(speed) = request.speed {
                    args.push(format!("--speed={}", speed));
                }
                args.push("--force-window=immediate".to_string());
            }
        }

        args
    }

    /// Launch the player; returns the spawned process
    pub async fn play(&self, request: &HandoffRequest) -> Result<Child, LocalPlayerError> {
        let mut cmd = Command::new(self.player_type.command());
        cmd.args(self.args(request));

        // Don't capture output - let it display normally
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        tracing::info!(player = %self.player_type, url = %request.url, "launching local player");

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LocalPlayerError::NotFound(self.player_type.command().to_string())
            } else {
                LocalPlayerError::StartFailed(e)
            }
        })
    }
}
