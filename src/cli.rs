//! CLI - Command Line Interface for StreamWatch
//!
//! Inspect what the player would do for a catalog record and hand direct
//! sources to a local player. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Candidate sources for an episode
//! streamwatch resolve 64f1c2 -s 1 -e 3 --json
//!
//! # Tracks and resolutions
//! streamwatch tracks 64f1c2
//!
//! # Renditions of an adaptive stream at a player size
//! streamwatch probe 64f1c2 --width 1280 --height 720
//!
//! # Open in mpv with Hindi audio from 1:30
//! streamwatch play 64f1c2 --audio Hindi --start 1:30
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use streamwatch::models::{CandidateSource, Resolution, ResolutionChoice};
use streamwatch::stream::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Record not found in the catalog
    NotFound = 4,
    /// Record has no playable source
    NoSource = 5,
    /// Only embed mirrors are available
    EmbedOnly = 6,
    /// Local player failed to start
    PlayerFailed = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// StreamWatch - playback source resolution for a streaming catalog
#[derive(Parser, Debug)]
#[command(
    name = "streamwatch",
    version,
    about = "Resolve and play catalog videos",
    long_about = "Resolves the playback candidates for a catalog record \
                  (direct streams or embed mirrors), lists its tracks, \
                  and hands direct sources to a local player.",
    after_help = "EXAMPLES:\n\
                  streamwatch resolve 64f1c2 -s 1 -e 3   Candidates for an episode\n\
                  streamwatch tracks 64f1c2              Subtitle/audio tracks\n\
                  streamwatch play 64f1c2 --audio Hindi  Open in a local player"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Catalog service root (overrides config)
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List playback candidates for a record
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// List subtitle tracks, audio tracks and resolutions
    #[command(visible_alias = "t")]
    Tracks(TracksCmd),

    /// Inspect an adaptive stream's renditions
    #[command(visible_alias = "pr")]
    Probe(ProbeCmd),

    /// Open a direct source in VLC or mpv
    #[command(visible_alias = "p")]
    Play(PlayCmd),
}

/// Where the playback record comes from
#[derive(Args, Debug, Clone)]
pub struct RecordSource {
    /// Catalog video id
    #[arg(required_unless_present = "file")]
    pub id: Option<String>,

    /// Read the record from a JSON file instead of the catalog
    #[arg(long, short = 'f', conflicts_with = "id")]
    pub file: Option<PathBuf>,
}

// =============================================================================
// Resolve Command
// =============================================================================

/// Resolve candidate sources for a record
#[derive(Args, Debug)]
pub struct ResolveCmd {
    #[command(flatten)]
    pub source: RecordSource,

    /// Season number (for series, drama, anime)
    #[arg(long, short = 's')]
    pub season: Option<u32>,

    /// Episode number (for series, drama, anime)
    #[arg(long, short = 'e')]
    pub episode: Option<u32>,
}

// =============================================================================
// Tracks Command
// =============================================================================

/// List tracks for a record
#[derive(Args, Debug)]
pub struct TracksCmd {
    #[command(flatten)]
    pub source: RecordSource,
}

// =============================================================================
// Probe Command
// =============================================================================

/// Inspect the renditions of a record's adaptive stream
#[derive(Args, Debug)]
pub struct ProbeCmd {
    #[command(flatten)]
    pub source: RecordSource,

    /// Player width in pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Player height in pixels
    #[arg(long, default_value = "720")]
    pub height: u32,
}

// =============================================================================
// Play Command
// =============================================================================

/// Hand a direct source to a local player
#[derive(Args, Debug)]
pub struct PlayCmd {
    #[command(flatten)]
    pub source: RecordSource,

    /// Season number (for series, drama, anime)
    #[arg(long, short = 's')]
    pub season: Option<u32>,

    /// Episode number (for series, drama, anime)
    #[arg(long, short = 'e')]
    pub episode: Option<u32>,

    /// Progressive resolution
    #[arg(long, short = 'r', value_enum)]
    pub resolution: Option<ResolutionArg>,

    /// Subtitle language
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Alternate audio language
    #[arg(long)]
    pub audio: Option<String>,

    /// Player to use (overrides config)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerChoice>,

    /// Start position: seconds, MM:SS or HH:MM:SS
    #[arg(long)]
    pub start: Option<String>,

    /// Playback speed (0.25 - 2.0)
    #[arg(long)]
    pub speed: Option<f32>,
}

impl PlayCmd {
    /// Parse the start position, if any
    pub fn start_seconds(&self) -> Result<Option<u64>, String> {
        match self.start.as_deref() {
            None => Ok(None),
            Some(s) => parse_position(s)
                .map(Some)
                .ok_or_else(|| format!("Invalid start position: {}", s)),
        }
    }
}

/// Resolution menu value
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionArg {
    Auto,
    #[value(name = "360", alias = "360p")]
    R360,
    #[value(name = "480", alias = "480p")]
    R480,
    #[value(name = "720", alias = "720p")]
    R720,
    #[value(name = "1080", alias = "1080p")]
    R1080,
}

impl From<ResolutionArg> for ResolutionChoice {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Auto => ResolutionChoice::Auto,
            ResolutionArg::R360 => ResolutionChoice::Fixed(Resolution::R360),
            ResolutionArg::R480 => ResolutionChoice::Fixed(Resolution::R480),
            ResolutionArg::R720 => ResolutionChoice::Fixed(Resolution::R720),
            ResolutionArg::R1080 => ResolutionChoice::Fixed(Resolution::R1080),
        }
    }
}

/// Local player selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerChoice {
    /// mpv media player (default)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> Self {
        match choice {
            PlayerChoice::Mpv => PlayerType::Mpv,
            PlayerChoice::Vlc => PlayerType::Vlc,
        }
    }
}

/// Parse "90", "1:30" or "1:01:30" into seconds
pub fn parse_position(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Some(secs);
    }
    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        2 => {
            let mins: u64 = parts[0].parse().ok()?;
            let secs: u64 = parts[1].parse().ok()?;
            Some(mins * 60 + secs)
        }
        3 => {
            let hours: u64 = parts[0].parse().ok()?;
            let mins: u64 = parts[1].parse().ok()?;
            let secs: u64 = parts[2].parse().ok()?;
            Some(hours * 3600 + mins * 60 + secs)
        }
        _ => None,
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// `resolve` response
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    pub candidates: Vec<CandidateSource>,
}

/// `play` response
#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub status: &'static str,
    pub player: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
