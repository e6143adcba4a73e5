//! StreamWatch - playback engine for a streaming catalog
//!
//! Decides what to play for a catalog record and keeps it playing:
//! resolves direct streams or embed mirrors, binds them to host sinks,
//! and keeps an out-of-band audio track in sync with the video.
//!
//! # Modules
//!
//! - `models` - Catalog record, candidate sources, tracks
//! - `resolver` - Record to ordered candidate list
//! - `stream` - Sink contracts, loader, HLS parsing, local player handoff
//! - `player` - Controller state machine, track selection, session driver
//! - `api` - Catalog and manifest HTTP clients
//! - `config` - User configuration

pub mod api;
pub mod config;
pub mod models;
pub mod player;
pub mod resolver;
pub mod stream;

// Re-export commonly used types
pub use models::{
    AudioSelection, CandidateSource, DirectSources, ExternalIds, MediaKind, PlaybackRecord,
    Resolution, ResolutionChoice, StreamKind, Track,
};

pub use api::{CatalogClient, ManifestClient};
pub use config::Config;
pub use player::{Phase, PlaybackController, PlaybackState, PlayerCommand, PlayerOptions};
pub use resolver::resolve;
