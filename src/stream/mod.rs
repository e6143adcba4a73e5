//! Streaming infrastructure
//!
//! - Sink: host-facing traits and the event contract
//! - Loader: binds candidates to the sinks
//! - HLS: master playlist parsing and rendition capping
//! - Player: handoff of direct sources to VLC/mpv

pub mod hls;
pub mod loader;
pub mod player;
pub mod sink;

pub use hls::{cap_level, MasterPlaylist, Variant};
pub use loader::{Attachment, LoaderSignal, StreamLoader, EMBED_LOAD_TIMEOUT};
pub use player::{HandoffRequest, LocalPlayer, LocalPlayerError, PlayerType};
pub use sink::{
    AdaptiveConfig, AdaptiveEngine, AudioSink, EmbedSurface, SinkError, SinkEvent, Sinks,
    VideoSink, EMBED_SANDBOX,
};
