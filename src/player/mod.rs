//! Player engine
//!
//! - Controller: play/pause/seek/rate/volume state machine over both sinks
//! - Tracks: exclusive subtitle and alternate-audio selection
//! - Driver: async event loop feeding host events, commands and the clock

pub mod controller;
pub mod driver;
pub mod state;
pub mod tracks;

pub use controller::{PlaybackController, PlayerOptions, DRIFT_THRESHOLD};
pub use driver::{run_session, session_channel, PlayerCommand, SessionHandle, SessionInput};
pub use state::{Phase, PlaybackState, PlayerError};
pub use tracks::{is_placeholder_url, AudioChange, TrackError, TrackSelection};
