//! Shared test doubles
//!
//! Recording sinks that stand in for host media elements. Each mock keeps
//! its state behind `Rc<RefCell<..>>` so a test can inspect it after the
//! boxes have been moved into the controller.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use streamwatch::models::{DirectSources, ExternalIds, MediaKind, PlaybackRecord, Track};
use streamwatch::stream::{
    AdaptiveConfig, AdaptiveEngine, AudioSink, EmbedSurface, SinkError, Sinks, VideoSink,
};

// =============================================================================
// Media element mock
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MediaLog {
    pub source: Option<String>,
    pub paused: bool,
    pub position: f64,
    pub volume: f32,
    pub muted: bool,
    pub rate: f32,
    pub text_track: Option<String>,
    pub display_size: (u32, u32),
    /// Reject play() like a browser blocking autoplay
    pub reject_play: bool,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub seeks: Vec<f64>,
    pub clears: usize,
}

impl Default for MediaLog {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            position: 0.0,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            text_track: None,
            display_size: (1280, 720),
            reject_play: false,
            play_calls: 0,
            pause_calls: 0,
            seeks: Vec::new(),
            clears: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockMedia(pub Rc<RefCell<MediaLog>>);

impl AudioSink for MockMedia {
    fn set_source(&mut self, url: &str) {
        let mut log = self.0.borrow_mut();
        log.source = Some(url.to_string());
        log.position = 0.0;
        log.paused = true;
    }

    fn clear_source(&mut self) {
        let mut log = self.0.borrow_mut();
        log.source = None;
        log.position = 0.0;
        log.paused = true;
        log.clears += 1;
    }

    fn play(&mut self) -> Result<(), SinkError> {
        let mut log = self.0.borrow_mut();
        log.play_calls += 1;
        if log.reject_play {
            return Err(SinkError::PlayRejected("autoplay blocked".into()));
        }
        log.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.0.borrow_mut();
        log.pause_calls += 1;
        log.paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        let mut log = self.0.borrow_mut();
        log.position = seconds;
        log.seeks.push(seconds);
    }

    fn position(&self) -> f64 {
        self.0.borrow().position
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.borrow_mut().muted = muted;
    }

    fn set_rate(&mut self, rate: f32) {
        self.0.borrow_mut().rate = rate;
    }
}

impl VideoSink for MockMedia {
    fn set_text_track(&mut self, track: Option<&Track>) {
        self.0.borrow_mut().text_track = track.map(|t| t.language.clone());
    }

    fn display_size(&self) -> (u32, u32) {
        self.0.borrow().display_size
    }
}

// =============================================================================
// Embed surface mock
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedLog {
    pub mounted: Option<String>,
    pub sandbox: Option<String>,
    pub mounts: usize,
    pub unmounts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockEmbed(pub Rc<RefCell<EmbedLog>>);

impl EmbedSurface for MockEmbed {
    fn mount(&mut self, url: &str, sandbox: &str) {
        let mut log = self.0.borrow_mut();
        log.mounted = Some(url.to_string());
        log.sandbox = Some(sandbox.to_string());
        log.mounts += 1;
    }

    fn unmount(&mut self) {
        let mut log = self.0.borrow_mut();
        log.mounted = None;
        log.unmounts += 1;
    }
}

// =============================================================================
// Adaptive engine mock
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptiveLog {
    pub manifest: Option<String>,
    pub config: Option<AdaptiveConfig>,
    /// Last cap_level call, outer None when never called
    pub cap: Option<Option<usize>>,
    pub starts: usize,
    pub stops: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockAdaptive(pub Rc<RefCell<AdaptiveLog>>);

impl AdaptiveEngine for MockAdaptive {
    fn start(&mut self, manifest_url: &str, config: &AdaptiveConfig) {
        let mut log = self.0.borrow_mut();
        log.manifest = Some(manifest_url.to_string());
        log.config = Some(*config);
        log.starts += 1;
    }

    fn cap_level(&mut self, max_level: Option<usize>) {
        self.0.borrow_mut().cap = Some(max_level);
    }

    fn stop(&mut self) {
        let mut log = self.0.borrow_mut();
        log.manifest = None;
        log.stops += 1;
    }
}

// =============================================================================
// Harness
// =============================================================================

/// Handles to every mock handed to one controller or loader
#[derive(Debug, Clone, Default)]
pub struct Harness {
    pub video: Rc<RefCell<MediaLog>>,
    pub audio: Rc<RefCell<MediaLog>>,
    pub embed: Rc<RefCell<EmbedLog>>,
    pub adaptive: Rc<RefCell<AdaptiveLog>>,
}

impl Harness {
    pub fn new() -> (Self, Sinks) {
        let harness = Self::default();
        let sinks = harness.sinks();
        (harness, sinks)
    }

    pub fn sinks(&self) -> Sinks {
        Sinks {
            video: Box::new(MockMedia(self.video.clone())),
            audio: Box::new(MockMedia(self.audio.clone())),
            embed: Box::new(MockEmbed(self.embed.clone())),
            adaptive: Box::new(MockAdaptive(self.adaptive.clone())),
        }
    }

    pub fn video(&self) -> MediaLog {
        self.video.borrow().clone()
    }

    pub fn audio(&self) -> MediaLog {
        self.audio.borrow().clone()
    }

    pub fn embed(&self) -> EmbedLog {
        self.embed.borrow().clone()
    }

    pub fn adaptive(&self) -> AdaptiveLog {
        self.adaptive.borrow().clone()
    }

    /// Move the primary's playhead as the host would while playing
    pub fn advance_video(&self, position: f64) {
        self.video.borrow_mut().position = position;
    }

    pub fn set_audio_position(&self, position: f64) {
        self.audio.borrow_mut().position = position;
    }
}

// =============================================================================
// Records
// =============================================================================

pub fn progressive_record() -> PlaybackRecord {
    PlaybackRecord {
        direct_sources: DirectSources {
            url360: Some("https://cdn.test/v/360.mp4".into()),
            url480: Some("https://cdn.test/v/480.mp4".into()),
            url720: Some("https://cdn.test/v/720.mp4".into()),
            url1080: None,
        },
        subtitle_tracks: vec![
            Track::new("English", "https://cdn.test/subs/en.vtt"),
            Track::new("Spanish", "https://cdn.test/subs/es.vtt"),
        ],
        audio_tracks: vec![
            Track::new("Hindi", "https://cdn.test/audio/hi.m4a"),
            Track::new("Tamil", "#"),
        ],
        ..PlaybackRecord::default()
    }
}

pub fn manifest_record() -> PlaybackRecord {
    PlaybackRecord {
        manifest_url: Some("https://cdn.test/v/master.m3u8".into()),
        ..progressive_record()
    }
}

pub fn tmdb_movie(tmdb_id: &str) -> PlaybackRecord {
    PlaybackRecord {
        external_ids: ExternalIds {
            tmdb_id: Some(tmdb_id.into()),
            ..ExternalIds::default()
        },
        ..PlaybackRecord::default()
    }
}

pub fn tmdb_series(tmdb_id: &str, season: u32, episode: u32) -> PlaybackRecord {
    PlaybackRecord {
        media_kind: MediaKind::Series,
        season: Some(season),
        episode: Some(episode),
        ..tmdb_movie(tmdb_id)
    }
}
