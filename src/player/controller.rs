//! Playback controller
//!
//! Owns the session state and drives the primary video sink plus, when an
//! alternate-language track is active, the secondary audio sink. The
//! primary is always authoritative; the secondary only follows it.

use std::time::Instant;

use uuid::Uuid;

use crate::models::{
    is_supported_speed, snap_speed, AudioSelection, CandidateSource, PlaybackRecord, Resolution,
    ResolutionChoice, StreamKind, Track,
};
use crate::player::state::{Phase, PlaybackState, PlayerError};
use crate::player::tracks::{AudioChange, TrackSelection};
use crate::resolver;
use crate::stream::loader::{Attachment, LoaderSignal, StreamLoader};
use crate::stream::sink::{SinkEvent, Sinks};

/// Secondary sink is re-seeked when it drifts further than this (seconds)
pub const DRIFT_THRESHOLD: f64 = 0.2;

/// Session preferences applied when the player opens
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    pub volume: f32,
    pub muted: bool,
    pub resolution: ResolutionChoice,
    pub subtitle: Option<String>,
    pub audio: AudioSelection,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            resolution: ResolutionChoice::Auto,
            subtitle: None,
            audio: AudioSelection::Default,
        }
    }
}

/// One watch session's player
#[derive(Debug)]
pub struct PlaybackController {
    id: Uuid,
    record: PlaybackRecord,
    season: Option<u32>,
    episode: Option<u32>,
    candidates: Vec<CandidateSource>,
    loader: StreamLoader,
    tracks: TrackSelection,
    state: PlaybackState,
    phase: Phase,
    options: PlayerOptions,
    autoplay_pending: bool,
    closed: bool,
}

impl PlaybackController {
    pub fn new(record: PlaybackRecord, sinks: Sinks, options: PlayerOptions) -> Self {
        Self::with_loader(record, StreamLoader::new(sinks), options)
    }

    pub fn with_loader(record: PlaybackRecord, loader: StreamLoader, options: PlayerOptions) -> Self {
        let state = PlaybackState {
            volume: options.volume.clamp(0.0, 1.0),
            muted: options.muted,
            rate: snap_speed(record.default_speed),
            ..PlaybackState::default()
        };
        let tracks = TrackSelection::new(record.subtitle_tracks.clone(), record.audio_tracks.clone());

        Self {
            id: Uuid::new_v4(),
            season: record.season,
            episode: record.episode,
            record,
            candidates: Vec::new(),
            loader,
            tracks,
            state,
            phase: Phase::Idle,
            options,
            autoplay_pending: false,
            closed: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn record(&self) -> &PlaybackRecord {
        &self.record
    }

    pub fn candidates(&self) -> &[CandidateSource] {
        &self.candidates
    }

    pub fn tracks(&self) -> &TrackSelection {
        &self.tracks
    }

    pub fn attachment(&self) -> &Attachment {
        self.loader.attachment()
    }

    pub fn episode(&self) -> (Option<u32>, Option<u32>) {
        (self.season, self.episode)
    }

    /// Embed-only mode: no direct sink, position is a session clock
    pub fn is_embed_mode(&self) -> bool {
        self.loader.is_embed()
    }

    pub fn can_seek(&self) -> bool {
        self.loader.is_direct()
    }

    /// Resolutions the menu can offer (empty for manifests and embeds)
    pub fn available_resolutions(&self) -> Vec<Resolution> {
        resolver::available_resolutions(&self.record)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Resolve candidates and attach the first one
    pub fn open(&mut self, now: Instant) {
        tracing::info!(session = %self.id, kind = %self.record.media_kind, "opening player");
        self.closed = false;
        self.reload(now);

        if let Some(lang) = self.options.subtitle.clone() {
            if let Err(e) = self.set_subtitle(Some(&lang)) {
                tracing::debug!(session = %self.id, error = %e, "preferred subtitle unavailable");
            }
        }
        if self.options.audio != AudioSelection::Default {
            let audio = self.options.audio.clone();
            if let Err(e) = self.set_audio_track(audio) {
                tracing::debug!(session = %self.id, error = %e, "preferred audio unavailable");
            }
        }
        if let ResolutionChoice::Fixed(res) = self.options.resolution {
            if let Err(e) = self.set_resolution(ResolutionChoice::Fixed(res), now) {
                tracing::debug!(session = %self.id, error = %e, "preferred resolution unavailable");
            }
        }
    }

    /// Move to another episode; mirror URLs depend on it so everything is re-resolved.
    /// Ignored for movies.
    pub fn set_episode(&mut self, season: u32, episode: u32, now: Instant) {
        if !self.record.media_kind.is_episodic() {
            tracing::debug!(session = %self.id, season, episode, "ignoring episode change for a movie");
            return;
        }
        if self.season == Some(season) && self.episode == Some(episode) && !self.candidates.is_empty() {
            return;
        }
        tracing::info!(session = %self.id, season, episode, "switching episode");
        self.season = Some(season);
        self.episode = Some(episode);
        self.reload(now);
    }

    /// Detach every surface and stop timers
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        tracing::info!(session = %self.id, "closing player");
        self.loader.detach();
        self.detach_secondary();
        self.state.playing = false;
        self.state.loading = false;
        self.phase = Phase::Idle;
        self.closed = true;
    }

    fn reload(&mut self, now: Instant) {
        self.candidates = resolver::resolve(&self.record, self.season, self.episode);
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.state.playing = false;
        self.state.active_embed_index = 0;
        self.state.active_resolution = ResolutionChoice::Auto;
        self.autoplay_pending = self.record.autoplay;

        if self.candidates.is_empty() {
            tracing::warn!(session = %self.id, "record has no playable source");
            self.loader.detach();
            self.detach_secondary();
            self.state.loading = false;
            self.state.session_clock = false;
            self.phase = Phase::NoSource;
            return;
        }

        self.attach(0, now);
    }

    fn attach(&mut self, index: usize, now: Instant) {
        let Some(candidate) = self.candidates.get(index).cloned() else {
            return;
        };
        self.bind(&candidate, index, now);
    }

    fn bind(&mut self, candidate: &CandidateSource, index: usize, now: Instant) {
        self.detach_secondary();
        self.loader.attach(candidate, index, now);
        self.phase = Phase::Loading;

        match candidate {
            CandidateSource::Direct { .. } => {
                self.state.session_clock = false;
                self.state.loading = false;
                let rate = self.state.rate;
                self.loader.video_mut().set_rate(rate);
                let subtitle = self.tracks.active_subtitle().cloned();
                self.loader.video_mut().set_text_track(subtitle.as_ref());
                if let Some(track) = self.tracks.active_audio_track().cloned() {
                    self.load_secondary(&track);
                }
                self.apply_audio_routing();
            }
            CandidateSource::Embed { .. } => {
                self.state.session_clock = true;
                self.state.loading = true;
                self.state.active_embed_index = index;
            }
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Flip play/pause. State follows the sink's own Play/Pause events.
    pub fn toggle_play(&mut self) {
        if self.loader.is_embed() {
            self.state.playing = !self.state.playing;
            return;
        }
        if !self.loader.is_direct() {
            return;
        }
        if self.loader.video().is_paused() {
            self.request_play();
        } else {
            self.request_pause();
        }
    }

    pub fn play(&mut self) {
        if self.loader.is_embed() {
            self.state.playing = true;
        } else if self.loader.is_direct() {
            self.request_play();
        }
    }

    pub fn pause(&mut self) {
        if self.loader.is_embed() {
            self.state.playing = false;
        } else if self.loader.is_direct() {
            self.request_pause();
        }
    }

    fn request_play(&mut self) {
        if let Err(e) = self.loader.video_mut().play() {
            tracing::debug!(session = %self.id, error = %e, "play request rejected");
        }
        if self.tracks.active_audio_track().is_some() {
            if let Err(e) = self.loader.audio_mut().play() {
                tracing::debug!(session = %self.id, error = %e, "secondary play rejected");
            }
        }
    }

    fn request_pause(&mut self) {
        self.loader.video_mut().pause();
        if self.tracks.active_audio_track().is_some() {
            self.loader.audio_mut().pause();
        }
    }

    /// Jump to a position; clamped to [0, duration] when the duration is known
    pub fn seek(&mut self, target: f64) -> Result<(), PlayerError> {
        if self.loader.is_embed() {
            return Err(PlayerError::SeekUnsupported);
        }
        if !self.loader.is_direct() {
            return Err(PlayerError::NoSource);
        }

        let target = self.clamp_position(target);
        self.loader.video_mut().seek(target);
        if self.tracks.active_audio_track().is_some() {
            self.loader.audio_mut().seek(target);
        }
        self.state.current_time = target;

        if self.phase == Phase::Ended && (self.state.duration <= 0.0 || target < self.state.duration) {
            self.phase = Phase::Ready;
        }
        Ok(())
    }

    /// Relative seek
    pub fn skip(&mut self, delta: f64) -> Result<(), PlayerError> {
        let target = self.clamp_position(self.state.current_time + delta);
        self.seek(target)
    }

    fn clamp_position(&self, target: f64) -> f64 {
        let upper = if self.state.duration > 0.0 {
            self.state.duration
        } else {
            f64::MAX
        };
        if target.is_finite() {
            target.clamp(0.0, upper)
        } else {
            0.0
        }
    }

    pub fn set_rate(&mut self, rate: f32) -> Result<(), PlayerError> {
        if !is_supported_speed(rate) {
            return Err(PlayerError::UnsupportedRate(rate));
        }
        self.state.rate = rate;
        if self.loader.is_direct() {
            self.loader.video_mut().set_rate(rate);
            self.loader.audio_mut().set_rate(rate);
        }
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.state.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.apply_audio_routing();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
        self.apply_audio_routing();
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.state.muted);
    }

    /// Route volume/mute to whichever sink is audible
    fn apply_audio_routing(&mut self) {
        if !self.loader.is_direct() {
            return;
        }
        let (volume, muted) = (self.state.volume, self.state.muted);
        if self.tracks.active_audio_track().is_some() {
            self.loader.video_mut().set_volume(0.0);
            self.loader.video_mut().set_muted(true);
            self.loader.audio_mut().set_volume(volume);
            self.loader.audio_mut().set_muted(muted);
        } else {
            self.loader.video_mut().set_volume(volume);
            self.loader.video_mut().set_muted(muted);
        }
    }

    // =========================================================================
    // Source switching
    // =========================================================================

    /// Rebind the progressive source at another resolution, keeping position
    /// and play state
    pub fn set_resolution(&mut self, choice: ResolutionChoice, now: Instant) -> Result<(), PlayerError> {
        match self.loader.attachment() {
            Attachment::Direct {
                kind: StreamKind::Progressive,
                ..
            } => {}
            _ => return Err(PlayerError::NotProgressive),
        }

        let url = match choice {
            ResolutionChoice::Auto => self
                .record
                .direct_sources
                .best_available()
                .map(|(_, url)| url.to_string())
                .ok_or(PlayerError::NoSource)?,
            ResolutionChoice::Fixed(res) => self
                .record
                .direct_sources
                .get(res)
                .map(str::to_string)
                .ok_or(PlayerError::ResolutionUnavailable(res))?,
        };

        if choice == self.state.active_resolution && !self.phase.is_error() {
            return Ok(());
        }

        let position = self.state.current_time;
        let was_playing = self.state.playing;
        tracing::info!(session = %self.id, resolution = %choice, position, "switching resolution");

        let candidate = CandidateSource::Direct {
            url,
            kind: StreamKind::Progressive,
        };
        self.bind(&candidate, 0, now);
        self.state.active_resolution = choice;

        self.loader.video_mut().seek(position);
        if self.tracks.active_audio_track().is_some() {
            self.loader.audio_mut().seek(position);
        }
        self.state.current_time = position;
        self.state.playing = was_playing;
        if was_playing {
            self.request_play();
        }
        Ok(())
    }

    /// Mount another mirror; always remounts and restarts the loading timer
    pub fn select_embed(&mut self, index: usize, now: Instant) -> Result<(), PlayerError> {
        if !self.candidates.first().is_some_and(|c| !c.is_direct()) {
            return Err(PlayerError::NotEmbedMode);
        }
        if index >= self.candidates.len() {
            return Err(PlayerError::EmbedOutOfRange(index));
        }
        tracing::info!(session = %self.id, index, "switching mirror");
        self.state.current_time = 0.0;
        self.state.playing = false;
        self.attach(index, now);
        Ok(())
    }

    /// Mount the next mirror, wrapping around
    pub fn next_embed(&mut self, now: Instant) -> Result<(), PlayerError> {
        if self.candidates.is_empty() {
            return Err(PlayerError::NotEmbedMode);
        }
        let next = (self.state.active_embed_index + 1) % self.candidates.len();
        self.select_embed(next, now)
    }

    // =========================================================================
    // Tracks
    // =========================================================================

    /// Show a subtitle language or hide subtitles. No visible effect on embeds.
    pub fn set_subtitle(&mut self, language: Option<&str>) -> Result<(), PlayerError> {
        let track = self.tracks.select_subtitle(language)?.cloned();
        self.state.active_subtitle = track.as_ref().map(|t| t.language.clone());
        if self.loader.is_direct() {
            self.loader.video_mut().set_text_track(track.as_ref());
        }
        Ok(())
    }

    /// Switch between the primary's audio and an alternate track.
    ///
    /// Placeholder URLs are rejected and leave the selection unchanged.
    pub fn set_audio_track(&mut self, selection: AudioSelection) -> Result<(), PlayerError> {
        match self.tracks.select_audio(&selection)? {
            AudioChange::Unchanged => {}
            AudioChange::ToDefault => {
                tracing::info!(session = %self.id, "restoring default audio");
                self.detach_secondary();
                self.state.active_audio = AudioSelection::Default;
                self.apply_audio_routing();
            }
            AudioChange::ToAlternate(track) => {
                tracing::info!(session = %self.id, language = %track.language, "switching audio track");
                self.state.active_audio = AudioSelection::Alternate(track.language.clone());
                if self.loader.is_direct() {
                    self.load_secondary(&track);
                    self.apply_audio_routing();
                }
            }
        }
        Ok(())
    }

    fn load_secondary(&mut self, track: &Track) {
        let position = self.loader.video().position();
        let rate = self.state.rate;
        let audio = self.loader.audio_mut();
        audio.pause();
        audio.set_source(&track.url);
        audio.set_rate(rate);
        audio.seek(position);
        if self.state.playing {
            if let Err(e) = self.loader.audio_mut().play() {
                tracing::debug!(session = %self.id, error = %e, "secondary play rejected");
            }
        }
    }

    fn detach_secondary(&mut self) {
        let audio = self.loader.audio_mut();
        audio.pause();
        audio.clear_source();
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Feed a host callback into the state machine
    pub fn handle_event(&mut self, event: SinkEvent) {
        match self.loader.handle(&event) {
            Some(LoaderSignal::Ready) => self.on_ready(),
            Some(LoaderSignal::Error(message)) => self.on_error(message),
            None => {}
        }

        if !self.loader.is_direct() {
            return;
        }

        match event {
            SinkEvent::TimeUpdate { position } => self.on_time_update(position),
            SinkEvent::DurationChange { duration } => {
                if duration.is_finite() && duration > 0.0 {
                    self.state.duration = duration;
                }
            }
            SinkEvent::Play => {
                self.state.playing = true;
                if self.phase == Phase::Ended {
                    self.phase = Phase::Ready;
                }
                if self.tracks.active_audio_track().is_some() && self.loader.audio().is_paused() {
                    let position = self.loader.video().position();
                    self.loader.audio_mut().seek(position);
                    if let Err(e) = self.loader.audio_mut().play() {
                        tracing::debug!(session = %self.id, error = %e, "secondary play rejected");
                    }
                }
            }
            SinkEvent::Pause => {
                self.state.playing = false;
                if self.tracks.active_audio_track().is_some() {
                    self.loader.audio_mut().pause();
                }
            }
            SinkEvent::Ended => {
                self.state.playing = false;
                self.phase = Phase::Ended;
                self.loader.audio_mut().pause();
            }
            _ => {}
        }
    }

    fn on_ready(&mut self) {
        if self.phase.is_error() {
            return;
        }
        self.phase = Phase::Ready;
        if self.loader.is_embed() {
            self.on_embed_ready();
            return;
        }
        if self.autoplay_pending {
            self.autoplay_pending = false;
            self.request_play();
        }
    }

    /// The surface is opaque, so autoplay just starts the session clock
    fn on_embed_ready(&mut self) {
        self.state.loading = false;
        if self.autoplay_pending {
            self.autoplay_pending = false;
            self.state.playing = true;
        }
    }

    fn on_error(&mut self, message: String) {
        tracing::warn!(session = %self.id, %message, "playback source failed");
        self.state.playing = false;
        self.loader.audio_mut().pause();
        self.phase = Phase::Error(message);
    }

    fn on_time_update(&mut self, position: f64) {
        self.state.current_time = position;
        if self.tracks.active_audio_track().is_none() {
            return;
        }
        let drift = (self.loader.audio().position() - position).abs();
        if drift > DRIFT_THRESHOLD {
            tracing::debug!(session = %self.id, drift, "re-syncing secondary audio");
            self.loader.audio_mut().seek(position);
        }
    }

    /// Once-per-second housekeeping: embed load timeout and session clock
    pub fn tick(&mut self, now: Instant) {
        if self.loader.poll_timeout(now) {
            self.state.loading = false;
            if self.phase == Phase::Loading {
                self.phase = Phase::Ready;
                self.on_embed_ready();
            }
        }
        if self.loader.is_embed() && self.state.playing {
            self.state.current_time += 1.0;
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.close();
    }
}
