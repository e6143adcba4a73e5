//! Track selection
//!
//! Keeps the subtitle and alternate-audio menus and enforces that at most
//! one of each is active. Sink side effects are applied by the controller
//! from the [`AudioChange`] this module returns.

use thiserror::Error;

use crate::models::{AudioSelection, Track};

/// Errors from track selection; the previous selection is kept on error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("No subtitle track for language '{0}'")]
    UnknownSubtitle(String),
    #[error("No audio track for language '{0}'")]
    UnknownAudio(String),
    #[error("Audio track '{0}' has no usable URL")]
    PlaceholderUrl(String),
}

/// What the controller has to do after an audio selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioChange {
    /// Requested selection was already active
    Unchanged,
    /// Back to the primary sink's own audio
    ToDefault,
    /// Load this track into the secondary sink
    ToAlternate(Track),
}

/// Exclusive subtitle/audio selection state
#[derive(Debug, Clone, Default)]
pub struct TrackSelection {
    subtitles: Vec<Track>,
    audio: Vec<Track>,
    active_subtitle: Option<usize>,
    active_audio: Option<usize>,
}

impl TrackSelection {
    pub fn new(subtitles: Vec<Track>, audio: Vec<Track>) -> Self {
        Self {
            subtitles,
            audio,
            active_subtitle: None,
            active_audio: None,
        }
    }

    pub fn subtitles(&self) -> &[Track] {
        &self.subtitles
    }

    pub fn audio_tracks(&self) -> &[Track] {
        &self.audio
    }

    pub fn active_subtitle(&self) -> Option<&Track> {
        self.active_subtitle.and_then(|i| self.subtitles.get(i))
    }

    pub fn active_audio_track(&self) -> Option<&Track> {
        self.active_audio.and_then(|i| self.audio.get(i))
    }

    pub fn active_audio(&self) -> AudioSelection {
        match self.active_audio_track() {
            Some(track) => AudioSelection::Alternate(track.language.clone()),
            None => AudioSelection::Default,
        }
    }

    /// Select a subtitle language, or `None` to turn subtitles off
    pub fn select_subtitle(&mut self, language: Option<&str>) -> Result<Option<&Track>, TrackError> {
        match language {
            None => {
                self.active_subtitle = None;
                Ok(None)
            }
            Some(lang) => {
                let idx = find(&self.subtitles, lang)
                    .ok_or_else(|| TrackError::UnknownSubtitle(lang.to_string()))?;
                self.active_subtitle = Some(idx);
                Ok(self.subtitles.get(idx))
            }
        }
    }

    /// Select the audible source
    pub fn select_audio(&mut self, selection: &AudioSelection) -> Result<AudioChange, TrackError> {
        match selection {
            AudioSelection::Default => {
                if self.active_audio.take().is_some() {
                    Ok(AudioChange::ToDefault)
                } else {
                    Ok(AudioChange::Unchanged)
                }
            }
            AudioSelection::Alternate(lang) => {
                let idx = find(&self.audio, lang)
                    .ok_or_else(|| TrackError::UnknownAudio(lang.clone()))?;
                let track = &self.audio[idx];
                if is_placeholder_url(&track.url) {
                    return Err(TrackError::PlaceholderUrl(track.language.clone()));
                }
                if self.active_audio == Some(idx) {
                    return Ok(AudioChange::Unchanged);
                }
                self.active_audio = Some(idx);
                Ok(AudioChange::ToAlternate(track.clone()))
            }
        }
    }
}

fn find(tracks: &[Track], language: &str) -> Option<usize> {
    let language = language.trim();
    tracks
        .iter()
        .position(|t| t.language.trim().eq_ignore_ascii_case(language))
}

/// Values catalog editors leave behind instead of a real URL
const PLACEHOLDERS: &[&str] = &["#", "null", "undefined", "none", "n/a"];

/// Whether a track URL is unset or a stand-in value
pub fn is_placeholder_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || PLACEHOLDERS.iter().any(|p| url.eq_ignore_ascii_case(p)) {
        return true;
    }
    !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/'))
}
