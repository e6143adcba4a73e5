//! Stream loader
//!
//! Binds one candidate at a time to the host surfaces: a manifest goes
//! through the adaptive engine, a progressive URL straight into the video
//! sink, an embed into the sandboxed surface. Whatever was attached before
//! is torn down first so two surfaces never compete for output.

use std::time::{Duration, Instant};

use crate::models::{CandidateSource, StreamKind};
use crate::stream::hls;
use crate::stream::sink::{
    AdaptiveConfig, AudioSink, SinkEvent, Sinks, VideoSink, EMBED_SANDBOX,
};

/// How long the embed loading indicator stays up without a load event
pub const EMBED_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// What is currently bound to the host surfaces
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    Detached,
    Direct { url: String, kind: StreamKind },
    Embed { index: usize, url: String },
}

/// Load outcome reported back to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderSignal {
    /// Source is ready; for manifests this is the manifest-parsed point
    Ready,
    /// Unrecoverable failure of the attached source
    Error(String),
}

/// Owns the host surfaces for one watch session
#[derive(Debug)]
pub struct StreamLoader {
    sinks: Sinks,
    config: AdaptiveConfig,
    attachment: Attachment,
    loading_since: Option<Instant>,
}

impl StreamLoader {
    pub fn new(sinks: Sinks) -> Self {
        Self::with_config(sinks, AdaptiveConfig::default())
    }

    pub fn with_config(sinks: Sinks, config: AdaptiveConfig) -> Self {
        Self {
            sinks,
            config,
            attachment: Attachment::Detached,
            loading_since: None,
        }
    }

    /// Bind a candidate, detaching whatever was there.
    ///
    /// `index` is the candidate's position in the resolved list and is only
    /// recorded for embeds.
    pub fn attach(&mut self, candidate: &CandidateSource, index: usize, now: Instant) {
        self.detach();

        match candidate {
            CandidateSource::Direct {
                url,
                kind: StreamKind::Manifest,
            } => {
                tracing::info!(%url, "starting adaptive session");
                self.sinks.adaptive.start(url, &self.config);
            }
            CandidateSource::Direct {
                url,
                kind: StreamKind::Progressive,
            } => {
                tracing::info!(%url, "binding progressive source");
                self.sinks.video.set_source(url);
            }
            CandidateSource::Embed { name, url } => {
                tracing::info!(%name, %url, index, "mounting embed");
                self.sinks.embed.mount(url, EMBED_SANDBOX);
                self.loading_since = Some(now);
            }
        }

        self.attachment = match candidate {
            CandidateSource::Direct { url, kind } => Attachment::Direct {
                url: url.clone(),
                kind: *kind,
            },
            CandidateSource::Embed { url, .. } => Attachment::Embed {
                index,
                url: url.clone(),
            },
        };
    }

    /// Tear down the current attachment, if any
    pub fn detach(&mut self) {
        match std::mem::take(&mut self.attachment) {
            Attachment::Detached => {}
            Attachment::Direct {
                kind: StreamKind::Manifest,
                ..
            } => {
                self.sinks.adaptive.stop();
                self.sinks.video.clear_source();
            }
            Attachment::Direct {
                kind: StreamKind::Progressive,
                ..
            } => {
                self.sinks.video.clear_source();
            }
            Attachment::Embed { .. } => {
                self.sinks.embed.unmount();
            }
        }
        self.loading_since = None;
    }

    /// Interpret a host event for the attached source
    pub fn handle(&mut self, event: &SinkEvent) -> Option<LoaderSignal> {
        match (&self.attachment, event) {
            (
                Attachment::Direct {
                    kind: StreamKind::Manifest,
                    ..
                },
                SinkEvent::ManifestParsed { variants },
            ) => {
                if self.config.cap_level_to_player_size {
                    let (width, height) = self.sinks.video.display_size();
                    let level = hls::cap_level(variants, width, height);
                    tracing::debug!(?level, width, height, "capping rendition to player size");
                    self.sinks.adaptive.cap_level(level);
                }
                Some(LoaderSignal::Ready)
            }
            (
                Attachment::Direct {
                    kind: StreamKind::Manifest,
                    ..
                },
                SinkEvent::AdaptiveError { fatal, details },
            ) => {
                if *fatal {
                    Some(LoaderSignal::Error(details.clone()))
                } else {
                    tracing::debug!(%details, "non-fatal adaptive error");
                    None
                }
            }
            (
                Attachment::Direct {
                    kind: StreamKind::Progressive,
                    ..
                },
                SinkEvent::LoadedMetadata,
            ) => Some(LoaderSignal::Ready),
            (Attachment::Direct { .. }, SinkEvent::Error { message }) => {
                Some(LoaderSignal::Error(message.clone()))
            }
            (Attachment::Embed { .. }, SinkEvent::EmbedLoaded) => {
                self.loading_since = None;
                Some(LoaderSignal::Ready)
            }
            _ => None,
        }
    }

    /// Clear the embed loading indicator once the bound has passed.
    ///
    /// Returns true when this call cleared it. The surface stays mounted.
    pub fn poll_timeout(&mut self, now: Instant) -> bool {
        match self.loading_since {
            Some(since) if now.saturating_duration_since(since) >= EMBED_LOAD_TIMEOUT => {
                tracing::debug!("embed load timed out, hiding indicator");
                self.loading_since = None;
                true
            }
            _ => false,
        }
    }

    /// Whether the embed loading indicator is showing
    pub fn is_loading(&self) -> bool {
        self.loading_since.is_some()
    }

    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.attachment, Attachment::Direct { .. })
    }

    pub fn is_embed(&self) -> bool {
        matches!(self.attachment, Attachment::Embed { .. })
    }

    pub fn video(&self) -> &dyn VideoSink {
        self.sinks.video.as_ref()
    }

    pub fn video_mut(&mut self) -> &mut dyn VideoSink {
        self.sinks.video.as_mut()
    }

    pub fn audio(&self) -> &dyn AudioSink {
        self.sinks.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> &mut dyn AudioSink {
        self.sinks.audio.as_mut()
    }
}
