//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the appropriate backend services.
//! Each handler takes CLI args and Output, returns ExitCode.

use serde::Serialize;
use std::path::Path;

use crate::cli::{
    ExitCode, Output, PlayCmd, PlayResponse, ProbeCmd, RecordSource, ResolveCmd, ResolveResponse,
    TracksCmd,
};
use streamwatch::api::{CatalogClient, CatalogError, ManifestClient};
use streamwatch::config::Config;
use streamwatch::models::{
    format_time, is_supported_speed, snap_speed, AudioSelection, CandidateSource, PlaybackRecord,
    Resolution, ResolutionChoice, StreamKind, Track,
};
use streamwatch::player::{is_placeholder_url, AudioChange, TrackSelection};
use streamwatch::resolver;
use streamwatch::stream::{cap_level, HandoffRequest, LocalPlayer, PlayerType, Variant};

// =============================================================================
// Record Loading
// =============================================================================

/// Fetch the record from the catalog, or read it from `--file`
async fn load_record(
    source: &RecordSource,
    catalog: &CatalogClient,
    output: &Output,
) -> Result<PlaybackRecord, ExitCode> {
    if let Some(path) = &source.file {
        return read_record(path, output);
    }

    let Some(id) = source.id.as_deref() else {
        return Err(output.error("Give a video id or --file", ExitCode::InvalidArgs));
    };

    output.info(format!("Fetching {} from {}...", id, catalog.base_url()));
    match catalog.fetch(id).await {
        Ok(record) => Ok(record),
        Err(e) => {
            let code = match e.downcast_ref::<CatalogError>() {
                Some(CatalogError::NotFound) => ExitCode::NotFound,
                Some(CatalogError::InvalidResponse(_)) => ExitCode::Error,
                _ => ExitCode::NetworkError,
            };
            Err(output.error(format!("Catalog lookup failed: {}", e), code))
        }
    }
}

fn read_record(path: &Path, output: &Output) -> Result<PlaybackRecord, ExitCode> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        output.error(
            format!("Cannot read {}: {}", path.display(), e),
            ExitCode::InvalidArgs,
        )
    })?;
    serde_json::from_str(&text).map_err(|e| {
        output.error(
            format!("Invalid record in {}: {}", path.display(), e),
            ExitCode::InvalidArgs,
        )
    })
}

// =============================================================================
// Resolve Command
// =============================================================================

pub async fn resolve_cmd(cmd: ResolveCmd, catalog: &CatalogClient, output: &Output) -> ExitCode {
    let record = match load_record(&cmd.source, catalog, output).await {
        Ok(record) => record,
        Err(code) => return code,
    };

    let candidates = resolver::resolve(&record, cmd.season, cmd.episode);
    if candidates.is_empty() {
        return output.error("No Video Source", ExitCode::NoSource);
    }

    let (season, episode) = if record.media_kind.is_episodic() {
        (
            cmd.season.or(record.season).or(Some(1)),
            cmd.episode.or(record.episode).or(Some(1)),
        )
    } else {
        (None, None)
    };

    let response = ResolveResponse {
        season,
        episode,
        candidates,
    };
    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Tracks Command
// =============================================================================

#[derive(Debug, Serialize)]
struct TrackInfo {
    language: String,
    url: String,
    usable: bool,
}

impl From<&Track> for TrackInfo {
    fn from(track: &Track) -> Self {
        Self {
            language: track.language.clone(),
            url: track.url.clone(),
            usable: !is_placeholder_url(&track.url),
        }
    }
}

#[derive(Debug, Serialize)]
struct TracksResponse {
    resolutions: Vec<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<String>,
    subtitles: Vec<TrackInfo>,
    audio: Vec<TrackInfo>,
    default_speed: f32,
}

pub async fn tracks_cmd(cmd: TracksCmd, catalog: &CatalogClient, output: &Output) -> ExitCode {
    let record = match load_record(&cmd.source, catalog, output).await {
        Ok(record) => record,
        Err(code) => return code,
    };

    let response = TracksResponse {
        resolutions: resolver::available_resolutions(&record),
        manifest: record.manifest().map(str::to_string),
        subtitles: record.subtitle_tracks.iter().map(TrackInfo::from).collect(),
        audio: record.audio_tracks.iter().map(TrackInfo::from).collect(),
        default_speed: snap_speed(record.default_speed),
    };

    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Probe Command
// =============================================================================

#[derive(Debug, Serialize)]
struct ProbeResponse {
    manifest: String,
    player_size: (u32, u32),
    variants: Vec<Variant>,
    /// Rendition the adaptive engine would be capped to
    #[serde(skip_serializing_if = "Option::is_none")]
    capped: Option<usize>,
}

pub async fn probe_cmd(cmd: ProbeCmd, catalog: &CatalogClient, output: &Output) -> ExitCode {
    let record = match load_record(&cmd.source, catalog, output).await {
        Ok(record) => record,
        Err(code) => return code,
    };

    let Some(manifest) = record.manifest().map(str::to_string) else {
        return output.error("Record has no adaptive stream", ExitCode::NoSource);
    };

    output.info(format!("Fetching manifest: {}", manifest));
    let playlist = match ManifestClient::new().fetch_master(&manifest).await {
        Ok(playlist) => playlist,
        Err(e) => {
            return output.error(
                format!("Manifest fetch failed: {}", e),
                ExitCode::NetworkError,
            )
        }
    };

    let capped = cap_level(&playlist.variants, cmd.width, cmd.height);
    let response = ProbeResponse {
        manifest,
        player_size: (cmd.width, cmd.height),
        variants: playlist.variants,
        capped,
    };

    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Play Command
// =============================================================================

pub async fn play_cmd(
    cmd: PlayCmd,
    catalog: &CatalogClient,
    config: &Config,
    output: &Output,
) -> ExitCode {
    let start_seconds = match cmd.start_seconds() {
        Ok(start) => start,
        Err(msg) => return output.error(msg, ExitCode::InvalidArgs),
    };
    if let Some(speed) = cmd.speed {
        if !is_supported_speed(speed) {
            return output.error(
                format!("Unsupported speed {} (0.25 - 2.0 in 0.25 steps)", speed),
                ExitCode::InvalidArgs,
            );
        }
    }

    let record = match load_record(&cmd.source, catalog, output).await {
        Ok(record) => record,
        Err(code) => return code,
    };

    let candidates = resolver::resolve(&record, cmd.season, cmd.episode);
    let Some(primary) = candidates.iter().find(|c| c.is_direct()) else {
        if candidates.is_empty() {
            return output.error("No Video Source", ExitCode::NoSource);
        }
        for candidate in &candidates {
            output.info(candidate.to_string());
        }
        return output.error(
            "Only embedded mirrors are available; open one in a browser",
            ExitCode::EmbedOnly,
        );
    };

    let mut request = match HandoffRequest::from_candidate(primary) {
        Ok(request) => request,
        Err(e) => return output.error(e.to_string(), ExitCode::EmbedOnly),
    };

    let defaults = config.player_options();

    // Fixed resolutions only apply to progressive files
    if let CandidateSource::Direct {
        kind: StreamKind::Progressive,
        ..
    } = primary
    {
        let choice = cmd.resolution.map(ResolutionChoice::from).unwrap_or(defaults.resolution);
        if let ResolutionChoice::Fixed(resolution) = choice {
            match record.direct_sources.get(resolution) {
                Some(url) => request.url = url.to_string(),
                None if cmd.resolution.is_some() => {
                    return output.error(
                        format!("{} is not available for this video", resolution),
                        ExitCode::InvalidArgs,
                    )
                }
                None => tracing::debug!(%resolution, "preferred resolution unavailable"),
            }
        }
    }

    let mut tracks = TrackSelection::new(record.subtitle_tracks.clone(), record.audio_tracks.clone());

    if let Some(language) = cmd.subtitle.as_deref().or(defaults.subtitle.as_deref()) {
        match tracks.select_subtitle(Some(language)) {
            Ok(track) => request.subtitle_url = track.map(|t| t.url.clone()),
            Err(e) if cmd.subtitle.is_some() => {
                return output.error(e.to_string(), ExitCode::InvalidArgs)
            }
            Err(e) => tracing::debug!(error = %e, "configured subtitle unavailable"),
        }
    }

    let audio = cmd
        .audio
        .as_deref()
        .map(AudioSelection::parse)
        .unwrap_or(defaults.audio);
    match tracks.select_audio(&audio) {
        Ok(AudioChange::ToAlternate(track)) => request.audio_url = Some(track.url),
        Ok(_) => {}
        Err(e) if cmd.audio.is_some() => return output.error(e.to_string(), ExitCode::InvalidArgs),
        Err(e) => tracing::debug!(error = %e, "configured audio track unavailable"),
    }

    request.start_seconds = start_seconds.map(|s| s as f64);
    let speed = cmd.speed.unwrap_or_else(|| snap_speed(record.default_speed));
    if (speed - 1.0).abs() > f32::EPSILON {
        request.speed = Some(speed);
    }

    let player_type = cmd
        .player
        .map(PlayerType::from)
        .unwrap_or_else(|| config.player_type());
    play_locally(&request, player_type, output).await
}

// =============================================================================
// Local Player Helpers
// =============================================================================

async fn play_locally(request: &HandoffRequest, player_type: PlayerType, output: &Output) -> ExitCode {
    let player = LocalPlayer::new(player_type);

    if !player.is_available().await {
        return output.error(
            format!(
                "{} not found. Install it first.",
                player_type.display_name()
            ),
            ExitCode::PlayerFailed,
        );
    }

    match request.start_seconds {
        Some(start) => output.info(format!(
            "Opening in {} at {}...",
            player_type.display_name(),
            format_time(start)
        )),
        None => output.info(format!("Opening in {}...", player_type.display_name())),
    }

    match player.play(request).await {
        Ok(_child) => {
            let response = PlayResponse {
                status: "playing",
                player: player_type.display_name().to_string(),
                url: request.url.clone(),
                subtitle: request.subtitle_url.clone(),
                audio: request.audio_url.clone(),
            };

            if let Err(e) = output.print(&response) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Failed to start player: {}", e), ExitCode::PlayerFailed),
    }
}
