//! Source resolver
//!
//! Turns a catalog record into the ordered list of playback candidates.
//! Direct sources win outright; embed mirrors are only generated when the
//! record carries no playable URL of its own.

use std::collections::HashSet;

use url::Url;

use crate::models::{CandidateSource, MediaKind, PlaybackRecord, Resolution, StreamKind};

/// Embed mirror URL template.
///
/// `{id}`, `{season}` and `{episode}` are substituted. A mirror without a
/// movie template only serves episodic content.
struct Mirror {
    name: &'static str,
    movie: Option<&'static str>,
    episode: &'static str,
}

impl Mirror {
    fn url(&self, id: &str, kind: MediaKind, season: u32, episode: u32) -> Option<String> {
        let template = if kind.is_episodic() {
            self.episode
        } else {
            self.movie?
        };
        Some(
            template
                .replace("{id}", &urlencoding::encode(id))
                .replace("{season}", &season.to_string())
                .replace("{episode}", &episode.to_string()),
        )
    }
}

const MULTI_AUDIO: Mirror = Mirror {
    name: "Multi Audio",
    movie: Some("https://vidembed.stream/embed/movie/{id}"),
    episode: "https://vidembed.stream/embed/tv/{id}/{season}/{episode}",
};

const SERVER_TWO: Mirror = Mirror {
    name: "Server 2",
    movie: Some("https://embedstream.cc/embed/movie/{id}"),
    episode: "https://embedstream.cc/embed/tv/{id}/{season}/{episode}",
};

const LEGACY: Mirror = Mirror {
    name: "Legacy",
    movie: Some("https://legacyplayer.net/embed/movie/{id}"),
    episode: "https://legacyplayer.net/embed/tv/{id}/{season}-{episode}",
};

const LEGACY_ALT: Mirror = Mirror {
    name: "Legacy (Alt)",
    movie: Some("https://legacyplayer.net/e/movie?id={id}"),
    episode: "https://legacyplayer.net/e/tv?id={id}&s={season}&e={episode}",
};

const GLOBAL: Mirror = Mirror {
    name: "Global Mirror",
    movie: Some("https://globalmirror.to/movie/{id}"),
    episode: "https://globalmirror.to/tv/{id}/{season}/{episode}",
};

const VIP: Mirror = Mirror {
    name: "VIP",
    movie: None,
    episode: "https://vipstream.to/tv/{id}-{season}-{episode}",
};

const ANIME_ANILIST: &str = "https://animembed.net/anilist/{id}/{episode}";
const ANIME_MAL: &str = "https://animembed.net/mal/{id}/{episode}";

/// Query hint asking the multi-audio mirror for its Hindi dub
const HINDI_HINT: (&str, &str) = ("ds_lang", "hi");

/// Resolve the ordered candidate list for a record at a season/episode.
///
/// Missing season/episode default to 1. An empty result means the record
/// has nothing playable.
pub fn resolve(
    record: &PlaybackRecord,
    season: Option<u32>,
    episode: Option<u32>,
) -> Vec<CandidateSource> {
    if let Some(manifest) = record.manifest() {
        return vec![CandidateSource::Direct {
            url: manifest.to_string(),
            kind: StreamKind::Manifest,
        }];
    }

    if let Some((_, url)) = record.direct_sources.best_available() {
        return vec![CandidateSource::Direct {
            url: url.to_string(),
            kind: StreamKind::Progressive,
        }];
    }

    let candidates = embed_candidates(record, season.unwrap_or(1), episode.unwrap_or(1));
    tracing::debug!(count = candidates.len(), "resolved embed candidates");
    candidates
}

/// Progressive resolutions the resolution menu can offer
pub fn available_resolutions(record: &PlaybackRecord) -> Vec<Resolution> {
    if record.manifest().is_some() {
        return Vec::new();
    }
    record.direct_sources.available()
}

fn embed_candidates(record: &PlaybackRecord, season: u32, episode: u32) -> Vec<CandidateSource> {
    let kind = record.media_kind;
    let ids = &record.external_ids;
    let mut list = EmbedList::default();

    if let Some(tmdb) = ids.tmdb() {
        if let Some(base) = MULTI_AUDIO.url(tmdb, kind, season, episode) {
            list.push("Hindi Dub", with_query(&base, HINDI_HINT.0, HINDI_HINT.1));
            list.push(MULTI_AUDIO.name, base);
        }
        for mirror in [&SERVER_TWO, &LEGACY, &GLOBAL, &VIP] {
            if let Some(url) = mirror.url(tmdb, kind, season, episode) {
                list.push(mirror.name, url);
            }
        }
    }

    let anime = ids
        .anilist()
        .map(|id| (ANIME_ANILIST, id))
        .or_else(|| ids.mal().map(|id| (ANIME_MAL, id)));
    if let Some((template, id)) = anime {
        let url = template
            .replace("{id}", &urlencoding::encode(id))
            .replace("{episode}", &episode.to_string());
        list.push("Anime", url);
    }

    if let Some(legacy) = ids.legacy() {
        for mirror in [&LEGACY, &LEGACY_ALT] {
            if let Some(url) = mirror.url(legacy, kind, season, episode) {
                list.push(mirror.name, url);
            }
        }
    } else if let Some(tmdb) = ids.tmdb() {
        if let Some(url) = LEGACY.url(tmdb, kind, season, episode) {
            list.push(LEGACY.name, url);
        }
    }

    list.into_inner()
}

/// Ordered embed list that drops repeated URLs
#[derive(Default)]
struct EmbedList {
    seen: HashSet<String>,
    items: Vec<CandidateSource>,
}

impl EmbedList {
    fn push(&mut self, name: &str, url: String) {
        if self.seen.insert(url.clone()) {
            self.items.push(CandidateSource::Embed {
                name: name.to_string(),
                url,
            });
        }
    }

    fn into_inner(self) -> Vec<CandidateSource> {
        self.items
    }
}

/// Append a query pair, leaving the URL unchanged if it does not parse
fn with_query(url: &str, key: &str, value: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair(key, value);
            parsed.to_string()
        }
        Err(e) => {
            tracing::debug!(%url, error = %e, "cannot add query to mirror URL");
            url.to_string()
        }
    }
}
