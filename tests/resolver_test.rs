//! Source resolver tests
//!
//! Candidate ordering for direct, embed and anime records.

mod common;

use common::{manifest_record, progressive_record, tmdb_movie, tmdb_series};
use streamwatch::models::{
    CandidateSource, DirectSources, ExternalIds, MediaKind, PlaybackRecord, Resolution, StreamKind,
};
use streamwatch::resolver::{available_resolutions, resolve};

fn embed_names(candidates: &[CandidateSource]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| match c {
            CandidateSource::Embed { name, .. } => name.clone(),
            CandidateSource::Direct { .. } => panic!("expected only embeds, got {}", c),
        })
        .collect()
}

// =============================================================================
// Direct Sources
// =============================================================================

#[test]
fn test_manifest_wins_over_progressive() {
    let record = manifest_record();
    let candidates = resolve(&record, None, None);

    assert_eq!(
        candidates,
        vec![CandidateSource::Direct {
            url: "https://cdn.test/v/master.m3u8".into(),
            kind: StreamKind::Manifest,
        }]
    );
}

#[test]
fn test_blank_manifest_is_ignored() {
    let record = PlaybackRecord {
        manifest_url: Some("   ".into()),
        ..progressive_record()
    };
    let candidates = resolve(&record, None, None);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].url(), "https://cdn.test/v/720.mp4");
}

#[test]
fn test_progressive_prefers_720() {
    let candidates = resolve(&progressive_record(), None, None);
    assert_eq!(
        candidates,
        vec![CandidateSource::Direct {
            url: "https://cdn.test/v/720.mp4".into(),
            kind: StreamKind::Progressive,
        }]
    );
}

#[test]
fn test_progressive_tie_break_480_before_1080() {
    let record = PlaybackRecord {
        direct_sources: DirectSources {
            url480: Some("a".into()),
            url1080: Some("b".into()),
            ..DirectSources::default()
        },
        ..PlaybackRecord::default()
    };
    let candidates = resolve(&record, None, None);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].url(), "a");
}

#[test]
fn test_progressive_1080_before_360() {
    let record = PlaybackRecord {
        direct_sources: DirectSources {
            url360: Some("low".into()),
            url1080: Some("high".into()),
            ..DirectSources::default()
        },
        ..PlaybackRecord::default()
    };
    assert_eq!(resolve(&record, None, None)[0].url(), "high");
}

#[test]
fn test_direct_source_suppresses_embeds() {
    let record = PlaybackRecord {
        external_ids: ExternalIds {
            tmdb_id: Some("550".into()),
            ..ExternalIds::default()
        },
        ..progressive_record()
    };
    let candidates = resolve(&record, None, None);
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].is_direct());
}

#[test]
fn test_available_resolutions() {
    assert_eq!(
        available_resolutions(&progressive_record()),
        vec![Resolution::R720, Resolution::R480, Resolution::R360]
    );
    // Manifests choose their own renditions
    assert!(available_resolutions(&manifest_record()).is_empty());
}

// =============================================================================
// Embed Mirrors
// =============================================================================

#[test]
fn test_tmdb_movie_has_five_mirrors() {
    let candidates = resolve(&tmdb_movie("550"), None, None);

    assert_eq!(
        embed_names(&candidates),
        vec!["Hindi Dub", "Multi Audio", "Server 2", "Legacy", "Global Mirror"]
    );
    assert_eq!(
        candidates[0].url(),
        "https://vidembed.stream/embed/movie/550?ds_lang=hi"
    );
    assert_eq!(candidates[1].url(), "https://vidembed.stream/embed/movie/550");
}

#[test]
fn test_tmdb_series_uses_episode_paths() {
    let candidates = resolve(&tmdb_series("1396", 2, 5), Some(2), Some(5));
    let urls: Vec<&str> = candidates.iter().map(|c| c.url()).collect();

    assert_eq!(
        urls,
        vec![
            "https://vidembed.stream/embed/tv/1396/2/5?ds_lang=hi",
            "https://vidembed.stream/embed/tv/1396/2/5",
            "https://embedstream.cc/embed/tv/1396/2/5",
            "https://legacyplayer.net/embed/tv/1396/2-5",
            "https://globalmirror.to/tv/1396/2/5",
            "https://vipstream.to/tv/1396-2-5",
        ]
    );
}

#[test]
fn test_episode_defaults_to_one() {
    let record = PlaybackRecord {
        media_kind: MediaKind::Drama,
        ..tmdb_movie("77")
    };
    let candidates = resolve(&record, None, None);
    assert_eq!(candidates[1].url(), "https://vidembed.stream/embed/tv/77/1/1");
}

#[test]
fn test_season_change_changes_urls() {
    let record = tmdb_series("1396", 1, 1);
    let first = resolve(&record, Some(1), Some(1));
    let second = resolve(&record, Some(3), Some(4));

    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
    assert!(second.iter().all(|c| !c.url().contains("/1/1")));
}

#[test]
fn test_anime_prefers_anilist() {
    let record = PlaybackRecord {
        media_kind: MediaKind::Anime,
        external_ids: ExternalIds {
            mal_id: Some("5114".into()),
            anilist_id: Some("5114a".into()),
            ..ExternalIds::default()
        },
        ..PlaybackRecord::default()
    };
    let candidates = resolve(&record, Some(1), Some(12));

    assert_eq!(
        candidates,
        vec![CandidateSource::Embed {
            name: "Anime".into(),
            url: "https://animembed.net/anilist/5114a/12".into(),
        }]
    );
}

#[test]
fn test_anime_falls_back_to_mal() {
    let record = PlaybackRecord {
        media_kind: MediaKind::Anime,
        external_ids: ExternalIds {
            mal_id: Some("5114".into()),
            ..ExternalIds::default()
        },
        ..PlaybackRecord::default()
    };
    let candidates = resolve(&record, None, Some(3));
    assert_eq!(candidates[0].url(), "https://animembed.net/mal/5114/3");
}

#[test]
fn test_legacy_id_mirrors() {
    let record = PlaybackRecord {
        external_ids: ExternalIds {
            legacy_provider_id: Some("tt0137523".into()),
            ..ExternalIds::default()
        },
        ..PlaybackRecord::default()
    };
    let candidates = resolve(&record, None, None);

    assert_eq!(embed_names(&candidates), vec!["Legacy", "Legacy (Alt)"]);
    assert_eq!(
        candidates[0].url(),
        "https://legacyplayer.net/embed/movie/tt0137523"
    );
    assert_eq!(
        candidates[1].url(),
        "https://legacyplayer.net/e/movie?id=tt0137523"
    );
}

#[test]
fn test_no_identifiers_no_candidates() {
    assert!(resolve(&PlaybackRecord::default(), None, None).is_empty());
    assert!(resolve(&PlaybackRecord::default(), Some(2), Some(3)).is_empty());
}

#[test]
fn test_ids_are_url_encoded() {
    let candidates = resolve(&tmdb_movie("a b/c"), None, None);
    assert_eq!(
        candidates[2].url(),
        "https://embedstream.cc/embed/movie/a%20b%2Fc"
    );
}

// =============================================================================
// Record Parsing
// =============================================================================

#[test]
fn test_catalog_json_record_resolves() {
    let json = r#"{
        "url480": "https://cdn.test/480.mp4",
        "url720": "",
        "tmdbId": 550,
        "type": "movie",
        "subtitles": [{ "lang": "English", "url": "https://cdn.test/en.vtt" }]
    }"#;
    let record: PlaybackRecord = serde_json::from_str(json).unwrap();

    assert_eq!(record.external_ids.tmdb(), Some("550"));
    assert_eq!(record.subtitle_tracks.len(), 1);
    assert_eq!(
        resolve(&record, None, None)[0].url(),
        "https://cdn.test/480.mp4"
    );
}
