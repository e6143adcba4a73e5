//! HLS master playlist parsing and player-size capping

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// One rendition listed in a master playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub bandwidth: u64,
    /// width, height
    pub resolution: Option<(u32, u32)>,
    pub codecs: Option<String>,
    pub uri: String,
}

impl Variant {
    pub fn height(&self) -> Option<u32> {
        self.resolution.map(|(_, h)| h)
    }
}

/// Parsed master playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterPlaylist {
    pub variants: Vec<Variant>,
}

fn attribute_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([A-Z0-9-]+)=("[^"]*"|[^,]*)"#).ok())
        .as_ref()
}

impl MasterPlaylist {
    /// Parse master playlist text, resolving variant URIs against `base_url`
    pub fn parse(content: &str, base_url: &str) -> Self {
        let mut variants = Vec::new();
        let mut pending: Option<Variant> = None;

        for line in content.lines().map(str::trim) {
            if let Some(info) = line.strip_prefix("#EXT-X-STREAM-INF:") {
                let mut variant = Variant {
                    bandwidth: 0,
                    resolution: None,
                    codecs: None,
                    uri: String::new(),
                };
                let attributes = attribute_re().into_iter().flat_map(|re| re.captures_iter(info));
                for caps in attributes {
                    let value = caps[2].trim_matches('"');
                    match &caps[1] {
                        "BANDWIDTH" => variant.bandwidth = value.parse().unwrap_or(0),
                        "RESOLUTION" => variant.resolution = parse_resolution(value),
                        "CODECS" => variant.codecs = Some(value.to_string()),
                        _ => {}
                    }
                }
                pending = Some(variant);
            } else if !line.is_empty() && !line.starts_with('#') {
                if let Some(mut variant) = pending.take() {
                    variant.uri = resolve_uri(base_url, line);
                    variants.push(variant);
                }
            }
        }

        Self { variants }
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Resolve a playlist-relative URI against the playlist URL
fn resolve_uri(base_url: &str, uri: &str) -> String {
    match Url::parse(base_url).and_then(|base| base.join(uri)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!(%base_url, %uri, error = %e, "keeping unresolvable variant URI");
            uri.to_string()
        }
    }
}

/// Highest rendition index worth loading at a player size.
///
/// Picks the smallest rendition that covers the player in either dimension,
/// or the largest one when none does. Variants without a RESOLUTION tag are
/// ignored. Returns `None` (no cap) when the size is unknown or nothing is
/// sized.
pub fn cap_level(variants: &[Variant], width: u32, height: u32) -> Option<usize> {
    if width == 0 || height == 0 {
        return None;
    }

    let mut sized: Vec<(usize, u32, u32)> = variants
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.resolution.map(|(w, h)| (i, w, h)))
        .collect();
    sized.sort_by_key(|&(_, w, h)| (h, w));

    sized
        .iter()
        .find(|&&(_, w, h)| w >= width || h >= height)
        .or_else(|| sized.last())
        .map(|&(i, _, _)| i)
}
