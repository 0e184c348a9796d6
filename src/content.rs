//! Content-version data contract and track normalization.
//!
//! A published content version carries covers, a rich-text lyrics document,
//! an e-book URL and its audio: either an explicit track list (each entry
//! optionally holding raw LRC text) or a legacy single `audioURL`. Both
//! shapes normalize into one uniform playlist here so the player never
//! branches on the legacy case.

use crate::lyrics::{self, LyricLine};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("encore/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no content version matches slug {0:?}")]
    NotFound(String),
    #[error("document contains no content versions")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundVariant {
    Dark,
    Light,
    Neon,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub accent_color: Option<String>,
    pub background_variant: Option<BackgroundVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackSource {
    pub title: String,
    #[serde(rename = "audioURL")]
    pub audio_url: String,
    pub lrc: Option<String>,
}

/// One published unit of themed content, as delivered by the CMS.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published_at: Option<String>,
    pub theme: Option<Theme>,
    #[serde(default)]
    pub covers: Vec<String>,
    /// Rich-text lyrics document; opaque to the player.
    pub lyrics: Option<serde_json::Value>,
    #[serde(rename = "epubURL")]
    pub epub_url: Option<String>,
    #[serde(rename = "audioURL")]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackSource>,
}

/// One playable audio item with its parsed lyrics.
#[derive(Debug, Clone)]
pub struct Track {
    pub title: String,
    pub audio_url: String,
    pub lyrics: Arc<Vec<LyricLine>>,
}

impl ContentVersion {
    /// Normalize into a uniform playlist: an explicit track list wins, a
    /// legacy `audioURL` becomes a single lyric-less track, otherwise the
    /// version has no playable audio.
    pub fn playlist(&self) -> Vec<Track> {
        if !self.tracks.is_empty() {
            return self
                .tracks
                .iter()
                .map(|source| Track {
                    title: source.title.clone(),
                    audio_url: source.audio_url.clone(),
                    lyrics: Arc::new(
                        source.lrc.as_deref().map(lyrics::parse_lrc).unwrap_or_default(),
                    ),
                })
                .collect();
        }
        if let Some(url) = &self.audio_url {
            return vec![Track {
                title: self.title.clone(),
                audio_url: url.clone(),
                lyrics: Arc::new(Vec::new()),
            }];
        }
        Vec::new()
    }
}

/// Load a content version from a local JSON file or an HTTP(S) URL.
///
/// The document may be a single version object or an array of versions; for
/// an array, `slug` selects an entry (defaulting to the first one).
pub async fn load_version(
    source: &str,
    slug: Option<&str>,
) -> Result<ContentVersion, ContentError> {
    let document: serde_json::Value =
        if source.starts_with("http://") || source.starts_with("https://") {
            HTTP_CLIENT
                .get(source)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?
        } else {
            serde_json::from_str(&std::fs::read_to_string(source)?)?
        };
    select_version(document, slug)
}

fn select_version(
    document: serde_json::Value,
    slug: Option<&str>,
) -> Result<ContentVersion, ContentError> {
    match document {
        serde_json::Value::Array(items) => {
            let versions = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<ContentVersion>, _>>()?;
            match slug {
                Some(wanted) => versions
                    .into_iter()
                    .find(|v| v.slug == wanted)
                    .ok_or_else(|| ContentError::NotFound(wanted.to_string())),
                None => versions.into_iter().next().ok_or(ContentError::Empty),
            }
        }
        other => Ok(serde_json::from_value(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_json() -> serde_json::Value {
        serde_json::json!({
            "id": "v1",
            "title": "First Stage",
            "slug": "first-stage",
            "publishedAt": "2024-03-01T00:00:00Z",
            "theme": { "accentColor": "#FF0055", "backgroundVariant": "neon" },
            "covers": ["a.jpg", "b.jpg", "c.jpg", "d.jpg"],
            "epubURL": "https://cdn.example/first.epub",
            "tracks": [
                { "title": "Opening", "audioURL": "https://cdn.example/1.mp3",
                  "lrc": "[00:01.00]hello\n[00:02.00]world" },
                { "title": "Encore", "audioURL": "https://cdn.example/2.mp3" }
            ]
        })
    }

    #[test]
    fn deserializes_the_wire_shape() {
        let version: ContentVersion = serde_json::from_value(version_json()).unwrap();
        assert_eq!(version.slug, "first-stage");
        assert_eq!(version.covers.len(), 4);
        let theme = version.theme.unwrap();
        assert_eq!(theme.accent_color.as_deref(), Some("#FF0055"));
        assert_eq!(theme.background_variant, Some(BackgroundVariant::Neon));
        assert_eq!(version.epub_url.as_deref(), Some("https://cdn.example/first.epub"));
    }

    #[test]
    fn explicit_tracks_win_and_lrc_is_parsed() {
        let version: ContentVersion = serde_json::from_value(version_json()).unwrap();
        let playlist = version.playlist();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist[0].lyrics.len(), 2);
        assert_eq!(playlist[0].lyrics[0].text, "hello");
        assert!(playlist[1].lyrics.is_empty());
    }

    #[test]
    fn legacy_audio_url_becomes_single_track() {
        let version: ContentVersion = serde_json::from_value(serde_json::json!({
            "id": "v2", "title": "Legacy", "slug": "legacy",
            "audioURL": "https://cdn.example/legacy.mp3"
        }))
        .unwrap();
        let playlist = version.playlist();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist[0].title, "Legacy");
        assert!(playlist[0].lyrics.is_empty());
    }

    #[test]
    fn no_audio_means_empty_playlist() {
        let version: ContentVersion = serde_json::from_value(serde_json::json!({
            "id": "v3", "title": "Silent", "slug": "silent"
        }))
        .unwrap();
        assert!(version.playlist().is_empty());
    }

    #[test]
    fn selects_from_array_by_slug() {
        let doc = serde_json::json!([
            { "id": "v1", "title": "A", "slug": "a" },
            { "id": "v2", "title": "B", "slug": "b" }
        ]);
        let picked = select_version(doc.clone(), Some("b")).unwrap();
        assert_eq!(picked.id, "v2");
        let first = select_version(doc.clone(), None).unwrap();
        assert_eq!(first.id, "v1");
        assert!(matches!(
            select_version(doc, Some("missing")),
            Err(ContentError::NotFound(_))
        ));
    }
}
