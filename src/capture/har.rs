//! HAR capture log loader
//!
//! A browser network capture (HAR) records every request made while the
//! episodes played. Subtitle tracks show up as `.m3u8` requests; each one is
//! fetched again to confirm it lists `.vtt` fragments, then tagged with what
//! can be read off its URL.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::error::{HarvestError, Result};
use crate::fetch::TextFetcher;
use crate::playlist::fragment_refs;

/// Top level of a HAR file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Har {
    #[serde(default)]
    pub log: HarLog,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarLog {
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    #[serde(default)]
    pub started_date_time: Option<String>,
    #[serde(default)]
    pub request: HarRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarRequest {
    #[serde(default)]
    pub url: String,
}

impl Har {
    /// Read a HAR file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| HarvestError::InvalidCapture(e.to_string()))
    }

    /// Requests for playlist resources, in capture order.
    pub fn playlist_requests(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.log
            .entries
            .iter()
            .filter(|e| e.request.url.to_ascii_lowercase().ends_with(".m3u8"))
            .map(|e| (e.request.url.as_str(), e.requested_at()))
    }
}

impl HarEntry {
    /// Request start time. Entries without a usable timestamp get the
    /// current time.
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.started_date_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| {
                tracing::debug!("no usable startedDateTime for {}", self.request.url);
                Utc::now()
            })
    }
}

/// A subtitle playlist seen in the capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEntry {
    /// Playlist URL
    pub url: String,
    /// When the browser requested it
    pub requested_at: DateTime<Utc>,
    /// Episode identity; playlists with the same key are the same episode
    pub episode_key: String,
    /// Playback session id, `nopsid` if absent
    pub session_id: String,
    /// Subtitles for the deaf and hard-of-hearing
    pub is_sdh: bool,
    /// URL carries the language hint
    pub language_match: bool,
}

impl CaptureEntry {
    /// Tag a playlist URL with the identities read off it.
    pub fn new(url: &str, requested_at: DateTime<Utc>, language: &str) -> Self {
        Self {
            url: url.to_string(),
            requested_at,
            episode_key: episode_key(url),
            session_id: session_id(url),
            is_sdh: is_sdh(url),
            language_match: language_match(url, language),
        }
    }
}

/// Episode key: the asset uuid in `/ps01/<x>/<uuid>/r/`, or else the URL
/// without its last three path components.
pub fn episode_key(url: &str) -> String {
    if let Some(caps) = regex!(r"/ps01/[^/]+/([0-9a-f-]{36})/r/").captures(url) {
        return caps[1].to_string();
    }
    let prefix = url.rsplitn(4, '/').last().unwrap_or(url);
    format!("nouuid:{}", prefix)
}

/// Playback session id from `~psid=<uuid>`.
pub fn session_id(url: &str) -> String {
    regex!(r"~psid=([0-9a-f-]{36})")
        .captures(url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "nopsid".to_string())
}

pub fn is_sdh(url: &str) -> bool {
    url.to_ascii_lowercase().contains("sdh")
}

/// Whether the URL names the language, as in `subs_en_sdh` or `/en_forced`.
pub fn language_match(url: &str, language: &str) -> bool {
    let language = language.trim().to_ascii_lowercase();
    if language.is_empty() {
        return false;
    }
    let url = url.to_ascii_lowercase();
    url.contains(&format!("_{}_", language)) || url.contains(&format!("/{}_", language))
}

/// Finds the subtitle playlists in a capture
pub struct CaptureLoader<'a, F> {
    fetcher: &'a F,
    language: String,
}

impl<'a, F: TextFetcher> CaptureLoader<'a, F> {
    pub fn new(fetcher: &'a F, language: &str) -> Self {
        Self {
            fetcher,
            language: language.to_string(),
        }
    }

    /// Fetch each playlist request in the capture, one at a time, and keep
    /// those that list subtitle fragments.
    ///
    /// Playlists that fail to download are logged and dropped. Finding no
    /// subtitle playlist at all is an error.
    pub async fn discover(&self, har: &Har) -> Result<Vec<CaptureEntry>> {
        let mut candidates = Vec::new();

        for (url, requested_at) in har.playlist_requests() {
            let body = match self.fetcher.fetch_text(url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("playlist fetch failed for {}: {}", url, e);
                    continue;
                }
            };
            if fragment_refs(&body).is_empty() {
                tracing::debug!("not a subtitle playlist: {}", url);
                continue;
            }
            let entry = CaptureEntry::new(url, requested_at, &self.language);
            tracing::debug!(
                "candidate {} key={} sdh={} lang={}",
                entry.url,
                entry.episode_key,
                entry.is_sdh,
                entry.language_match
            );
            candidates.push(entry);
        }

        if candidates.is_empty() {
            return Err(HarvestError::NoCandidates);
        }
        Ok(candidates)
    }
}
