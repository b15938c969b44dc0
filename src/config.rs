//! Harvest configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when fragments could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Write the transcript with the missing fragments left out
    Allow,
    /// Skip the episode
    Reject,
}

/// What to do when a cue starts before the one preceding it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueOrderPolicy {
    /// Keep document order and log a warning
    Tolerate,
    /// Refuse to write utterances for the episode
    Reject,
}

/// Fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum concurrent fragment downloads per episode
    pub max_workers: usize,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds. None keeps the transport default.
    pub timeout_secs: Option<u64>,

    /// Language hint used to prefer matching playlists
    pub language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_workers: 16,
            user_agent: "Mozilla/5.0 (subs-dl)".to_string(),
            timeout_secs: None,
            language: "en".to_string(),
        }
    }
}

/// Structuring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Drop caption-note-only cues like "(cheering)"
    pub strip_notes: bool,

    /// Optional speaker map (TOML)
    pub speaker_map: Option<PathBuf>,

    /// Out-of-order cue handling
    pub cue_order: CueOrderPolicy,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            strip_notes: false,
            speaker_map: None,
            cue_order: CueOrderPolicy::Tolerate,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Root directory for all per-season output
    pub output_root: PathBuf,

    /// Season number. None means infer it from the capture file name.
    pub season: Option<u32>,

    /// Also write a plain-text rendering of each transcript
    pub emit_text: bool,

    /// Missing fragment handling
    pub gaps: GapPolicy,

    /// Fetch configuration
    pub fetch: FetchConfig,

    /// Structuring configuration
    pub structure: StructureConfig,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log format (pretty, json)
    pub log_format: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("data/processed"),
            season: None,
            emit_text: false,
            gaps: GapPolicy::Allow,
            fetch: FetchConfig::default(),
            structure: StructureConfig::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl HarvestConfig {
    /// Check the values that would otherwise fail late
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch.max_workers == 0 {
            return Err("max_workers must be at least 1".to_string());
        }
        if let Some(0) = self.season {
            return Err("season numbers start at 1".to_string());
        }
        match self.log_format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}
