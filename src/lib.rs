//! HLS transcript harvester
//!
//! Rebuilds one WebVTT transcript per episode from the subtitle playlists
//! recorded in a browser HAR capture, and turns each transcript into
//! speaker-attributed utterance records.

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

pub mod capture;
pub mod config;
pub mod config_file;
pub mod episode;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod playlist;
pub mod subtitle;
pub mod utterance;


pub use config::HarvestConfig;
pub use episode::EpisodeId;
pub use error::{HarvestError, Result};
pub use fetch::{HttpClient, TextFetcher};
pub use pipeline::{DumpSummary, Harvester, StructureSummary};
