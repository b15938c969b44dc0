//! Season/episode identifiers

use std::fmt;
use std::path::Path;

/// Season and episode number of one transcript, displayed as `S01E02`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeId {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeId {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }

    /// Parse a file stem like `S01E02` (case-insensitive).
    pub fn parse(stem: &str) -> Option<Self> {
        let caps = regex!(r"(?i)^S(\d{2})E(\d{2})$").captures(stem)?;
        Some(Self {
            season: caps[1].parse().ok()?,
            episode: caps[2].parse().ok()?,
        })
    }

    /// Parse the stem of a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem().and_then(|s| s.to_str()).and_then(Self::parse)
    }

    /// Directory name of the season, `s01`.
    pub fn season_dir(&self) -> String {
        season_dir(self.season)
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// Directory name of a season, `s01`.
pub fn season_dir(season: u32) -> String {
    format!("s{:02}", season)
}

/// Season number from a capture file name such as `show_s02.har`.
pub fn season_from_capture_path(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let caps = regex!(r"(?i)s(\d{1,2})").captures(name)?;
    caps[1].parse().ok()
}
