//! Per-season output tree
//!
//! ```text
//! <root>/s01/vtt/S01E01.vtt              merged transcript
//! <root>/s01/txt/S01E01.txt              plain text (optional)
//! <root>/s01/structured/S01E01.jsonl     one utterance per line
//! <root>/s01/s01_index.jsonl             one row per episode
//! ```

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::episode::{season_dir, EpisodeId};
use crate::error::Result;
use crate::utterance::Utterance;

/// One row of the season index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    pub season: u32,
    pub episode: u32,
    pub file_vtt: String,
    /// Empty when plain text was not requested
    pub file_txt: String,
    pub file_structured: String,
    /// Source playlist URL
    pub m3u8: String,
    /// Episode key
    pub uuid: String,
    /// Session id
    pub psid: String,
    pub requested_at_utc: String,
    pub is_sdh: bool,
}

/// Writes the files of one season
#[derive(Debug, Clone)]
pub struct SeasonWriter {
    root: PathBuf,
    season: u32,
}

impl SeasonWriter {
    pub fn new<P: Into<PathBuf>>(root: P, season: u32) -> Self {
        Self {
            root: root.into(),
            season,
        }
    }

    pub fn season_dir(&self) -> PathBuf {
        self.root.join(season_dir(self.season))
    }

    pub fn vtt_path(&self, id: EpisodeId) -> PathBuf {
        self.season_dir().join("vtt").join(format!("{}.vtt", id))
    }

    pub fn txt_path(&self, id: EpisodeId) -> PathBuf {
        self.season_dir().join("txt").join(format!("{}.txt", id))
    }

    pub fn structured_path(&self, id: EpisodeId) -> PathBuf {
        self.season_dir()
            .join("structured")
            .join(format!("{}.jsonl", id))
    }

    pub fn index_path(&self) -> PathBuf {
        self.season_dir()
            .join(format!("{}_index.jsonl", season_dir(self.season)))
    }

    /// Write the merged transcript.
    pub fn write_transcript(&self, id: EpisodeId, document: &str) -> Result<PathBuf> {
        let path = self.vtt_path(id);
        write_file(&path, document)?;
        Ok(path)
    }

    /// Write the plain-text rendering.
    pub fn write_text(&self, id: EpisodeId, text: &str) -> Result<PathBuf> {
        let path = self.txt_path(id);
        write_file(&path, text)?;
        Ok(path)
    }

    /// Write utterances as JSON Lines.
    pub fn write_utterances(&self, id: EpisodeId, utterances: &[Utterance]) -> Result<PathBuf> {
        let path = self.structured_path(id);
        write_json_lines(&path, utterances)?;
        Ok(path)
    }

    /// Write the season index as JSON Lines.
    pub fn write_index(&self, rows: &[IndexRow]) -> Result<PathBuf> {
        let path = self.index_path();
        write_json_lines(&path, rows)?;
        Ok(path)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content)?;
    Ok(())
}

fn write_json_lines<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Find merged transcripts under `<root>/sNN/vtt/`, sorted by path.
///
/// With an empty `seasons` list every `sNN` directory is searched.
pub fn discover_transcripts(root: &Path, seasons: &[u32]) -> Result<Vec<PathBuf>> {
    let season_dirs: Vec<PathBuf> = if seasons.is_empty() {
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name();
            let is_season = name
                .to_str()
                .is_some_and(|n| regex!(r"^s\d{2}$").is_match(n));
            if is_season && entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        dirs
    } else {
        seasons.iter().map(|s| root.join(season_dir(*s))).collect()
    };

    let mut files = Vec::new();
    for dir in season_dirs {
        let vtt_dir = dir.join("vtt");
        if !vtt_dir.is_dir() {
            continue;
        }
        let mut found: Vec<PathBuf> = fs::read_dir(&vtt_dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("vtt"))
            })
            .collect();
        found.sort();
        files.extend(found);
    }
    Ok(files)
}
