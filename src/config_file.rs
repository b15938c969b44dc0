//! Configuration file support
//!
//! Loads harvest configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{CueOrderPolicy, FetchConfig, GapPolicy, HarvestConfig, StructureConfig};
use crate::error::Result;

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Fetch settings
    pub fetch: Option<FetchSettings>,
    /// Output settings
    pub output: Option<OutputSettings>,
    /// Structuring settings
    pub structure: Option<StructureSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Maximum concurrent fragment downloads
    pub max_workers: Option<usize>,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Language hint
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output root directory
    pub root: Option<PathBuf>,
    /// Fixed season number
    pub season: Option<u32>,
    /// Also write plain text
    pub emit_text: Option<bool>,
    /// "allow" or "reject" missing fragments
    pub gaps: Option<GapPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSettings {
    /// Drop caption-note-only cues
    pub strip_notes: Option<bool>,
    /// Speaker map path
    pub speaker_map: Option<PathBuf>,
    /// "tolerate" or "reject" out-of-order cues
    pub cue_order: Option<CueOrderPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::HarvestError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = HarvestConfig::default();
        Self {
            fetch: Some(FetchSettings {
                max_workers: Some(defaults.fetch.max_workers),
                user_agent: Some(defaults.fetch.user_agent),
                timeout_secs: None,
                language: Some(defaults.fetch.language),
            }),
            output: Some(OutputSettings {
                root: Some(defaults.output_root),
                season: None,
                emit_text: Some(false),
                gaps: Some(GapPolicy::Allow),
            }),
            structure: Some(StructureSettings {
                strip_notes: Some(false),
                speaker_map: None,
                cue_order: Some(CueOrderPolicy::Tolerate),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to HarvestConfig, filling unset values with defaults
    pub fn into_harvest_config(self) -> HarvestConfig {
        let defaults = HarvestConfig::default();

        let fetch = match self.fetch {
            Some(f) => FetchConfig {
                max_workers: f.max_workers.unwrap_or(defaults.fetch.max_workers),
                user_agent: f.user_agent.unwrap_or(defaults.fetch.user_agent),
                timeout_secs: f.timeout_secs,
                language: f.language.unwrap_or(defaults.fetch.language),
            },
            None => defaults.fetch,
        };

        let structure = match self.structure {
            Some(s) => StructureConfig {
                strip_notes: s.strip_notes.unwrap_or(false),
                speaker_map: s.speaker_map,
                cue_order: s.cue_order.unwrap_or(CueOrderPolicy::Tolerate),
            },
            None => defaults.structure,
        };

        let (output_root, season, emit_text, gaps) = match self.output {
            Some(o) => (
                o.root.unwrap_or(defaults.output_root),
                o.season,
                o.emit_text.unwrap_or(false),
                o.gaps.unwrap_or(GapPolicy::Allow),
            ),
            None => (
                defaults.output_root,
                defaults.season,
                defaults.emit_text,
                defaults.gaps,
            ),
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (
                l.level,
                l.format.unwrap_or_else(|| "pretty".to_string()),
            ),
            None => (defaults.log_level, defaults.log_format),
        };

        HarvestConfig {
            output_root,
            season,
            emit_text,
            gaps,
            fetch,
            structure,
            log_level,
            log_format,
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
