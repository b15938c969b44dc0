//! Speaker map
//!
//! Maps speaker tags and their aliases to a canonical name and a role.
//!
//! ```toml
//! [[speaker]]
//! canonical = "JANICE"
//! role = "host"
//! aliases = ["JAN", "JANICE M."]
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
struct SpeakerMapFile {
    #[serde(default)]
    speaker: Vec<SpeakerEntry>,
}

#[derive(Debug, Deserialize)]
struct SpeakerEntry {
    canonical: String,
    /// Tag this row is for, if different from the canonical name
    speaker: Option<String>,
    #[serde(default)]
    role: String,
    #[serde(default)]
    aliases: Vec<String>,
}

/// A resolved speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerIdentity {
    pub canonical: String,
    /// Empty if the map has no role for this speaker
    pub role: String,
}

/// Case-insensitive lookup of speaker tags
#[derive(Debug, Clone, Default)]
pub struct SpeakerMap {
    alias_to_canonical: HashMap<String, String>,
    canonical_role: HashMap<String, String>,
}

impl SpeakerMap {
    /// Load a speaker map from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse a speaker map from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: SpeakerMapFile = toml::from_str(content)?;
        let mut map = SpeakerMap::default();

        for entry in file.speaker {
            let canonical = entry.canonical.trim().to_uppercase();
            if canonical.is_empty() {
                continue;
            }
            let speaker = entry
                .speaker
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| canonical.clone());
            map.alias_to_canonical.insert(speaker, canonical.clone());
            map.alias_to_canonical
                .entry(canonical.clone())
                .or_insert_with(|| canonical.clone());

            for alias in &entry.aliases {
                let alias = alias.trim().to_uppercase();
                if !alias.is_empty() {
                    map.alias_to_canonical.insert(alias, canonical.clone());
                }
            }

            // First role seen for a canonical speaker sticks.
            let role = entry.role.trim();
            if !role.is_empty() {
                map.canonical_role
                    .entry(canonical)
                    .or_insert_with(|| role.to_string());
            }
        }

        tracing::debug!(
            "speaker map: {} names, {} roles",
            map.alias_to_canonical.len(),
            map.canonical_role.len()
        );
        Ok(map)
    }

    /// Resolve a speaker tag. Unknown speakers resolve to their own
    /// upper-cased form with no role. Returns None for an empty tag.
    pub fn resolve(&self, speaker: &str) -> Option<SpeakerIdentity> {
        let key = speaker.trim().to_uppercase();
        if key.is_empty() {
            return None;
        }
        let canonical = self
            .alias_to_canonical
            .get(&key)
            .cloned()
            .unwrap_or(key);
        let role = self
            .canonical_role
            .get(&canonical)
            .cloned()
            .unwrap_or_default();
        Some(SpeakerIdentity { canonical, role })
    }

    pub fn len(&self) -> usize {
        self.alias_to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alias_to_canonical.is_empty()
    }
}
