//! Utterance extraction
//!
//! Turns parsed cues into speaker-attributed utterance records.

use serde::{Deserialize, Serialize};

use super::normalize::{is_caption_note, normalize_text};
use super::speaker::{extract_speaker, SpeakerParse};
use super::speaker_map::SpeakerMap;
use crate::config::CueOrderPolicy;
use crate::episode::EpisodeId;
use crate::error::{HarvestError, Result};
use crate::subtitle::Cue;

/// One line of dialogue (or caption note) from an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub season: u32,
    pub episode: u32,
    /// `S01E02`
    pub episode_id: String,
    /// Start time in seconds, millisecond precision
    pub start: f64,
    /// End time in seconds, millisecond precision
    pub end: f64,
    /// Speaker tag as written, empty if none
    pub speaker_raw: String,
    /// Normalized or canonical speaker, empty if none
    pub speaker: String,
    /// Role from the speaker map, empty if unknown
    pub speaker_role: String,
    /// Cleaned dialogue text
    pub text: String,
    pub is_caption_note: bool,
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Builds utterances for one episode
pub struct UtteranceExtractor<'a> {
    episode: EpisodeId,
    speakers: Option<&'a SpeakerMap>,
    strip_notes: bool,
}

impl<'a> UtteranceExtractor<'a> {
    pub fn new(episode: EpisodeId) -> Self {
        Self {
            episode,
            speakers: None,
            strip_notes: false,
        }
    }

    /// Resolve speakers through a speaker map.
    pub fn with_speaker_map(mut self, speakers: &'a SpeakerMap) -> Self {
        self.speakers = Some(speakers);
        self
    }

    /// Drop caption-note-only cues.
    pub fn strip_notes(mut self, strip: bool) -> Self {
        self.strip_notes = strip;
        self
    }

    /// Build the utterance for one cue. Returns None only for a caption note
    /// when notes are stripped.
    pub fn extract(&self, cue: &Cue) -> Option<Utterance> {
        let joined = normalize_text(&cue.lines.join(" "));
        let is_note = is_caption_note(&joined);
        if is_note && self.strip_notes {
            return None;
        }

        let (speaker_raw, speaker, speaker_role, text) = match extract_speaker(&joined) {
            SpeakerParse::Tagged {
                raw,
                normalized,
                text,
            } => {
                let (speaker, role) = match self.speakers.and_then(|m| m.resolve(&normalized)) {
                    Some(id) => (id.canonical, id.role),
                    None => (normalized, String::new()),
                };
                (raw, speaker, role, text)
            }
            SpeakerParse::Untagged { text } => (String::new(), String::new(), String::new(), text),
        };

        Some(Utterance {
            season: self.episode.season,
            episode: self.episode.episode,
            episode_id: self.episode.to_string(),
            start: round_millis(cue.start),
            end: round_millis(cue.end),
            speaker_raw,
            speaker,
            speaker_role,
            text,
            is_caption_note: is_note,
        })
    }

    /// Build utterances for all cues, in cue order.
    pub fn extract_all(&self, cues: &[Cue]) -> Vec<Utterance> {
        cues.iter().filter_map(|cue| self.extract(cue)).collect()
    }
}

/// Check that cue start times never go backwards.
///
/// Returns the number of cues that start before their predecessor. Under
/// `Reject` the first such cue is an error instead.
pub fn check_cue_order(
    episode: EpisodeId,
    cues: &[Cue],
    policy: CueOrderPolicy,
) -> Result<usize> {
    let mut out_of_order = 0;
    for (index, pair) in cues.windows(2).enumerate() {
        if pair[1].start < pair[0].start {
            if policy == CueOrderPolicy::Reject {
                return Err(HarvestError::OutOfOrderCues {
                    episode_id: episode.to_string(),
                    index: index + 1,
                    start: pair[1].start,
                    previous: pair[0].start,
                });
            }
            out_of_order += 1;
        }
    }
    Ok(out_of_order)
}
