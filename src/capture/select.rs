//! Candidate selection
//!
//! A capture usually holds several playlists per episode (languages, SDH and
//! plain variants, replays). This picks one per episode and numbers the
//! episodes in capture order.

use std::collections::BTreeMap;

use super::har::CaptureEntry;

/// The playlist chosen for one episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenEpisode {
    /// Episode number within the season, from 1
    pub episode: u32,
    pub entry: CaptureEntry,
}

/// Preference order inside one episode group: language hits first, then SDH,
/// then the earliest request. The URL makes the order total.
fn preference(entry: &CaptureEntry) -> (bool, bool, chrono::DateTime<chrono::Utc>, &str) {
    (
        !entry.language_match,
        !entry.is_sdh,
        entry.requested_at,
        entry.url.as_str(),
    )
}

/// Group candidates by episode, pick the preferred one per group, and number
/// the picks by request time.
///
/// Assumes one season per capture, watched in order.
pub fn select_episodes(candidates: Vec<CaptureEntry>) -> Vec<ChosenEpisode> {
    let mut groups: BTreeMap<String, Vec<CaptureEntry>> = BTreeMap::new();
    for entry in candidates {
        groups.entry(entry.episode_key.clone()).or_default().push(entry);
    }

    let mut chosen: Vec<CaptureEntry> = groups
        .into_values()
        .filter_map(|group| {
            group
                .into_iter()
                .min_by(|a, b| preference(a).cmp(&preference(b)))
        })
        .collect();

    chosen.sort_by(|a, b| {
        a.requested_at
            .cmp(&b.requested_at)
            .then_with(|| a.episode_key.cmp(&b.episode_key))
    });

    chosen
        .into_iter()
        .zip(1..)
        .map(|(entry, episode)| ChosenEpisode { episode, entry })
        .collect()
}
