//! Subtitle playlist parser
//!
//! Pulls the WebVTT fragment references out of a media playlist body.

use url::Url;

use crate::error::Result;

/// Get the fragment references of a subtitle playlist, in playlist order.
///
/// Directive and comment lines (`#...`) are skipped, as is anything whose
/// path does not end in `.vtt`.
pub fn fragment_refs(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| is_vtt_ref(line))
        .map(str::to_string)
        .collect()
}

/// Resolve a fragment reference relative to the playlist's own location.
pub fn resolve_fragment_url(playlist_url: &str, reference: &str) -> Result<String> {
    let base = Url::parse(playlist_url)?;
    Ok(base.join(reference)?.to_string())
}

// Query strings and fragments don't count towards the extension.
fn is_vtt_ref(line: &str) -> bool {
    let path = line.split(['?', '#']).next().unwrap_or(line);
    path.to_ascii_lowercase().ends_with(".vtt")
}
