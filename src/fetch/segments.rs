//! Fragment downloader
//!
//! Downloads all fragments of one subtitle playlist with a bounded number of
//! requests in flight. Each result lands in the slot of its fragment's
//! position in the playlist, so completion order never affects the output.

use futures_util::stream::{self, StreamExt};

use crate::error::Result;
use crate::fetch::client::TextFetcher;
use crate::playlist::{fragment_refs, resolve_fragment_url};

/// Outcome of downloading a single fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// Body text of the fragment
    Fetched(String),
    /// Why the fragment could not be downloaded
    Failed(String),
}

/// One fragment of a subtitle track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Position in the playlist, starting at 0
    pub index: usize,
    /// Absolute URL of the fragment
    pub url: String,
    /// Download result
    pub outcome: FragmentOutcome,
}

impl Fragment {
    /// Text of the fragment, if it was downloaded.
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            FragmentOutcome::Fetched(text) => Some(text),
            FragmentOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FragmentOutcome::Failed(_))
    }
}

/// Downloads the fragments behind a subtitle playlist
pub struct SegmentFetcher<'a, F> {
    fetcher: &'a F,
    max_workers: usize,
}

impl<'a, F: TextFetcher> SegmentFetcher<'a, F> {
    /// Create a fetcher allowing at most `max_workers` requests in flight.
    pub fn new(fetcher: &'a F, max_workers: usize) -> Self {
        Self {
            fetcher,
            max_workers: max_workers.max(1),
        }
    }

    /// Fetch a playlist and all fragments it references.
    ///
    /// Fails only if the playlist itself cannot be fetched. A fragment whose
    /// reference cannot be resolved or whose download fails is recorded as
    /// failed in its own slot.
    pub async fn fetch_playlist(&self, playlist_url: &str) -> Result<Vec<Fragment>> {
        let body = self.fetcher.fetch_text(playlist_url).await?;
        let targets: Vec<(String, Result<String>)> = fragment_refs(&body)
            .into_iter()
            .map(|r| {
                let resolved = resolve_fragment_url(playlist_url, &r);
                (r, resolved)
            })
            .collect();
        tracing::debug!("{}: {} fragments", playlist_url, targets.len());
        Ok(self.fetch_targets(targets).await)
    }

    /// Fetch the given fragment URLs. The result has one entry per URL, in
    /// input order.
    pub async fn fetch_fragments(&self, urls: Vec<String>) -> Vec<Fragment> {
        let targets = urls.into_iter().map(|u| (u.clone(), Ok(u))).collect();
        self.fetch_targets(targets).await
    }

    // (reference, resolved url) per slot.
    async fn fetch_targets(&self, targets: Vec<(String, Result<String>)>) -> Vec<Fragment> {
        let mut slots: Vec<Option<Fragment>> = vec![None; targets.len()];

        let mut results = stream::iter(targets.into_iter().enumerate())
            .map(|(index, (reference, resolved))| async move {
                let fetched = match resolved {
                    Ok(url) => {
                        let result = self.fetcher.fetch_text(&url).await;
                        (url, result)
                    }
                    Err(e) => (reference, Err(e)),
                };
                let (url, outcome) = match fetched {
                    (url, Ok(text)) => (url, FragmentOutcome::Fetched(text)),
                    (url, Err(e)) => {
                        tracing::warn!("  seg {:05} failed: {}", index, e);
                        (url, FragmentOutcome::Failed(e.to_string()))
                    }
                };
                Fragment {
                    index,
                    url,
                    outcome,
                }
            })
            .buffer_unordered(self.max_workers);

        while let Some(fragment) = results.next().await {
            let index = fragment.index;
            slots[index] = Some(fragment);
        }

        slots.into_iter().flatten().collect()
    }
}
