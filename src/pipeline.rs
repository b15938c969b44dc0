//! End-to-end runs
//!
//! `dump`: capture log -> chosen playlists -> merged transcripts ->
//! utterances, one episode at a time. `structure`: transcripts already on
//! disk -> utterances.

use std::path::{Path, PathBuf};

use crate::capture::{select_episodes, CaptureLoader, ChosenEpisode, Har};
use crate::config::{GapPolicy, HarvestConfig};
use crate::episode::EpisodeId;
use crate::error::{HarvestError, Result};
use crate::fetch::{SegmentFetcher, TextFetcher};
use crate::output::{discover_transcripts, IndexRow, SeasonWriter};
use crate::subtitle::{merge_fragments, parse_cues, to_plain_text};
use crate::utterance::{check_cue_order, SpeakerMap, Utterance, UtteranceExtractor};

/// What a dump run produced
#[derive(Debug, Clone, Default)]
pub struct DumpSummary {
    /// Index rows of the episodes written
    pub episodes: Vec<IndexRow>,
    /// Episode numbers that were skipped
    pub skipped: Vec<u32>,
    pub index_path: Option<PathBuf>,
}

/// What a structure run produced
#[derive(Debug, Clone, Default)]
pub struct StructureSummary {
    pub files: Vec<PathBuf>,
    pub utterances: usize,
}

/// Runs the pipeline with an explicit fetcher and configuration
pub struct Harvester<'a, F> {
    fetcher: &'a F,
    config: &'a HarvestConfig,
    speakers: Option<SpeakerMap>,
}

impl<'a> Harvester<'a, ()> {
    /// A harvester for `structure` runs, which never fetch anything.
    pub fn offline(config: &'a HarvestConfig) -> Self {
        Self::new(&(), config)
    }
}

impl<'a, F> Harvester<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a HarvestConfig) -> Self {
        Self {
            fetcher,
            config,
            speakers: None,
        }
    }

    pub fn with_speaker_map(mut self, speakers: SpeakerMap) -> Self {
        self.speakers = Some(speakers);
        self
    }

    fn extractor(&self, id: EpisodeId) -> UtteranceExtractor<'_> {
        let extractor =
            UtteranceExtractor::new(id).strip_notes(self.config.structure.strip_notes);
        match &self.speakers {
            Some(map) => extractor.with_speaker_map(map),
            None => extractor,
        }
    }

    /// Parse a transcript into utterances, applying the cue order policy.
    pub fn structure_document(&self, id: EpisodeId, document: &str) -> Result<Vec<Utterance>> {
        let cues = parse_cues(document);
        let out_of_order = check_cue_order(id, &cues, self.config.structure.cue_order)?;
        if out_of_order > 0 {
            tracing::warn!("[{}] {} cue(s) start before the previous cue", id, out_of_order);
        }
        Ok(self.extractor(id).extract_all(&cues))
    }

    /// Structure transcripts already under the output root.
    ///
    /// With an empty `seasons` list every season directory is processed.
    pub fn structure(&self, seasons: &[u32]) -> Result<StructureSummary> {
        let root = &self.config.output_root;
        let files = discover_transcripts(root, seasons)?;
        if files.is_empty() {
            return Err(HarvestError::NoTranscripts(root.display().to_string()));
        }

        let mut summary = StructureSummary::default();
        for file in files {
            let Some(id) = EpisodeId::from_path(&file) else {
                tracing::warn!("Skipping unrecognized filename: {}", file.display());
                continue;
            };
            let document = std::fs::read_to_string(&file)?;
            let utterances = match self.structure_document(id, &document) {
                Ok(u) => u,
                Err(HarvestError::Io(e)) => return Err(HarvestError::Io(e)),
                Err(e) => {
                    tracing::warn!("[{}] skipped: {}", id, e);
                    continue;
                }
            };
            let writer = SeasonWriter::new(root, id.season);
            let path = writer.write_utterances(id, &utterances)?;
            tracing::info!(
                "[{}] structured {} -> {} ({} utterances)",
                id.season_dir(),
                file.display(),
                path.display(),
                utterances.len()
            );
            summary.utterances += utterances.len();
            summary.files.push(path);
        }
        Ok(summary)
    }
}

impl<'a, F: TextFetcher> Harvester<'a, F> {
    /// Rebuild every chosen episode of a capture into `season`.
    ///
    /// Only "no playlists in the capture" and output I/O errors end the run.
    /// Episodes whose playlist fails, or that break the gap or cue order
    /// policy, are logged and skipped.
    pub async fn dump(&self, har: &Har, season: u32) -> Result<DumpSummary> {
        let candidates = CaptureLoader::new(self.fetcher, &self.config.fetch.language)
            .discover(har)
            .await?;
        let chosen = select_episodes(candidates);
        tracing::info!(
            "Found {} episode playlists (ordered by capture time).",
            chosen.len()
        );

        let writer = SeasonWriter::new(&self.config.output_root, season);
        let mut summary = DumpSummary::default();

        for pick in &chosen {
            let id = EpisodeId::new(season, pick.episode);
            match self.dump_episode(&writer, id, pick).await {
                Ok(row) => summary.episodes.push(row),
                Err(HarvestError::Io(e)) => return Err(HarvestError::Io(e)),
                Err(e) => {
                    tracing::warn!("[{}] skipped: {}", id, e);
                    summary.skipped.push(pick.episode);
                }
            }
        }

        let index_path = writer.write_index(&summary.episodes)?;
        tracing::info!("Wrote {}", index_path.display());
        summary.index_path = Some(index_path);
        Ok(summary)
    }

    async fn dump_episode(
        &self,
        writer: &SeasonWriter,
        id: EpisodeId,
        pick: &ChosenEpisode,
    ) -> Result<IndexRow> {
        let entry = &pick.entry;
        let fragments = SegmentFetcher::new(self.fetcher, self.config.fetch.max_workers)
            .fetch_playlist(&entry.url)
            .await?;

        let merged = merge_fragments(&fragments);
        if !merged.is_complete() {
            if self.config.gaps == GapPolicy::Reject {
                return Err(HarvestError::IncompleteTranscript {
                    episode_id: id.to_string(),
                    missing: merged.missing,
                });
            }
            tracing::warn!(
                "[{}] {} of {} fragments missing",
                id,
                merged.missing.len(),
                fragments.len()
            );
        }

        let document = merged.to_document();
        let utterances = self.structure_document(id, &document)?;

        let vtt_path = writer.write_transcript(id, &document)?;
        tracing::info!(
            "[{}] wrote {} ({} chars)   ({})",
            id,
            vtt_path.display(),
            document.len(),
            if entry.is_sdh { "SDH" } else { "STD" }
        );

        let txt_path = if self.config.emit_text {
            let text = to_plain_text(&document);
            let path = writer.write_text(id, &text)?;
            tracing::info!("          wrote {} ({} chars)", path.display(), text.len());
            Some(path)
        } else {
            None
        };

        let structured_path = writer.write_utterances(id, &utterances)?;
        tracing::info!(
            "          wrote {} ({} utterances)",
            structured_path.display(),
            utterances.len()
        );

        Ok(IndexRow {
            season: id.season,
            episode: id.episode,
            file_vtt: path_string(&vtt_path),
            file_txt: txt_path.as_deref().map(path_string).unwrap_or_default(),
            file_structured: path_string(&structured_path),
            m3u8: entry.url.clone(),
            uuid: entry.episode_key.clone(),
            psid: entry.session_id.clone(),
            requested_at_utc: entry.requested_at.to_rfc3339(),
            is_sdh: entry.is_sdh,
        })
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
