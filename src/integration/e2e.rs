//! End-to-end integration tests

use std::fs;
use std::path::Path;

use crate::capture::Har;
use crate::config::{CueOrderPolicy, GapPolicy, HarvestConfig};
use crate::episode::EpisodeId;
use crate::error::HarvestError;
use crate::integration::fixtures::{
    playlist_body, playlist_url, vtt_fragment, HarBuilder, MemoryFetcher, PSID, UUID_A, UUID_B,
};
use crate::integration::validation::validate_transcript;
use crate::output::SeasonWriter;
use crate::pipeline::Harvester;
use crate::utterance::{SpeakerMap, Utterance};

/// Episode A is captured twice: an SDH track without the language hint at
/// 20:00:00, then a plain English track at 20:00:05. Episode B follows.
fn capture() -> Har {
    HarBuilder::new()
        .entry("https://vod.example/ps01/show/player.html", "2024-03-01T19:59:58Z")
        .entry(&playlist_url(UUID_A, "video.m3u8"), "2024-03-01T19:59:59Z")
        .entry(&playlist_url(UUID_A, "subs_sdh.m3u8"), "2024-03-01T20:00:00Z")
        .entry(&playlist_url(UUID_A, "subs_en_cc.m3u8"), "2024-03-01T20:00:05Z")
        .entry(&episode_b_url(), "2024-03-01T20:30:00Z")
        .build()
}

fn episode_b_url() -> String {
    playlist_url(UUID_B, &format!("~psid={}/subs_en_cc.m3u8", PSID))
}

fn fragment_url(uuid: &str, name: &str) -> String {
    playlist_url(uuid, name)
}

/// Fragment bodies keyed by URL. Cues of episode A's English track.
fn episode_a_fragments() -> Vec<(String, String)> {
    vec![
        (
            fragment_url(UUID_A, "en0.vtt"),
            vtt_fragment(&[
                (1.0, 2.5, "JANICE: Hello there."),
                (3.0, 4.0, "[DOOR SLAMS]"),
            ]),
        ),
        (
            fragment_url(UUID_A, "en1.vtt"),
            vtt_fragment(&[
                (61.0, 62.0, "JAN: <i>Who's there?</i>"),
                (63.0, 64.5, "Nobody."),
            ]),
        ),
    ]
}

fn episode_b_fragments() -> Vec<(String, String)> {
    let base = format!("~psid={}/", PSID);
    vec![
        (
            fragment_url(UUID_B, &format!("{}en0.vtt", base)),
            vtt_fragment(&[(0.5, 1.5, "DR. MOSS (V.O.): Hold still.")]),
        ),
        (
            fragment_url(UUID_B, &format!("{}en1.vtt", base)),
            vtt_fragment(&[(60.25, 61.0, "(sighs)")]),
        ),
        (
            fragment_url(UUID_B, &format!("{}en2.vtt", base)),
            vtt_fragment(&[(120.0, 121.0, "- Done.")]),
        ),
    ]
}

/// Fetcher serving the whole capture; `delay` picks a delay per fragment
/// position within its playlist.
fn fetcher_with(delay: impl Fn(usize) -> u64) -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        &playlist_url(UUID_A, "video.m3u8"),
        "#EXTM3U\n#EXTINF:6.0,\nv0.ts\n#EXTINF:6.0,\nv1.ts\n",
    );
    fetcher.insert(
        &playlist_url(UUID_A, "subs_sdh.m3u8"),
        &playlist_body(&["sdh0.vtt"]),
    );
    fetcher.insert(
        &fragment_url(UUID_A, "sdh0.vtt"),
        &vtt_fragment(&[(1.0, 2.5, "SDH TRACK")]),
    );
    fetcher.insert(
        &playlist_url(UUID_A, "subs_en_cc.m3u8"),
        &playlist_body(&["en0.vtt", "en1.vtt"]),
    );
    fetcher.insert(
        &episode_b_url(),
        &playlist_body(&["en0.vtt", "en1.vtt", "en2.vtt"]),
    );
    for fragments in [episode_a_fragments(), episode_b_fragments()] {
        for (i, (url, body)) in fragments.iter().enumerate() {
            fetcher.insert_delayed(url, body, delay(i));
        }
    }
    fetcher
}

fn fetcher() -> MemoryFetcher {
    fetcher_with(|_| 0)
}

fn config(root: &Path) -> HarvestConfig {
    let mut config = HarvestConfig {
        output_root: root.to_path_buf(),
        emit_text: true,
        ..Default::default()
    };
    config.fetch.max_workers = 4;
    config
}

fn read_utterances(path: &Path) -> Vec<Utterance> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn ep(episode: u32) -> EpisodeId {
    EpisodeId::new(1, episode)
}

#[tokio::test]
async fn test_dump_season() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher();
    let config = config(dir.path());

    let summary = Harvester::new(&fetcher, &config)
        .dump(&capture(), 1)
        .await
        .unwrap();
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.episodes.len(), 2);

    let first = &summary.episodes[0];
    assert_eq!(first.episode, 1);
    assert_eq!(first.m3u8, playlist_url(UUID_A, "subs_en_cc.m3u8"));
    assert_eq!(first.uuid, UUID_A);
    assert_eq!(first.psid, "nopsid");
    assert_eq!(first.requested_at_utc, "2024-03-01T20:00:05+00:00");
    assert!(!first.is_sdh);

    let second = &summary.episodes[1];
    assert_eq!(second.episode, 2);
    assert_eq!(second.uuid, UUID_B);
    assert_eq!(second.psid, PSID);

    let writer = SeasonWriter::new(dir.path(), 1);
    let doc = fs::read_to_string(writer.vtt_path(ep(1))).unwrap();
    let result = validate_transcript(&doc);
    assert!(result.is_valid, "{:?}", result.errors);
    assert!(doc.contains("Hello there."));
    assert!(doc.contains("Nobody."));
    assert!(!doc.contains("SDH TRACK"));

    let text = fs::read_to_string(writer.txt_path(ep(1))).unwrap();
    assert!(text.contains("JAN: Who's there?"));
    assert!(!text.contains("-->"));

    let utterances = read_utterances(&writer.structured_path(ep(1)));
    assert_eq!(utterances.len(), 4);
    assert_eq!(utterances[0].speaker, "JANICE");
    assert_eq!(utterances[0].text, "Hello there.");
    assert_eq!(utterances[0].episode_id, "S01E01");
    assert!(utterances[1].is_caption_note);
    assert_eq!(utterances[1].speaker, "");
    assert_eq!(utterances[2].speaker_raw, "JAN");
    assert_eq!(utterances[2].text, "Who's there?");
    assert_eq!(utterances[2].start, 61.0);
    assert_eq!(utterances[3].end, 64.5);

    let utterances = read_utterances(&writer.structured_path(ep(2)));
    assert_eq!(utterances.len(), 3);
    assert_eq!(utterances[0].speaker, "DR. MOSS");
    assert_eq!(utterances[0].text, "Hold still.");
    assert_eq!(utterances[1].start, 60.25);

    let index = fs::read_to_string(writer.index_path()).unwrap();
    assert_eq!(index.lines().count(), 2);
    assert_eq!(summary.index_path, Some(writer.index_path()));

    // Each fragment of the chosen tracks is fetched once; the SDH track never.
    for (url, _) in episode_a_fragments() {
        assert_eq!(fetcher.hits(&url), 1);
    }
    assert_eq!(fetcher.hits(&fragment_url(UUID_A, "sdh0.vtt")), 0);
}

#[tokio::test]
async fn test_output_independent_of_completion_order() {
    let in_order = tempfile::TempDir::new().unwrap();
    let reversed = tempfile::TempDir::new().unwrap();

    let fast_first = fetcher_with(|i| i as u64 * 15);
    let slow_first = fetcher_with(|i| 45 - i as u64 * 15);

    let config_a = config(in_order.path());
    Harvester::new(&fast_first, &config_a)
        .dump(&capture(), 1)
        .await
        .unwrap();
    let config_b = config(reversed.path());
    Harvester::new(&slow_first, &config_b)
        .dump(&capture(), 1)
        .await
        .unwrap();

    let a = SeasonWriter::new(in_order.path(), 1);
    let b = SeasonWriter::new(reversed.path(), 1);
    for id in [ep(1), ep(2)] {
        assert_eq!(
            fs::read(a.vtt_path(id)).unwrap(),
            fs::read(b.vtt_path(id)).unwrap()
        );
        assert_eq!(
            fs::read(a.structured_path(id)).unwrap(),
            fs::read(b.structured_path(id)).unwrap()
        );
    }
}

#[tokio::test]
async fn test_rerun_is_identical() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher();
    let config = config(dir.path());
    let harvester = Harvester::new(&fetcher, &config);
    let writer = SeasonWriter::new(dir.path(), 1);

    harvester.dump(&capture(), 1).await.unwrap();
    let snapshot = |w: &SeasonWriter| {
        let mut files = vec![fs::read(w.index_path()).unwrap()];
        for id in [ep(1), ep(2)] {
            files.push(fs::read(w.vtt_path(id)).unwrap());
            files.push(fs::read(w.txt_path(id)).unwrap());
            files.push(fs::read(w.structured_path(id)).unwrap());
        }
        files
    };
    let first = snapshot(&writer);

    harvester.dump(&capture(), 1).await.unwrap();
    assert_eq!(first, snapshot(&writer));
}

#[tokio::test]
async fn test_speaker_map() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher();
    let config = config(dir.path());
    let map = SpeakerMap::from_toml(
        r#"
[[speaker]]
canonical = "Janice"
role = "host"
aliases = ["JAN"]
"#,
    )
    .unwrap();

    Harvester::new(&fetcher, &config)
        .with_speaker_map(map)
        .dump(&capture(), 1)
        .await
        .unwrap();

    let utterances =
        read_utterances(&SeasonWriter::new(dir.path(), 1).structured_path(ep(1)));
    assert_eq!(utterances[0].speaker, "JANICE");
    assert_eq!(utterances[0].speaker_role, "host");
    assert_eq!(utterances[2].speaker_raw, "JAN");
    assert_eq!(utterances[2].speaker, "JANICE");
    assert_eq!(utterances[2].speaker_role, "host");
}

fn fetcher_missing_fragment() -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        &playlist_url(UUID_A, "subs_en_cc.m3u8"),
        &playlist_body(&["en0.vtt", "en1.vtt"]),
    );
    let (url, body) = &episode_a_fragments()[0];
    fetcher.insert(url, body);
    fetcher
}

fn single_episode_capture() -> Har {
    HarBuilder::new()
        .entry(&playlist_url(UUID_A, "subs_en_cc.m3u8"), "2024-03-01T20:00:05Z")
        .build()
}

#[tokio::test]
async fn test_gaps_allowed() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher_missing_fragment();
    let config = config(dir.path());

    let summary = Harvester::new(&fetcher, &config)
        .dump(&single_episode_capture(), 1)
        .await
        .unwrap();
    assert_eq!(summary.episodes.len(), 1);

    let doc = fs::read_to_string(SeasonWriter::new(dir.path(), 1).vtt_path(ep(1))).unwrap();
    assert!(doc.contains("Hello there."));
    assert!(!doc.contains("Nobody."));
}

#[tokio::test]
async fn test_gaps_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher_missing_fragment();
    let mut config = config(dir.path());
    config.gaps = GapPolicy::Reject;

    let summary = Harvester::new(&fetcher, &config)
        .dump(&single_episode_capture(), 1)
        .await
        .unwrap();
    assert!(summary.episodes.is_empty());
    assert_eq!(summary.skipped, vec![1]);

    let writer = SeasonWriter::new(dir.path(), 1);
    assert!(!writer.vtt_path(ep(1)).exists());
    assert!(!writer.structured_path(ep(1)).exists());
    assert_eq!(fs::read_to_string(writer.index_path()).unwrap(), "");
}

fn fetcher_out_of_order() -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert(
        &playlist_url(UUID_A, "subs_en_cc.m3u8"),
        &playlist_body(&["en0.vtt", "en1.vtt"]),
    );
    fetcher.insert(
        &fragment_url(UUID_A, "en0.vtt"),
        &vtt_fragment(&[(10.0, 11.0, "Second."), (12.0, 13.0, "Third.")]),
    );
    fetcher.insert(
        &fragment_url(UUID_A, "en1.vtt"),
        &vtt_fragment(&[(5.0, 6.0, "First?")]),
    );
    fetcher
}

#[tokio::test]
async fn test_out_of_order_cues_tolerated() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher_out_of_order();
    let config = config(dir.path());

    let summary = Harvester::new(&fetcher, &config)
        .dump(&single_episode_capture(), 1)
        .await
        .unwrap();
    assert_eq!(summary.episodes.len(), 1);

    // Cue order is kept as found.
    let utterances =
        read_utterances(&SeasonWriter::new(dir.path(), 1).structured_path(ep(1)));
    let starts: Vec<f64> = utterances.iter().map(|u| u.start).collect();
    assert_eq!(starts, vec![10.0, 12.0, 5.0]);
}

#[tokio::test]
async fn test_out_of_order_cues_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher_out_of_order();
    let mut config = config(dir.path());
    config.structure.cue_order = CueOrderPolicy::Reject;

    let harvester = Harvester::new(&fetcher, &config);
    let summary = harvester.dump(&single_episode_capture(), 1).await.unwrap();
    assert_eq!(summary.skipped, vec![1]);
    assert!(!SeasonWriter::new(dir.path(), 1).vtt_path(ep(1)).exists());

    let doc = vtt_fragment(&[(10.0, 11.0, "A"), (5.0, 6.0, "B")]);
    assert!(matches!(
        harvester.structure_document(ep(1), &doc),
        Err(HarvestError::OutOfOrderCues { index: 1, .. })
    ));
}

#[tokio::test]
async fn test_failed_playlist_skips_episode() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut fetcher = fetcher();
    // Answers during discovery, then fails when the episode is dumped.
    fetcher.insert_once(
        &playlist_url(UUID_A, "subs_en_cc.m3u8"),
        &playlist_body(&["en0.vtt", "en1.vtt"]),
    );
    let config = config(dir.path());

    let summary = Harvester::new(&fetcher, &config)
        .dump(&capture(), 1)
        .await
        .unwrap();
    assert_eq!(summary.skipped, vec![1]);
    assert_eq!(summary.episodes.len(), 1);
    assert_eq!(summary.episodes[0].episode, 2);

    let writer = SeasonWriter::new(dir.path(), 1);
    assert!(!writer.vtt_path(ep(1)).exists());
    assert!(writer.vtt_path(ep(2)).exists());
}

#[tokio::test]
async fn test_no_candidates() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher();
    let config = config(dir.path());
    let har = HarBuilder::new()
        .entry(&playlist_url(UUID_A, "video.m3u8"), "2024-03-01T20:00:00Z")
        .build();

    let result = Harvester::new(&fetcher, &config).dump(&har, 1).await;
    assert!(matches!(result, Err(HarvestError::NoCandidates)));
    assert!(!SeasonWriter::new(dir.path(), 1).index_path().exists());
}

#[tokio::test]
async fn test_structure_written_transcripts() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = fetcher();
    let config = config(dir.path());
    Harvester::new(&fetcher, &config)
        .dump(&capture(), 1)
        .await
        .unwrap();

    let writer = SeasonWriter::new(dir.path(), 1);
    let before = fs::read(writer.structured_path(ep(1))).unwrap();
    fs::remove_dir_all(writer.season_dir().join("structured")).unwrap();

    fs::write(writer.season_dir().join("vtt").join("notes.vtt"), "WEBVTT\n").unwrap();

    let summary = Harvester::new(&fetcher, &config).structure(&[]).unwrap();
    assert_eq!(summary.files.len(), 2);
    assert!(!writer.season_dir().join("structured").join("notes.jsonl").exists());
    assert_eq!(summary.utterances, 7);
    assert_eq!(fs::read(writer.structured_path(ep(1))).unwrap(), before);

    let mut stripped = config.clone();
    stripped.structure.strip_notes = true;
    // No fetcher needed to re-structure what is on disk.
    let summary = Harvester::offline(&stripped).structure(&[1]).unwrap();
    assert_eq!(summary.utterances, 5);

    assert!(matches!(
        Harvester::offline(&stripped).structure(&[4]),
        Err(HarvestError::NoTranscripts(_))
    ));
}
