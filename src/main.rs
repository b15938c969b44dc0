//! HLS transcript harvester
//!
//! Reads a HAR capture of a streaming session, rebuilds one WebVTT transcript
//! per episode from the captured subtitle playlists, and writes
//! speaker-attributed utterance records next to it.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hls_transcripts::capture::Har;
use hls_transcripts::config::{CueOrderPolicy, GapPolicy};
use hls_transcripts::config_file::{generate_default_config, ConfigFile};
use hls_transcripts::episode::season_from_capture_path;
use hls_transcripts::utterance::SpeakerMap;
use hls_transcripts::{HarvestConfig, HarvestError, Harvester, HttpClient, Result};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-transcripts";

#[derive(Parser, Debug)]
#[command(name = "hls-transcripts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Ignored if it does not exist.
    #[arg(short, long, default_value = "hls-transcripts.toml")]
    config: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild transcripts and utterances from a HAR capture
    Dump(DumpArgs),
    /// Re-run utterance extraction over transcripts already on disk
    Structure(StructureArgs),
    /// Write a default configuration file
    InitConfig {
        /// Where to write it
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Output root directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Drop caption-note-only cues like "(cheering)"
    #[arg(long)]
    strip_notes: bool,

    /// Speaker map (TOML)
    #[arg(long)]
    speaker_map: Option<PathBuf>,

    /// Refuse episodes whose cues go back in time
    #[arg(long)]
    strict_cue_order: bool,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// HAR capture file; one season, episodes watched in order
    har: PathBuf,

    /// Language hint used to prefer matching playlists
    #[arg(long)]
    lang: Option<String>,

    /// Season number (default: from the HAR file name, else 1)
    #[arg(long)]
    season: Option<u32>,

    /// Also emit plain text
    #[arg(long)]
    text: bool,

    /// Concurrent fragment downloads per episode
    #[arg(long)]
    max_workers: Option<usize>,

    /// Skip episodes with fragments that failed to download
    #[arg(long)]
    no_gaps: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct StructureArgs {
    /// Limit to a season; may be repeated
    #[arg(long = "season")]
    seasons: Vec<u32>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config);
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    init_logging(&config.log_level, &config.log_format);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, mut config: HarvestConfig) -> Result<()> {
    match command {
        Command::InitConfig { path } => {
            generate_default_config(&path)?;
            tracing::info!("Wrote {}", path.display());
            Ok(())
        }
        Command::Dump(args) => {
            apply_common(&mut config, &args.common);
            if let Some(lang) = args.lang {
                config.fetch.language = lang;
            }
            if let Some(workers) = args.max_workers {
                config.fetch.max_workers = workers;
            }
            if args.text {
                config.emit_text = true;
            }
            if args.no_gaps {
                config.gaps = GapPolicy::Reject;
            }
            config.validate().map_err(HarvestError::Config)?;

            let season = resolve_season(args.season, config.season, &args.har)?;
            let har = Har::from_file(&args.har)?;
            tracing::info!("{}: {} entries, season {}", args.har.display(), har.log.entries.len(), season);

            let client = HttpClient::new(&config.fetch)?;
            let harvester = with_speakers(Harvester::new(&client, &config), &config);
            let summary = harvester.dump(&har, season).await?;
            tracing::info!(
                "{} episode(s) written, {} skipped",
                summary.episodes.len(),
                summary.skipped.len()
            );
            Ok(())
        }
        Command::Structure(args) => {
            apply_common(&mut config, &args.common);
            config.validate().map_err(HarvestError::Config)?;

            let harvester = with_speakers(Harvester::offline(&config), &config);
            let summary = harvester.structure(&args.seasons)?;
            tracing::info!(
                "{} file(s) structured, {} utterances",
                summary.files.len(),
                summary.utterances
            );
            Ok(())
        }
    }
}

/// Season from the flag, else the config file, else the capture file name,
/// else 1.
fn resolve_season(flag: Option<u32>, configured: Option<u32>, har: &Path) -> Result<u32> {
    let season = flag
        .or(configured)
        .or_else(|| season_from_capture_path(har))
        .unwrap_or(1);
    if season == 0 {
        return Err(HarvestError::Config(format!(
            "season numbers start at 1 (got 0 for {})",
            har.display()
        )));
    }
    Ok(season)
}

fn apply_common(config: &mut HarvestConfig, common: &CommonArgs) {
    if let Some(out) = &common.out {
        config.output_root = out.clone();
    }
    if common.strip_notes {
        config.structure.strip_notes = true;
    }
    if let Some(map) = &common.speaker_map {
        config.structure.speaker_map = Some(map.clone());
    }
    if common.strict_cue_order {
        config.structure.cue_order = CueOrderPolicy::Reject;
    }
}

/// Attach the configured speaker map. A map that can't be read is logged and
/// the run continues without one.
fn with_speakers<'a, F>(harvester: Harvester<'a, F>, config: &HarvestConfig) -> Harvester<'a, F> {
    let Some(path) = &config.structure.speaker_map else {
        return harvester;
    };
    match SpeakerMap::from_file(path) {
        Ok(map) => {
            tracing::info!("Speaker map {}: {} names", path.display(), map.len());
            harvester.with_speaker_map(map)
        }
        Err(e) => {
            tracing::warn!("Ignoring speaker map {}: {}", path.display(), e);
            harvester
        }
    }
}

fn load_config(path: &Path) -> HarvestConfig {
    if !path.exists() {
        return HarvestConfig::default();
    }
    match ConfigFile::from_file(path) {
        Ok(cf) => cf.into_harvest_config(),
        Err(e) => {
            // Logging isn't up yet.
            eprintln!(
                "Failed to load config file {}: {}. Using defaults.",
                path.display(),
                e
            );
            HarvestConfig::default()
        }
    }
}

/// Initialize logging with tracing
fn init_logging(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hls_transcripts={}", level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
