use thiserror::Error;

/// Main error type for transcript harvesting
#[derive(Error, Debug)]
pub enum HarvestError {
    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Capture log or record (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config or speaker map file could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// A playlist or fragment reference could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The capture log is not in the expected shape
    #[error("Invalid capture log: {0}")]
    InvalidCapture(String),

    /// No subtitle playlists were discovered in the capture log
    #[error("No subtitle playlists found in capture log")]
    NoCandidates,

    /// No subtitle documents were found to structure
    #[error("No subtitle documents found under {0}")]
    NoTranscripts(String),

    /// Fragments were missing and gaps are not allowed
    #[error("Incomplete transcript {episode_id}: missing fragments {missing:?}")]
    IncompleteTranscript {
        episode_id: String,
        missing: Vec<usize>,
    },

    /// A cue starts before its predecessor and out-of-order cues are rejected
    #[error("Out-of-order cue in {episode_id}: cue {index} starts at {start}s, before {previous}s")]
    OutOfOrderCues {
        episode_id: String,
        index: usize,
        start: f64,
        previous: f64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HarvestError>;
