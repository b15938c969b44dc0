//! Capture log handling
//!
//! - `har`: reading the HAR file and discovering subtitle playlists
//! - `select`: choosing one playlist per episode and numbering episodes

pub mod har;
pub mod select;

pub use har::{CaptureEntry, CaptureLoader, Har};
pub use select::{select_episodes, ChosenEpisode};
