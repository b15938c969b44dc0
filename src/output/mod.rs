//! Output files
//!
//! Merged transcripts, plain text, utterance records and the season index.

pub mod writer;

pub use writer::{discover_transcripts, IndexRow, SeasonWriter};
