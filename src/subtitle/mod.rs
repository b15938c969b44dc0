//! WebVTT transcript handling
//!
//! This module handles the subtitle documents of one episode:
//! - Merging downloaded fragments into a single document
//! - Parsing a document into timed cues
//! - Rendering a document as plain text

pub mod merge;
pub mod webvtt;

pub use merge::{merge_fragments, MergedTranscript};
pub use webvtt::{parse_cues, to_plain_text, Cue, CueParser};
