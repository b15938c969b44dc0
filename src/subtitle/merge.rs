//! Fragment merger
//!
//! Joins the fragments of one subtitle track into a single WebVTT document.
//! The first downloaded fragment is kept whole since it carries the header.
//! Every later fragment is cut down to start at its first timing line, which
//! drops its repeated header, and is appended after a blank line.

use crate::fetch::Fragment;
use crate::subtitle::webvtt::contains_timing;

/// A merged subtitle document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTranscript {
    /// Document lines, without line terminators
    pub lines: Vec<String>,
    /// Indexes of fragments that failed to download
    pub missing: Vec<usize>,
}

impl MergedTranscript {
    /// True if every fragment made it into the document.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// True if no fragment had any content.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The document text, newline terminated.
    pub fn to_document(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Merge fragments, in the order given, into one document.
///
/// Failed and empty fragments contribute nothing; failed ones are listed in
/// `missing` so the caller can decide whether a gap is acceptable.
pub fn merge_fragments(fragments: &[Fragment]) -> MergedTranscript {
    let mut lines: Vec<String> = Vec::new();
    let mut missing = Vec::new();
    let mut have_header = false;

    for fragment in fragments {
        let Some(text) = fragment.text() else {
            missing.push(fragment.index);
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let fragment_lines: Vec<&str> = text.lines().collect();
        if fragment_lines.is_empty() {
            continue;
        }

        if !have_header {
            lines.extend(fragment_lines.iter().map(|l| l.to_string()));
            have_header = true;
        } else {
            let first_cue = fragment_lines
                .iter()
                .position(|l| contains_timing(l))
                .unwrap_or(fragment_lines.len());
            lines.push(String::new());
            lines.extend(fragment_lines[first_cue..].iter().map(|l| l.to_string()));
        }
    }

    MergedTranscript { lines, missing }
}
