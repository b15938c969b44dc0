//! Speaker tag detection
//!
//! Captions name the speaker with a shouted prefix: `JANICE: I can't believe
//! it.` or `DR. MOSS (V.O.): Hold still.`. This is a heuristic; there is no
//! grammar that guarantees a prefix before a colon is a name.

use super::normalize::collapse_whitespace;

/// Result of looking for a speaker tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerParse {
    /// A speaker tag was found
    Tagged {
        /// Tag as written
        raw: String,
        /// Tag with whitespace collapsed and " / " tightened to "/"
        normalized: String,
        /// Dialogue after the colon
        text: String,
    },
    /// No speaker tag; the text is unchanged
    Untagged { text: String },
}

impl SpeakerParse {
    /// Dialogue text, with or without a tag.
    pub fn text(&self) -> &str {
        match self {
            SpeakerParse::Tagged { text, .. } | SpeakerParse::Untagged { text } => text,
        }
    }

    /// Normalized speaker, if tagged.
    pub fn speaker(&self) -> Option<&str> {
        match self {
            SpeakerParse::Tagged { normalized, .. } => Some(normalized),
            SpeakerParse::Untagged { .. } => None,
        }
    }
}

/// Split a leading speaker tag off normalized caption text.
///
/// The tag is 2 to 41 characters of uppercase letters, digits, spaces and
/// `& ' . / -`, starting with a letter, optionally followed by a
/// parenthetical like `(V.O.)`, then a colon. The tag must also be equal to
/// its own uppercase form. If nothing follows the colon the whole text is
/// kept as dialogue.
pub fn extract_speaker(text: &str) -> SpeakerParse {
    let untagged = || SpeakerParse::Untagged {
        text: text.to_string(),
    };

    let Some(caps) = regex!(r"^([A-Z][A-Z0-9 &'./-]{1,40})(?:\s*\([^)]*\))?\s*:\s*(.*)$")
        .captures(text)
    else {
        return untagged();
    };

    let raw = caps[1].trim();
    if raw.to_uppercase() != raw {
        return untagged();
    }
    let remainder = caps[2].trim();

    SpeakerParse::Tagged {
        raw: raw.to_string(),
        normalized: collapse_whitespace(raw).replace(" / ", "/"),
        text: if remainder.is_empty() {
            text.to_string()
        } else {
            remainder.to_string()
        },
    }
}
