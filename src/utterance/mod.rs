//! Utterance structuring
//!
//! Per cue: clean the text, detect caption notes, split off the speaker tag
//! and resolve the speaker through an optional speaker map.

pub mod extractor;
pub mod normalize;
pub mod speaker;
pub mod speaker_map;

pub use extractor::{check_cue_order, Utterance, UtteranceExtractor};
pub use normalize::{is_caption_note, normalize_text};
pub use speaker::{extract_speaker, SpeakerParse};
pub use speaker_map::{SpeakerIdentity, SpeakerMap};
