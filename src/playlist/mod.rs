//! Subtitle playlist handling
//!
//! Reading the `.m3u8` bodies captured in a session:
//! - Fragment references (`*.vtt` lines)
//! - Resolution of relative references against the playlist URL

pub mod m3u8;

pub use m3u8::{fragment_refs, resolve_fragment_url};
