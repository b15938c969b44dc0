//! Network access
//!
//! - `client`: the explicitly constructed HTTP client and the `TextFetcher` seam
//! - `segments`: bounded concurrent download of a playlist's fragments

pub mod client;
pub mod segments;

pub use client::{HttpClient, TextFetcher};
pub use segments::{Fragment, FragmentOutcome, SegmentFetcher};
