pub mod captions;
pub mod config;
pub mod error;
pub mod locale;
pub mod output;
pub mod server;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A single caption line, with times in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionSegment {
    pub text: String,
    #[serde(rename = "offset")]
    pub offset_millis: u64,
    #[serde(rename = "duration")]
    pub duration_millis: u64,
}

impl CaptionSegment {
    /// Build a segment from raw start/end times. A negative span is clamped to zero.
    pub fn from_span(text: &str, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.trim().to_string(),
            offset_millis: start_ms,
            duration_millis: end_ms.saturating_sub(start_ms),
        }
    }
}

/// Identifier of a YouTube video as found in a URL or typed bare.
///
/// Only pattern-matched, never checked against YouTube; a nonexistent ID
/// surfaces as a fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one transcript request, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptResult {
    Success(Vec<CaptionSegment>),
    Failure(String),
}

impl Serialize for TranscriptResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TranscriptResult", 2)?;
        match self {
            TranscriptResult::Success(segments) => {
                s.serialize_field("success", &true)?;
                s.serialize_field("data", segments)?;
            }
            TranscriptResult::Failure(message) => {
                s.serialize_field("success", &false)?;
                s.serialize_field("error", message)?;
            }
        }
        s.end()
    }
}

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)").expect("valid URL regex")
});

static BARE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid bare ID regex"));

/// Extract the video ID from a watch, short or embed URL, or accept a bare 11-character ID.
///
/// The URL form captures everything up to the first `&`, `?`, `#` or newline and
/// does not re-check its length.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if let Some(caps) = URL_PATTERN.captures(input) {
        return Some(VideoId(caps[1].to_string()));
    }

    if BARE_ID_PATTERN.is_match(input) {
        return Some(VideoId(input.to_string()));
    }

    None
}
