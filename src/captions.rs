use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::error::{ErrorKind, FETCH_RULES, FetchError};
use crate::youtube::{InnertubeError, Session, SessionSettings};
use crate::{CaptionSegment, VideoId};

/// Anything that can turn a video ID into caption segments
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<CaptionSegment>, FetchError>;
}

/// Caption source backed by YouTube's InnerTube API. A new session is opened per fetch.
pub struct InnertubeCaptions {
    http: reqwest::Client,
    settings: SessionSettings,
}

impl InnertubeCaptions {
    pub fn new(http: reqwest::Client, settings: SessionSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl CaptionSource for InnertubeCaptions {
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<CaptionSegment>, FetchError> {
        let session = Session::create(self.http.clone(), &self.settings)
            .await
            .map_err(service_failure)?;
        let info = session.get_info(video_id).await.map_err(service_failure)?;
        debug!("Video {video_id}: {:?}", info.title);

        let payload = info
            .get_transcript()
            .await
            .map_err(service_failure)?
            .ok_or_else(|| FetchError::new(ErrorKind::NoCaptions, "video has no captions"))?;

        normalize_segments(payload.as_json())
    }
}

fn service_failure(err: InnertubeError) -> FetchError {
    FetchError::classified(FETCH_RULES, err.to_string())
}

/// Reshape a `get_transcript` payload into caption segments, in source order.
pub fn normalize_segments(payload: &Value) -> Result<Vec<CaptionSegment>, FetchError> {
    let raw = initial_segments(payload)
        .ok_or_else(|| FetchError::new(ErrorKind::NoCaptions, "empty transcript content"))?;

    let segments: Vec<CaptionSegment> = raw.iter().map(to_segment).collect();
    if segments.is_empty() {
        return Err(FetchError::new(ErrorKind::NoCaptions, "transcript has no segments"));
    }
    Ok(segments)
}

fn initial_segments(payload: &Value) -> Option<&Vec<Value>> {
    payload
        .get("actions")?
        .get(0)?
        .get("updateEngagementPanelAction")?
        .get("content")?
        .get("transcriptRenderer")?
        .get("content")?
        .get("transcriptSearchPanelRenderer")?
        .get("body")?
        .get("transcriptSegmentListRenderer")?
        .get("initialSegments")?
        .as_array()
}

fn to_segment(raw: &Value) -> CaptionSegment {
    let renderer = raw
        .get("transcriptSegmentRenderer")
        .or_else(|| raw.get("transcriptSectionHeaderRenderer"))
        .unwrap_or(raw);

    let text = renderer.get("snippet").map(snippet_text).unwrap_or_default();
    let start = millis(renderer.get("startMs"));
    let end = millis(renderer.get("endMs"));

    CaptionSegment::from_span(&text, start, end)
}

fn snippet_text(snippet: &Value) -> String {
    if let Some(runs) = snippet.get("runs").and_then(Value::as_array) {
        return runs
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect();
    }
    snippet
        .get("simpleText")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// Times arrive as decimal strings, occasionally as numbers.
fn millis(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}
