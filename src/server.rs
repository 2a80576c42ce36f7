//! HTTP front end: the transcript endpoint and the page that drives it.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use log::{info, warn};
use serde_json::Value;

use crate::captions::CaptionSource;
use crate::error::{ErrorKind, FetchError, RESPONSE_RULES, classify};
use crate::locale::{Locale, Message};
use crate::{CaptionSegment, TranscriptResult, VideoId, extract_video_id};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared, read-only state. Nothing here is mutated by requests.
pub struct AppState {
    pub captions: Arc<dyn CaptionSource>,
    pub locale: Locale,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/transcript", get(describe).post(transcript))
        .with_state(state)
}

/// Bind `host:port` and serve until the process is stopped
pub async fn serve(host: &str, port: u16, state: Arc<AppState>) -> eyre::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = addr.as_str(); "listening");
    eprintln!("Listening on http://{addr}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Captions fetched for one URL
#[derive(Debug)]
pub struct FetchedTranscript {
    pub video_id: VideoId,
    pub segments: Vec<CaptionSegment>,
}

/// Why a URL produced no transcript
#[derive(Debug)]
pub enum TranscriptFailure {
    InvalidUrl,
    Fetch(FetchError),
}

impl TranscriptFailure {
    pub fn message(&self, locale: Locale) -> String {
        match self {
            TranscriptFailure::InvalidUrl => locale.text(Message::InvalidUrl).to_string(),
            TranscriptFailure::Fetch(err) => failure_message(locale, err),
        }
    }
}

/// Extract the video ID from `url` and fetch its captions, logging each step.
///
/// Shared by the HTTP handler and the `fetch` command.
pub async fn transcript_for_url(captions: &dyn CaptionSource, url: &str) -> Result<FetchedTranscript, TranscriptFailure> {
    info!(url = url; "transcript request received");

    let Some(video_id) = extract_video_id(url) else {
        warn!(url = url; "no video id in url");
        return Err(TranscriptFailure::InvalidUrl);
    };
    info!(video_id = video_id.as_str(); "video id extracted");

    info!(video_id = video_id.as_str(); "caption fetch started");
    match captions.fetch(&video_id).await {
        Ok(segments) => {
            info!(video_id = video_id.as_str(), segments = segments.len(); "caption fetch succeeded");
            Ok(FetchedTranscript { video_id, segments })
        }
        Err(err) => {
            let kind = effective_kind(&err).to_string();
            warn!(
                video_id = video_id.as_str(),
                kind = kind.as_str(),
                error = err.detail.as_str();
                "caption fetch failed"
            );
            Err(TranscriptFailure::Fetch(err))
        }
    }
}

/// Run one transcript request body through validation, extraction and fetching.
pub async fn handle_transcript(captions: &dyn CaptionSource, locale: Locale, body: &[u8]) -> (StatusCode, TranscriptResult) {
    let Some(url) = requested_url(body) else {
        warn!("transcript request without url");
        return bad_request(locale.text(Message::UrlRequired));
    };

    match transcript_for_url(captions, &url).await {
        Ok(transcript) => (StatusCode::OK, TranscriptResult::Success(transcript.segments)),
        Err(TranscriptFailure::InvalidUrl) => bad_request(locale.text(Message::InvalidUrl)),
        Err(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            TranscriptResult::Failure(failure.message(locale)),
        ),
    }
}

/// The fetcher's own classification, or the response table when it had none.
pub fn effective_kind(err: &FetchError) -> ErrorKind {
    match err.kind {
        ErrorKind::ServiceError => classify(RESPONSE_RULES, &err.detail),
        kind => kind,
    }
}

/// User-facing text for a failed fetch. Unclassified errors show their raw message.
pub fn failure_message(locale: Locale, err: &FetchError) -> String {
    match locale.failure_message(effective_kind(err)) {
        Some(text) => text.to_string(),
        None if err.detail.trim().is_empty() => locale.text(Message::UnknownError).to_string(),
        None => err.detail.clone(),
    }
}

// A body that is not a JSON object with a non-empty string `url` counts as no URL.
fn requested_url(body: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(body).ok()?;
    body.get("url")?
        .as_str()
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn bad_request(message: &str) -> (StatusCode, TranscriptResult) {
    (StatusCode::BAD_REQUEST, TranscriptResult::Failure(message.to_string()))
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn describe(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": state.locale.text(Message::ApiName),
        "instructions": state.locale.text(Message::ApiInstructions),
    }))
}

async fn transcript(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let (status, result) = handle_transcript(state.captions.as_ref(), state.locale, &body).await;
    (status, Json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    struct StubCaptions {
        result: Result<Vec<CaptionSegment>, FetchError>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl StubCaptions {
        fn returning(result: Result<Vec<CaptionSegment>, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaptionSource for StubCaptions {
        async fn fetch(&self, video_id: &VideoId) -> Result<Vec<CaptionSegment>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(video_id.to_string());
            self.result.clone()
        }
    }

    fn sample_segments() -> Vec<CaptionSegment> {
        vec![
            CaptionSegment::from_span("Never gonna give you up", 0, 2_340),
            CaptionSegment::from_span("Never gonna let you down", 2_340, 4_100),
        ]
    }

    fn app(stub: &Arc<StubCaptions>, locale: Locale) -> Router {
        let captions: Arc<dyn CaptionSource> = stub.clone();
        router(Arc::new(AppState { captions, locale }))
    }

    async fn send(app: Router, method: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri("/api/transcript")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success() {
        let stub = StubCaptions::returning(Ok(sample_segments()));
        let (status, body) = send(
            app(&stub, Locale::En),
            "POST",
            r#"{"url":"https://www.youtube.com/watch?v=dQw4w9WgXcQ"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        for item in data {
            assert!(item["offset"].as_u64().is_some());
            assert!(item["duration"].as_u64().is_some());
        }
        assert_eq!(data[1]["offset"], 2340);
        assert_eq!(data[1]["duration"], 1760);
        assert!(body.get("error").is_none());
        assert_eq!(stub.seen.lock().unwrap().as_slice(), ["dQw4w9WgXcQ"]);
    }

    #[tokio::test]
    async fn test_short_url_fetches_same_id() {
        let stub = StubCaptions::returning(Ok(sample_segments()));
        let (status, _) = send(app(&stub, Locale::En), "POST", r#"{"url":"https://youtu.be/dQw4w9WgXcQ"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stub.seen.lock().unwrap().as_slice(), ["dQw4w9WgXcQ"]);
    }

    #[tokio::test]
    async fn test_missing_url() {
        for body in [r#"{}"#, r#"{"url":""}"#, r#"{"url":42}"#, "not json", ""] {
            let stub = StubCaptions::returning(Ok(sample_segments()));
            let (status, json) = send(app(&stub, Locale::En), "POST", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], "URL is required.");
            assert_eq!(stub.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_invalid_url_skips_fetch() {
        for body in [r#"{"url":"ftp://example.com"}"#, r#"{"url":"   "}"#] {
            let stub = StubCaptions::returning(Ok(sample_segments()));
            let (status, json) = send(app(&stub, Locale::En), "POST", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], Locale::En.text(Message::InvalidUrl));
            assert_ne!(json["error"], Locale::En.text(Message::UrlRequired));
            assert_eq!(stub.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_captions_disabled() {
        let stub = StubCaptions::returning(Err(FetchError::new(
            ErrorKind::CaptionsDisabled,
            "Transcript is disabled on this video",
        )));
        let (status, json) = send(app(&stub, Locale::En), "POST", r#"{"url":"dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert!(json["error"].as_str().unwrap().to_lowercase().contains("disabled"));
    }

    #[tokio::test]
    async fn test_service_error_classified_from_message() {
        let stub = StubCaptions::returning(Err(FetchError::new(
            ErrorKind::ServiceError,
            "video is age-gated: Sign in to confirm your age",
        )));
        let (status, json) = send(app(&stub, Locale::Vi), "POST", r#"{"url":"dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Video bị hạn chế hoặc không khả dụng");
    }

    #[tokio::test]
    async fn test_unmatched_error_exposes_raw_message() {
        let stub = StubCaptions::returning(Err(FetchError::new(
            ErrorKind::ServiceError,
            "get_transcript returned HTTP 400: Precondition check failed.",
        )));
        let (status, json) = send(app(&stub, Locale::En), "POST", r#"{"url":"dQw4w9WgXcQ"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "get_transcript returned HTTP 400: Precondition check failed.");
    }

    #[tokio::test]
    async fn test_describe() {
        let stub = StubCaptions::returning(Ok(Vec::new()));
        let (status, json) = send(app(&stub, Locale::En), "GET", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "YouTube Transcript API");
        assert!(json["instructions"].as_str().unwrap().contains("POST"));
    }

    #[tokio::test]
    async fn test_index_page() {
        let stub = StubCaptions::returning(Ok(Vec::new()));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(&stub, Locale::En).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/transcript"));
        assert!(html.contains("transcript-"));
    }

    #[tokio::test]
    async fn test_transcript_for_url() {
        let stub = StubCaptions::returning(Ok(sample_segments()));
        let transcript = transcript_for_url(&*stub, "https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        assert_eq!(transcript.video_id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(transcript.segments, sample_segments());

        let failure = transcript_for_url(&*stub, "not a url").await.unwrap_err();
        assert!(matches!(failure, TranscriptFailure::InvalidUrl));
        assert_eq!(failure.message(Locale::En), Locale::En.text(Message::InvalidUrl));
        assert_eq!(stub.calls(), 1);

        let stub = StubCaptions::returning(Err(FetchError::new(ErrorKind::NoCaptions, "video has no captions")));
        let failure = transcript_for_url(&*stub, "dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(&failure, TranscriptFailure::Fetch(err) if err.kind == ErrorKind::NoCaptions));
        assert_eq!(failure.message(Locale::Vi), "Video này không có phụ đề. Vui lòng chọn video khác có phụ đề.");
    }

    #[test]
    fn test_failure_message_fallbacks() {
        let invalid = FetchError::new(ErrorKind::ServiceError, "Invalid video ID");
        assert_eq!(failure_message(Locale::En, &invalid), "Invalid video ID.");

        let blank = FetchError::new(ErrorKind::ServiceError, "");
        assert_eq!(failure_message(Locale::Vi, &blank), "Có lỗi không xác định");
    }
}
