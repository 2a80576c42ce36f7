use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::VideoId;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Where InnerTube is reached unless configured otherwise
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// WEB client version used when the home page does not advertise one
pub const DEFAULT_CLIENT_VERSION: &str = "2.20241126.01.00";

#[derive(Debug, Error)]
pub enum InnertubeError {
    #[error("request to YouTube failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    #[error("video is age-gated: {0}")]
    AgeGated(String),

    #[error("video is not available: {0}")]
    Unplayable(String),

    #[error("Transcript is disabled on this video")]
    TranscriptDisabled,

    #[error("unexpected response from YouTube: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Client context sent with every InnerTube call
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub base_url: String,
    pub hl: String,
    pub gl: String,
    pub client_version: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hl: "en".to_string(),
            gl: "US".to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Value>,
    #[serde(rename = "videoDetails")]
    video_details: Option<VideoDetails>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
}

/// What the player response says about captions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptionState {
    /// No `captions` block: the video has no caption track
    Absent,
    /// A track list renderer with no tracks in it: captions switched off
    Disabled,
    Present,
}

/// Values scraped from the YouTube home page
#[derive(Debug, Default, PartialEq, Eq)]
struct PageConfig {
    api_key: Option<String>,
    client_version: Option<String>,
    visitor_data: Option<String>,
}

/// An InnerTube session: one HTTP client plus the client context YouTube expects.
pub struct Session {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    context: Value,
}

/// Metadata for one video, enough to locate its transcript.
pub struct VideoInfo<'a> {
    session: &'a Session,
    pub title: String,
    captions: CaptionState,
    transcript_params: Option<String>,
}

/// Raw `get_transcript` response, left loosely typed for the caller to read.
#[derive(Debug, Clone)]
pub struct TranscriptPayload(Value);

impl TranscriptPayload {
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl Session {
    /// Open a session, picking up the API key and client version from the home page
    pub async fn create(http: reqwest::Client, settings: &SessionSettings) -> Result<Self, InnertubeError> {
        debug!("Fetching home page for InnerTube config");
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        let page_html = http
            .get(format!("{base_url}/"))
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", settings.hl.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let page = PageConfig::parse(&page_html);
        debug!(
            "InnerTube config: key={} version={:?}",
            page.api_key.is_some(),
            page.client_version
        );

        let mut client = json!({
            "hl": settings.hl,
            "gl": settings.gl,
            "clientName": "WEB",
            "clientVersion": page.client_version.as_deref().unwrap_or(settings.client_version.as_str()),
        });
        if let Some(visitor_data) = page.visitor_data {
            client["visitorData"] = Value::String(visitor_data);
        }

        Ok(Self {
            http,
            base_url,
            api_key: page.api_key,
            context: json!({ "client": client }),
        })
    }

    /// Look up playability, caption presence and the transcript panel for `video_id`
    pub async fn get_info(&self, video_id: &VideoId) -> Result<VideoInfo<'_>, InnertubeError> {
        let player: PlayerResponse =
            serde_json::from_value(self.post("player", json!({ "videoId": video_id.as_str() })).await?)?;
        check_playability(player.playability_status.as_ref())?;

        let next = self.post("next", json!({ "videoId": video_id.as_str() })).await?;
        let transcript_params = find_transcript_params(&next);
        debug!("Transcript panel for {video_id}: {}", transcript_params.is_some());

        Ok(VideoInfo {
            session: self,
            title: player.video_details.and_then(|vd| vd.title).unwrap_or_default(),
            captions: caption_state(player.captions.as_ref()),
            transcript_params,
        })
    }

    async fn post(&self, endpoint: &'static str, mut body: Value) -> Result<Value, InnertubeError> {
        body["context"] = self.context.clone();

        let mut url = format!("{}/youtubei/v1/{endpoint}?prettyPrint=false", self.base_url);
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        debug!("POST {endpoint}");

        let resp = self
            .http
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(InnertubeError::Status {
                endpoint,
                status: status.as_u16(),
                message: service_error_message(&text),
            });
        }

        Ok(resp.json().await?)
    }
}

impl VideoInfo<'_> {
    /// Fetch the transcript panel. `Ok(None)` when the video offers no transcript.
    pub async fn get_transcript(&self) -> Result<Option<TranscriptPayload>, InnertubeError> {
        match self.captions {
            CaptionState::Absent => return Ok(None),
            CaptionState::Disabled => return Err(InnertubeError::TranscriptDisabled),
            CaptionState::Present => {}
        }
        let Some(params) = &self.transcript_params else {
            return Ok(None);
        };

        let payload = self.session.post("get_transcript", json!({ "params": params })).await?;
        Ok(Some(TranscriptPayload(payload)))
    }
}

static API_KEY_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("valid regex"),
        Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("valid regex"),
    ]
});

static CLIENT_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""INNERTUBE_CLIENT_VERSION"\s*:\s*"([^"]+)""#).expect("valid regex"));

static VISITOR_DATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""VISITOR_DATA"\s*:\s*"([^"]+)""#).expect("valid regex"));

impl PageConfig {
    fn parse(html: &str) -> Self {
        let capture = |re: &Regex| re.captures(html).map(|caps| caps[1].to_string());
        Self {
            api_key: extract_api_key(html),
            client_version: capture(&CLIENT_VERSION_PATTERN),
            visitor_data: capture(&VISITOR_DATA_PATTERN),
        }
    }
}

fn extract_api_key(html: &str) -> Option<String> {
    API_KEY_PATTERNS
        .iter()
        .find_map(|re| re.captures(html).map(|caps| caps[1].to_string()))
}

fn check_playability(status: Option<&PlayabilityStatus>) -> Result<(), InnertubeError> {
    let Some(status) = status else {
        return Ok(());
    };
    let code = status.status.as_deref().unwrap_or("OK");
    if code == "OK" {
        return Ok(());
    }

    let reason = status.reason.clone().unwrap_or_else(|| code.to_string());
    if code == "LOGIN_REQUIRED" && reason.to_lowercase().contains("age") {
        return Err(InnertubeError::AgeGated(reason));
    }
    Err(InnertubeError::Unplayable(reason))
}

fn caption_state(captions: Option<&Value>) -> CaptionState {
    let Some(captions) = captions else {
        return CaptionState::Absent;
    };
    let tracks = captions
        .get("playerCaptionsTracklistRenderer")
        .and_then(|renderer| renderer.get("captionTracks"))
        .and_then(Value::as_array);
    match tracks {
        Some(tracks) if !tracks.is_empty() => CaptionState::Present,
        _ => CaptionState::Disabled,
    }
}

/// Depth-first search of a `next` response for the transcript panel's endpoint params.
fn find_transcript_params(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(params) = map
                .get("getTranscriptEndpoint")
                .and_then(|endpoint| endpoint.get("params"))
                .and_then(Value::as_str)
            {
                return Some(params.to_string());
            }
            map.values().find_map(find_transcript_params)
        }
        Value::Array(items) => items.iter().find_map(find_transcript_params),
        _ => None,
    }
}

fn service_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
