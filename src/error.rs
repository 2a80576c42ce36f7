use thiserror::Error;

/// What went wrong while turning a URL into captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed URL, or an ID YouTube rejects as malformed
    InvalidInput,
    /// No caption track, or a track without usable segments
    NoCaptions,
    /// Captions turned off for the video
    CaptionsDisabled,
    /// Removed, private, age-gated or otherwise inaccessible
    VideoUnavailable,
    /// Anything else, network failures included
    ServiceError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NoCaptions => "no_captions",
            ErrorKind::CaptionsDisabled => "captions_disabled",
            ErrorKind::VideoUnavailable => "video_unavailable",
            ErrorKind::ServiceError => "service_error",
        };
        f.write_str(name)
    }
}

/// A classified caption fetch failure
#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Classify a raw service error message with `rules`, defaulting to `ServiceError`.
    pub fn classified(rules: &[Rule], detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: classify(rules, &detail),
            detail,
        }
    }
}

/// One row of a classification table: any of `phrases` found in the message yields `kind`.
#[derive(Debug)]
pub struct Rule {
    pub phrases: &'static [&'static str],
    pub kind: ErrorKind,
}

/// Reclassification applied by the caption fetcher to errors from the video service.
pub const FETCH_RULES: &[Rule] = &[
    Rule {
        phrases: &["transcript is disabled"],
        kind: ErrorKind::CaptionsDisabled,
    },
    Rule {
        phrases: &["not available"],
        kind: ErrorKind::VideoUnavailable,
    },
];

/// Classification used to pick the user-facing message for a failed request.
pub const RESPONSE_RULES: &[Rule] = &[
    Rule {
        phrases: &["age-gated", "video is not available", "unavailable", "video removed", "not available"],
        kind: ErrorKind::VideoUnavailable,
    },
    Rule {
        phrases: &["transcript is disabled", "captions are disabled"],
        kind: ErrorKind::CaptionsDisabled,
    },
    Rule {
        phrases: &[
            "no transcripts found",
            "no captions",
            "không tìm thấy",
            "không có phụ đề",
            "không có caption",
        ],
        kind: ErrorKind::NoCaptions,
    },
    Rule {
        phrases: &["invalid video id"],
        kind: ErrorKind::InvalidInput,
    },
];

/// Case-insensitive, top-down, first match wins.
pub fn classify(rules: &[Rule], message: &str) -> ErrorKind {
    let message = message.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.phrases.iter().any(|p| message.contains(&p.to_lowercase())))
        .map(|rule| rule.kind)
        .unwrap_or(ErrorKind::ServiceError)
}
