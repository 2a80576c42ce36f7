use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Language of user-facing messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

/// Message shown for a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    UrlRequired,
    InvalidUrl,
    InvalidVideoId,
    NoCaptions,
    CaptionsDisabled,
    VideoUnavailable,
    UnknownError,
    ApiName,
    ApiInstructions,
}

impl Locale {
    pub fn text(self, message: Message) -> &'static str {
        match self {
            Locale::En => match message {
                Message::UrlRequired => "URL is required.",
                Message::InvalidUrl => "Invalid YouTube URL. Please check the URL and try again.",
                Message::InvalidVideoId => "Invalid video ID.",
                Message::NoCaptions => "This video has no captions. Please choose another video with captions.",
                Message::CaptionsDisabled => "Captions are disabled for this video.",
                Message::VideoUnavailable => "The video is restricted or not available.",
                Message::UnknownError => "An unknown error occurred.",
                Message::ApiName => "YouTube Transcript API",
                Message::ApiInstructions => "Send a POST request with a JSON body {\"url\": \"<YouTube URL>\"}.",
            },
            Locale::Vi => match message {
                Message::UrlRequired => "URL là bắt buộc",
                Message::InvalidUrl => "URL YouTube không hợp lệ. Vui lòng kiểm tra lại URL.",
                Message::InvalidVideoId => "ID video không hợp lệ",
                Message::NoCaptions => "Video này không có phụ đề. Vui lòng chọn video khác có phụ đề.",
                Message::CaptionsDisabled => "Video này đã tắt phụ đề",
                Message::VideoUnavailable => "Video bị hạn chế hoặc không khả dụng",
                Message::UnknownError => "Có lỗi không xác định",
                Message::ApiName => "YouTube Transcript API",
                Message::ApiInstructions => "Sử dụng POST request với YouTube URL",
            },
        }
    }

    /// Localized text for a fetch failure of `kind`; `None` means show the raw detail.
    pub fn failure_message(self, kind: ErrorKind) -> Option<&'static str> {
        let message = match kind {
            ErrorKind::InvalidInput => Message::InvalidVideoId,
            ErrorKind::NoCaptions => Message::NoCaptions,
            ErrorKind::CaptionsDisabled => Message::CaptionsDisabled,
            ErrorKind::VideoUnavailable => Message::VideoUnavailable,
            ErrorKind::ServiceError => return None,
        };
        Some(self.text(message))
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Vi => write!(f, "vi"),
        }
    }
}
