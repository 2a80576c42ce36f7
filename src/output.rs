use crate::{CaptionSegment, TranscriptResult};

/// Render captions as one paragraph: texts joined by single spaces
pub fn render_text(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Render one `[h:]mm:ss  text` line per segment
pub fn render_timeline(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("{}  {}", format_time(s.offset_millis), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the same envelope the HTTP endpoint returns
pub fn render_json(segments: &[CaptionSegment]) -> String {
    let result = TranscriptResult::Success(segments.to_vec());
    serde_json::to_string_pretty(&result).unwrap_or_default()
}

/// Render captions as SubRip cues
pub fn render_srt(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_srt_time(s.offset_millis),
                format_srt_time(s.offset_millis + s.duration_millis),
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `mm:ss`, or `h:mm:ss` once the offset reaches an hour
pub fn format_time(millis: u64) -> String {
    let seconds = millis / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{hours}:{:02}:{:02}", minutes % 60, seconds % 60)
    } else {
        format!("{:02}:{:02}", minutes % 60, seconds % 60)
    }
}

fn format_srt_time(millis: u64) -> String {
    let ms = millis % 1000;
    let total_secs = millis / 1000;
    format!(
        "{:02}:{:02}:{:02},{ms:03}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// File name used when saving a transcript's plain text
pub fn download_filename(token: &str) -> String {
    format!("transcript-{token}.txt")
}
