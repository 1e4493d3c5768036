pub mod youtube;

use thiserror::Error;

/// One timed caption unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Why a transcript could not be fetched. Every variant is skippable.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("no transcript for video {video_id} in {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("YouTube is blocking requests for video {0}")]
    RequestBlocked(String),

    #[error("video {0} needs a PO token to load its transcript")]
    PoTokenRequired(String),

    #[error("could not parse YouTube response for video {video_id}: {detail}")]
    Unparsable { video_id: String, detail: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("transcript XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Anything that can turn a video id into caption segments.
#[allow(async_fn_in_trait)]
pub trait TranscriptSource {
    /// `languages` is in preference order.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<Segment>, FetchError>;
}

/// Plain-text rendering: one segment per line.
pub fn format_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Seconds from the start of the video to the end of the last caption.
pub fn covered_seconds(segments: &[Segment]) -> f64 {
    segments
        .last()
        .map(|s| s.start + s.duration)
        .unwrap_or_default()
}
