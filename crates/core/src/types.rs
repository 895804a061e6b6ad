use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, TranscriptError};

/// Platform video identifier, e.g. `dQw4w9WgXcQ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL handed to the caption source.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One caption entry with its markup already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub time_range: String,
    pub settings: Option<String>,
    pub lines: Vec<String>,
}

impl Cue {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,
    pub language: String,
    pub timestamped: String,
    pub paragraph: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

/// Flat, serializable view of one invocation: both renderings or an error.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResult {
    pub video_id: Option<VideoId>,
    pub timestamped: String,
    pub paragraph: String,
    pub error: Option<ErrorReport>,
}

impl TranscriptResult {
    /// Fill in the identifier for error reports raised after it was extracted.
    pub fn with_video_id(mut self, video_id: Option<VideoId>) -> Self {
        if self.video_id.is_none() {
            self.video_id = video_id;
        }
        self
    }
}

impl From<&std::result::Result<Transcript, TranscriptError>> for TranscriptResult {
    fn from(result: &std::result::Result<Transcript, TranscriptError>) -> Self {
        match result {
            Ok(transcript) => TranscriptResult {
                video_id: Some(transcript.video_id.clone()),
                timestamped: transcript.timestamped.clone(),
                paragraph: transcript.paragraph.clone(),
                error: None,
            },
            Err(err) => TranscriptResult {
                video_id: None,
                timestamped: String::new(),
                paragraph: String::new(),
                error: Some(ErrorReport {
                    kind: err.kind(),
                    message: format!("Error: {}", err),
                }),
            },
        }
    }
}
