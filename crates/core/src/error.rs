use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed invocation, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidInput,
    IdentifierNotFound,
    NoCaptionsAvailable,
    VideoUnavailable,
    RetrievalFailure,
    TokenizerResourceMissing,
    TokenizerInternalError,
    EmptyResult,
    UnexpectedError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Could not extract a valid YouTube video ID from the URL: {url}")]
    VideoIdNotFound { url: String },

    #[error("No subtitles/captions available (lang: '{language}')")]
    NoCaptions { language: String },

    #[error("Video unavailable")]
    VideoUnavailable,

    #[error("Caption retrieval failed: {reason}")]
    RetrievalFailed { reason: String },

    #[error("Sentence tokenizer resource for '{language}' not found: {reason}")]
    TokenizerResourceMissing { language: String, reason: String },

    #[error("Error during sentence tokenization: {reason}")]
    TokenizerFailed { reason: String },

    #[error("Parsing subtitle file resulted in empty content")]
    EmptyContent,

    #[error("An unexpected error occurred during processing: {reason}")]
    Unexpected { reason: String },
}

impl TranscriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptError::InvalidInput { .. } => ErrorKind::InvalidInput,
            TranscriptError::VideoIdNotFound { .. } => ErrorKind::IdentifierNotFound,
            TranscriptError::NoCaptions { .. } => ErrorKind::NoCaptionsAvailable,
            TranscriptError::VideoUnavailable => ErrorKind::VideoUnavailable,
            TranscriptError::RetrievalFailed { .. } => ErrorKind::RetrievalFailure,
            TranscriptError::TokenizerResourceMissing { .. } => {
                ErrorKind::TokenizerResourceMissing
            }
            TranscriptError::TokenizerFailed { .. } => ErrorKind::TokenizerInternalError,
            TranscriptError::EmptyContent => ErrorKind::EmptyResult,
            TranscriptError::Unexpected { .. } => ErrorKind::UnexpectedError,
        }
    }
}

// Kept as a string so cached results stay `Clone`.
impl From<std::io::Error> for TranscriptError {
    fn from(err: std::io::Error) -> Self {
        TranscriptError::Unexpected {
            reason: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
