//! Captext Core Library
//!
//! Core functionality for fetching YouTube auto-captions and turning the WebVTT
//! markup into a timestamped transcript and readable paragraphs.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod paragraph;
pub mod pipeline;
pub mod source;
pub mod tokenizer;
pub mod types;
pub mod video_id;
pub mod vtt;
pub mod words;

// Re-export commonly used items at crate root
pub use cache::{ArtifactKind, ResultCache, get_root_data_dir, get_transcript_path};
pub use config::Config;
pub use error::{ConfigError, ErrorKind, Result, TranscriptError};
pub use format::format_transcript_with_timestamps;
pub use paragraph::{GroupingMode, ParagraphConfig, Paragraphs, format_paragraphs};
pub use pipeline::{
    Fetched, Session, TranscriptFiles, TranscriptPipeline, render_transcript, save_transcript,
};
pub use source::{CaptionSource, StagedCaptions, YtDlpSource};
pub use tokenizer::{SentenceTokenizer, SetupOutcome, TokenizerError, setup_tokenizer};
pub use types::{Cue, Transcript, TranscriptResult, VideoId};
pub use video_id::extract_video_id;
pub use vtt::{parse_cues, strip_markup};
pub use words::{Stopwords, WordCount, word_frequencies};
