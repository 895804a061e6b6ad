//! Re-flow caption text into readable paragraphs.
//!
//! Auto-generated captions rarely carry terminal punctuation, so sentence
//! tokenization often returns one giant "sentence". When the tokenizer finds too
//! few sentences for the amount of text, paragraphs are built from fixed-size
//! groups of caption lines instead.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    tokenizer::{SentenceTokenizer, TokenizerError},
    vtt::{is_header_line, is_time_range, strip_markup},
};

pub const NOTHING_EXTRACTED_MESSAGE: &str = "Could not extract text content for formatting.";

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+:.+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphConfig {
    pub sentences_per_paragraph: usize,
    pub lines_per_fallback_paragraph: usize,
    /// Lower bound of the sentence-count threshold.
    pub min_sentence_threshold: usize,
    /// The threshold also scales as `segments / threshold_divisor`.
    pub threshold_divisor: usize,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            sentences_per_paragraph: 5,
            lines_per_fallback_paragraph: 8,
            min_sentence_threshold: 5,
            threshold_divisor: 10,
        }
    }
}

impl ParagraphConfig {
    pub fn sentence_threshold(&self, segment_count: usize) -> usize {
        self.min_sentence_threshold
            .max(segment_count / self.threshold_divisor.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMode {
    Sentences,
    FallbackLines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraphs {
    Formatted { text: String, mode: GroupingMode },
    NothingExtracted,
}

impl Paragraphs {
    pub fn as_str(&self) -> &str {
        match self {
            Paragraphs::Formatted { text, .. } => text,
            Paragraphs::NothingExtracted => NOTHING_EXTRACTED_MESSAGE,
        }
    }

    pub fn mode(&self) -> Option<GroupingMode> {
        match self {
            Paragraphs::Formatted { mode, .. } => Some(*mode),
            Paragraphs::NothingExtracted => None,
        }
    }
}

impl fmt::Display for Paragraphs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every caption text line in document order, stripped of markup.
///
/// Time ranges, header lines, blank lines and `label:value` metadata lines are skipped.
pub fn extract_text_segments(markup: &str) -> Vec<String> {
    markup
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_header_line(line) && !is_time_range(line))
        .map(strip_markup)
        .filter(|cleaned| !cleaned.is_empty() && !LABEL_RE.is_match(cleaned))
        .collect()
}

fn group(items: &[String], size: usize) -> Vec<String> {
    items
        .chunks(size.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}

pub fn format_paragraphs(
    markup: &str,
    tokenizer: &dyn SentenceTokenizer,
    config: &ParagraphConfig,
) -> Result<Paragraphs, TokenizerError> {
    let segments = extract_text_segments(markup);
    if segments.is_empty() {
        return Ok(Paragraphs::NothingExtracted);
    }

    let full_text = segments.join(" ");
    let sentences = tokenizer.tokenize(&full_text)?;

    let threshold = config.sentence_threshold(segments.len());
    let (paragraphs, mode) = if sentences.len() > threshold {
        info!(
            "Using sentence tokenization (found {} sentences)",
            sentences.len()
        );
        (
            group(&sentences, config.sentences_per_paragraph),
            GroupingMode::Sentences,
        )
    } else {
        info!(
            "Sentence tokenization ineffective (found {} sentences), using line grouping",
            sentences.len()
        );
        (
            group(&segments, config.lines_per_fallback_paragraph),
            GroupingMode::FallbackLines,
        )
    };

    Ok(Paragraphs::Formatted {
        text: paragraphs.join("\n\n").trim().to_string(),
        mode,
    })
}
