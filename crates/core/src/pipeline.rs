use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::{
    cache::{ArtifactKind, ResultCache, get_transcript_path},
    error::{Result, TranscriptError},
    format::format_transcript_with_timestamps,
    paragraph::{ParagraphConfig, Paragraphs, format_paragraphs},
    source::CaptionSource,
    tokenizer::{SentenceTokenizer, primary_language},
    types::{Transcript, TranscriptResult, VideoId},
    video_id::extract_video_id,
    vtt::parse_cues,
};

/// Render both transcript views from raw WebVTT markup.
///
/// Returns `(timestamped, paragraph)`.
pub fn render_transcript(
    markup: &str,
    tokenizer: &dyn SentenceTokenizer,
    config: &ParagraphConfig,
) -> Result<(String, String)> {
    let cues = parse_cues(markup);
    let timestamped = format_transcript_with_timestamps(&cues);
    let paragraphs = format_paragraphs(markup, tokenizer, config)?;

    if timestamped.is_empty() && paragraphs == Paragraphs::NothingExtracted {
        return Err(TranscriptError::EmptyContent);
    }

    Ok((timestamped, paragraphs.to_string()))
}

/// Turns a video URL into a [`Transcript`]: resolve the ID, fetch captions, render.
pub struct TranscriptPipeline {
    source: Box<dyn CaptionSource>,
    tokenizer: Box<dyn SentenceTokenizer>,
    paragraphs: ParagraphConfig,
}

impl TranscriptPipeline {
    pub fn new(
        source: Box<dyn CaptionSource>,
        tokenizer: Box<dyn SentenceTokenizer>,
        paragraphs: ParagraphConfig,
    ) -> Self {
        Self {
            source,
            tokenizer,
            paragraphs,
        }
    }

    pub async fn fetch_transcript(&self, url: &str, language: &str) -> Result<Transcript> {
        let url = url.trim();
        if url.is_empty() {
            return Err(TranscriptError::InvalidInput {
                reason: "please enter a YouTube URL".to_string(),
            });
        }
        if language.trim().is_empty() {
            return Err(TranscriptError::InvalidInput {
                reason: "caption language must not be empty".to_string(),
            });
        }
        if primary_language(language) != self.tokenizer.language() {
            return Err(TranscriptError::InvalidInput {
                reason: format!(
                    "sentence tokenizer is set up for '{}', not '{}'",
                    self.tokenizer.language(),
                    language
                ),
            });
        }

        let video_id = extract_video_id(url).ok_or_else(|| TranscriptError::VideoIdNotFound {
            url: url.to_string(),
        })?;

        let staged = self.source.fetch(&video_id, language).await?;
        info!("Processing transcript formats for {}", video_id);
        let rendered = render_transcript(staged.markup(), self.tokenizer.as_ref(), &self.paragraphs);
        staged.cleanup();

        let (timestamped, paragraph) = rendered?;
        Ok(Transcript {
            video_id,
            language: language.to_string(),
            timestamped,
            paragraph,
        })
    }
}

/// Outcome of [`Session::fetch`].
#[derive(Debug, Clone)]
pub struct Fetched {
    pub result: Result<Transcript>,
    /// Identifier extracted from the URL, kept even when the fetch failed.
    pub video_id: Option<VideoId>,
    /// The result came from the session cache without contacting the source.
    pub cached: bool,
}

impl Fetched {
    pub fn report(&self) -> TranscriptResult {
        TranscriptResult::from(&self.result).with_video_id(self.video_id.clone())
    }
}

/// A pipeline plus the cache of the last submitted URL.
pub struct Session {
    pipeline: TranscriptPipeline,
    cache: ResultCache,
}

impl Session {
    pub fn new(pipeline: TranscriptPipeline) -> Self {
        Self {
            pipeline,
            cache: ResultCache::new(),
        }
    }

    /// Fetch `url`, reusing the previous result when the same URL and language
    /// are submitted again. `force` always goes back to the source.
    pub async fn fetch(&mut self, url: &str, language: &str, force: bool) -> Fetched {
        let url = url.trim();
        if url.is_empty() {
            self.cache.invalidate();
            return Fetched {
                result: self.pipeline.fetch_transcript(url, language).await,
                video_id: None,
                cached: false,
            };
        }

        let video_id = extract_video_id(url);

        if !force {
            if let Some(result) = self.cache.get(url, language) {
                info!("Displaying previously fetched results for {}", url);
                return Fetched {
                    result: result.clone(),
                    video_id,
                    cached: true,
                };
            }
        }

        let result = self.pipeline.fetch_transcript(url, language).await;
        Fetched {
            result: self.cache.store(url, language, result).clone(),
            video_id,
            cached: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFiles {
    pub timestamps: PathBuf,
    pub formatted: PathBuf,
}

/// Write both renderings as text files into `output_dir`.
pub async fn save_transcript(transcript: &Transcript, output_dir: &Path) -> Result<TranscriptFiles> {
    fs::create_dir_all(output_dir).await?;

    let timestamps = get_transcript_path(
        output_dir,
        Some(&transcript.video_id),
        &transcript.language,
        ArtifactKind::Timestamps,
    );
    let formatted = get_transcript_path(
        output_dir,
        Some(&transcript.video_id),
        &transcript.language,
        ArtifactKind::Formatted,
    );

    fs::write(&timestamps, &transcript.timestamped).await?;
    fs::write(&formatted, &transcript.paragraph).await?;

    Ok(TranscriptFiles {
        timestamps,
        formatted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        source::StagedCaptions,
        tokenizer::{RuleTokenizer, TokenizerResources},
        types::VideoId,
    };

    struct Canned(&'static str);

    #[async_trait::async_trait]
    impl CaptionSource for Canned {
        async fn fetch(&self, _video_id: &VideoId, _language: &str) -> Result<StagedCaptions> {
            Ok(StagedCaptions::in_memory(self.0))
        }
    }

    fn english() -> RuleTokenizer {
        RuleTokenizer::new(TokenizerResources::bundled("en").unwrap())
    }

    #[test]
    fn renders_both_views() {
        let markup = "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\n<c>Hello</c> world\n\n";
        let (timestamped, paragraph) =
            render_transcript(markup, &english(), &ParagraphConfig::default()).unwrap();
        assert_eq!(timestamped, "[00:00:01.000 --> 00:00:03.000]\nHello world");
        assert_eq!(paragraph, "Hello world");
    }

    #[test]
    fn header_only_markup_is_empty_content() {
        let err = render_transcript(
            "WEBVTT\nKind: captions\nLanguage: en\n\n",
            &english(),
            &ParagraphConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, TranscriptError::EmptyContent);
    }

    #[test]
    fn label_only_captions_keep_the_timestamped_view() {
        let markup = "00:00:01.000 --> 00:00:02.000\nSpeaker: hello\n";
        let (timestamped, paragraph) =
            render_transcript(markup, &english(), &ParagraphConfig::default()).unwrap();
        assert_eq!(timestamped, "[00:00:01.000 --> 00:00:02.000]\nSpeaker: hello");
        assert_eq!(paragraph, crate::paragraph::NOTHING_EXTRACTED_MESSAGE);
    }

    #[tokio::test]
    async fn language_must_match_the_tokenizer() {
        let pipeline = TranscriptPipeline::new(
            Box::new(Canned("00:00:01.000 --> 00:00:02.000\nHallo.\n")),
            Box::new(english()),
            ParagraphConfig::default(),
        );

        let err = pipeline
            .fetch_transcript("https://youtu.be/abc123", "de")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("'en', not 'de'"), "{err}");

        let transcript = pipeline
            .fetch_transcript("https://youtu.be/abc123", "en-US")
            .await
            .unwrap();
        assert_eq!(transcript.language, "en-US");
    }

    #[tokio::test]
    async fn pipeline_accepts_unstaged_captions() {
        let pipeline = TranscriptPipeline::new(
            Box::new(Canned("00:00:01.000 --> 00:00:02.000\nIt works. Really.\n")),
            Box::new(english()),
            ParagraphConfig::default(),
        );
        let transcript = pipeline
            .fetch_transcript("https://m.youtube.com/watch?v=abc123&t=10", "en")
            .await
            .unwrap();
        assert_eq!(transcript.video_id.as_str(), "abc123");
        assert_eq!(transcript.language, "en");
        assert_eq!(transcript.paragraph, "It works. Really.");
    }
}
