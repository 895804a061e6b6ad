//! Caption retrieval.
//!
//! A [`CaptionSource`] hands back the raw WebVTT markup together with whatever it
//! staged on disk to get it. The staging directory lives exactly as long as the
//! [`StagedCaptions`] value.

use std::{
    io,
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::{fs, process::Command};
use tracing::{debug, info, warn};

use crate::{
    cache::get_staging_base_name,
    config::RetrievalConfig,
    error::{Result, TranscriptError},
    types::VideoId,
};

#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> Result<StagedCaptions>;
}

/// Caption markup plus the temporary directory it was staged in, if any.
#[derive(Debug)]
pub struct StagedCaptions {
    markup: String,
    path: Option<PathBuf>,
    staging: Option<TempDir>,
}

impl StagedCaptions {
    pub fn in_memory(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            path: None,
            staging: None,
        }
    }

    pub fn staged(markup: impl Into<String>, path: PathBuf, staging: TempDir) -> Self {
        Self {
            markup: markup.into(),
            path: Some(path),
            staging: Some(staging),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Location of the staged subtitle file while it still exists.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Remove the staging directory now. Dropping does the same, silently.
    pub fn cleanup(mut self) {
        if let Some(staging) = self.staging.take() {
            let dir = staging.path().to_path_buf();
            match staging.close() {
                Ok(()) => debug!("Removed staging directory {}", dir.display()),
                Err(e) => warn!("Could not delete staging directory {}: {}", dir.display(), e),
            }
        }
    }
}

const NO_CAPTION_MARKERS: [&str; 5] = [
    "no automatic captions found",
    "no subtitles found",
    "there's no subtitles",
    "there are no subtitles",
    "has no automatic captions",
];

/// Map yt-dlp diagnostics to a transcript error.
pub fn classify_failure(diagnostics: &str, language: &str) -> TranscriptError {
    let lower = diagnostics.to_lowercase();
    if NO_CAPTION_MARKERS.iter().any(|marker| lower.contains(marker)) {
        TranscriptError::NoCaptions {
            language: language.to_string(),
        }
    } else if lower.contains("video unavailable") {
        TranscriptError::VideoUnavailable
    } else if lower.contains("unable to download video data") {
        TranscriptError::RetrievalFailed {
            reason: "could not download video metadata".to_string(),
        }
    } else {
        let detail = diagnostics
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("unknown error");
        TranscriptError::RetrievalFailed {
            reason: format!("error during download/extraction (yt-dlp): {}", detail),
        }
    }
}

/// Find the subtitle file yt-dlp wrote for `base_name`, if any.
pub fn locate_subtitle_file(dir: &Path, base_name: &str, language: &str) -> Option<PathBuf> {
    [
        format!("{}.{}.vtt", base_name, language),
        format!("{}.vtt", base_name),
    ]
    .into_iter()
    .map(|name| dir.join(name))
    .find(|path| path.exists())
}

fn is_retryable(err: &TranscriptError) -> bool {
    matches!(err, TranscriptError::RetrievalFailed { .. })
}

/// Fetches auto-generated captions by running `yt-dlp`.
#[derive(Debug, Clone)]
pub struct YtDlpSource {
    program: String,
    timeout: Duration,
    socket_timeout: Duration,
    attempts: u32,
    staging_root: Option<PathBuf>,
}

impl YtDlpSource {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout(),
            socket_timeout: config.socket_timeout(),
            attempts: config.attempts.max(1),
            staging_root: None,
        }
    }

    /// Stage files under `dir` instead of the system temp directory.
    pub fn with_staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(dir.into());
        self
    }

    fn staging_dir(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("captext-");
        match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    fn command(&self, video_id: &VideoId, language: &str, output_base: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--skip-download")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg(language)
            .arg("--sub-format")
            .arg("vtt")
            .arg("--no-playlist")
            .arg("--no-progress")
            .arg("--socket-timeout")
            .arg(self.socket_timeout.as_secs().to_string())
            // attempts are counted by the caller
            .arg("--retries")
            .arg("0")
            .arg("-o")
            .arg(output_base)
            .arg(video_id.watch_url())
            .kill_on_drop(true);
        command
    }

    async fn run_once(
        &self,
        video_id: &VideoId,
        language: &str,
        output_base: &Path,
    ) -> Result<Output> {
        let output = tokio::time::timeout(
            self.timeout,
            self.command(video_id, language, output_base).output(),
        )
        .await
        .map_err(|_| TranscriptError::RetrievalFailed {
            reason: format!("{} timed out after {}s", self.program, self.timeout.as_secs()),
        })?;

        output.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TranscriptError::RetrievalFailed {
                reason: format!("'{}' not found; install it and make sure it is on PATH", self.program),
            },
            _ => e.into(),
        })
    }
}

#[async_trait]
impl CaptionSource for YtDlpSource {
    async fn fetch(&self, video_id: &VideoId, language: &str) -> Result<StagedCaptions> {
        let staging = self.staging_dir()?;
        let base_name = get_staging_base_name(video_id, language);
        let output_base = staging.path().join(&base_name);

        let mut attempt = 0;
        let output = loop {
            attempt += 1;
            info!(
                "Downloading subtitles ({}) for {} [attempt {}/{}]",
                language, video_id, attempt, self.attempts
            );

            let result = match self.run_once(video_id, language, &output_base).await {
                Ok(output) if output.status.success() => Ok(output),
                Ok(output) => Err(classify_failure(
                    &String::from_utf8_lossy(&output.stderr),
                    language,
                )),
                Err(e) => Err(e),
            };

            match result {
                Ok(output) => break output,
                Err(e) if is_retryable(&e) && attempt < self.attempts => {
                    warn!("Caption retrieval attempt {} failed: {}", attempt, e);
                }
                Err(e) => return Err(e),
            }
        };

        let Some(path) = locate_subtitle_file(staging.path(), &base_name, language) else {
            let diagnostics = format!(
                "{}\n{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(match classify_failure(&diagnostics, language) {
                TranscriptError::NoCaptions { language } => TranscriptError::NoCaptions { language },
                _ => TranscriptError::RetrievalFailed {
                    reason: "subtitle file not created by yt-dlp".to_string(),
                },
            });
        };

        debug!("Reading staged subtitles from {}", path.display());
        let markup = fs::read_to_string(&path).await?;
        Ok(StagedCaptions::staged(markup, path, staging))
    }
}
