use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{error::TranscriptError, types::Transcript, types::VideoId};

pub fn get_root_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("captext")
}

/// Which rendering a text artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Timestamps,
    Formatted,
}

impl ArtifactKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Timestamps => "timestamps",
            ArtifactKind::Formatted => "formatted",
        }
    }
}

/// Get the path for a transcript text file (video and language aware)
pub fn get_transcript_path(
    output_dir: &Path,
    video_id: Option<&VideoId>,
    language: &str,
    kind: ArtifactKind,
) -> PathBuf {
    let file_name = match video_id {
        Some(id) => format!("{}_transcript_{}_{}.txt", id, language, kind.suffix()),
        None => format!("transcript_{}.txt", kind.suffix()),
    };
    output_dir.join(file_name)
}

/// Base name the caption source uses for staged subtitle files.
pub fn get_staging_base_name(video_id: &VideoId, language: &str) -> String {
    format!("{}_transcript_{}", video_id, language)
}

/// Remembers the outcome for the most recently submitted URL and language.
///
/// Submitting anything else replaces the entry.
#[derive(Debug, Default)]
pub struct ResultCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    url: String,
    language: String,
    result: Result<Transcript, TranscriptError>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str, language: &str) -> Option<&Result<Transcript, TranscriptError>> {
        let entry = self.entry.as_ref()?;
        if entry.url == url && entry.language == language {
            debug!("Result cache hit for {}", url);
            Some(&entry.result)
        } else {
            None
        }
    }

    pub fn store(
        &mut self,
        url: &str,
        language: &str,
        result: Result<Transcript, TranscriptError>,
    ) -> &Result<Transcript, TranscriptError> {
        let entry = self.entry.insert(CacheEntry {
            url: url.to_string(),
            language: language.to_string(),
            result,
        });
        &entry.result
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn last_url(&self) -> Option<&str> {
        self.entry.as_ref().map(|entry| entry.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_id::extract_video_id;

    fn transcript(id: &str) -> Transcript {
        Transcript {
            video_id: extract_video_id(&format!("https://youtu.be/{id}")).unwrap(),
            language: "en".into(),
            timestamped: "[a --> b]\nhi".into(),
            paragraph: "hi".into(),
        }
    }

    #[test]
    fn transcript_paths_follow_naming_scheme() {
        let id = extract_video_id("https://youtu.be/abc123").unwrap();
        let dir = Path::new("/out");
        assert_eq!(
            get_transcript_path(dir, Some(&id), "en", ArtifactKind::Timestamps),
            PathBuf::from("/out/abc123_transcript_en_timestamps.txt")
        );
        assert_eq!(
            get_transcript_path(dir, Some(&id), "de", ArtifactKind::Formatted),
            PathBuf::from("/out/abc123_transcript_de_formatted.txt")
        );
        assert_eq!(
            get_transcript_path(dir, None, "en", ArtifactKind::Formatted),
            PathBuf::from("/out/transcript_formatted.txt")
        );
        assert_eq!(get_staging_base_name(&id, "en"), "abc123_transcript_en");
    }

    #[test]
    fn cache_hits_only_for_same_url_and_language() {
        let mut cache = ResultCache::new();
        let url = "https://youtu.be/abc";
        assert!(cache.get(url, "en").is_none());

        cache.store(url, "en", Ok(transcript("abc")));
        assert!(matches!(cache.get(url, "en"), Some(Ok(_))));
        assert!(cache.get(url, "de").is_none());
        assert!(cache.get("https://youtu.be/other", "en").is_none());
        assert_eq!(cache.last_url(), Some(url));
    }

    #[test]
    fn new_url_replaces_entry_and_errors_are_cached() {
        let mut cache = ResultCache::new();
        cache.store("https://youtu.be/abc", "en", Ok(transcript("abc")));
        cache.store("https://youtu.be/xyz", "en", Err(TranscriptError::VideoUnavailable));

        assert!(cache.get("https://youtu.be/abc", "en").is_none());
        assert_eq!(
            cache.get("https://youtu.be/xyz", "en"),
            Some(&Err(TranscriptError::VideoUnavailable))
        );

        cache.invalidate();
        assert!(cache.get("https://youtu.be/xyz", "en").is_none());
        assert_eq!(cache.last_url(), None);
    }
}
