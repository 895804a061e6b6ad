//! Sentence boundary detection.
//!
//! Tokenizers need a per-language abbreviation list on disk. [`setup_tokenizer`]
//! is the one-time initialization step: it finds the list, installs a bundled one
//! when the language has one, or reports why no tokenizer is available.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::TranscriptError;

const RESOURCE_EXTENSION: &str = "abbrev";

const ENGLISH: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "co", "corp", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "mt", "fig", "approx", "dept", "est", "u.s", "u.k", "a.m", "p.m",
];
const GERMAN: &[&str] = &[
    "z.b", "d.h", "usw", "bzw", "ca", "dr", "nr", "str", "vgl", "u.a", "evtl", "ggf", "inkl",
];
const SPANISH: &[&str] = &[
    "sr", "sra", "srta", "dr", "dra", "ud", "uds", "etc", "p.ej", "pág", "núm", "aprox",
];
const FRENCH: &[&str] = &[
    "m", "mme", "mlle", "dr", "etc", "p.ex", "c.-à-d", "av", "bd", "env", "n°",
];
const PORTUGUESE: &[&str] = &[
    "sr", "sra", "dr", "dra", "etc", "p.ex", "pág", "núm", "av", "aprox",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("resource for '{language}' not found: {reason}")]
    ResourceMissing { language: String, reason: String },

    #[error("{reason}")]
    Internal { reason: String },
}

impl From<TokenizerError> for TranscriptError {
    fn from(err: TokenizerError) -> Self {
        match err {
            TokenizerError::ResourceMissing { language, reason } => {
                TranscriptError::TokenizerResourceMissing { language, reason }
            }
            TokenizerError::Internal { reason } => TranscriptError::TokenizerFailed { reason },
        }
    }
}

pub trait SentenceTokenizer: Send + Sync {
    fn language(&self) -> &str;

    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError>;
}

/// `en-US` and `EN` both resolve to `en`.
pub fn primary_language(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub struct TokenizerResources {
    language: String,
    abbreviations: HashSet<String>,
}

impl TokenizerResources {
    pub fn bundled(language: &str) -> Option<Self> {
        let language = primary_language(language);
        let list = match language.as_str() {
            "en" => ENGLISH,
            "de" => GERMAN,
            "es" => SPANISH,
            "fr" => FRENCH,
            "pt" => PORTUGUESE,
            _ => return None,
        };
        Some(Self {
            language,
            abbreviations: list.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn resource_path(resource_dir: &Path, language: &str) -> PathBuf {
        resource_dir.join(format!(
            "{}.{}",
            primary_language(language),
            RESOURCE_EXTENSION
        ))
    }

    /// Load the abbreviation list from `resource_dir`: one entry per line, `#` starts a comment.
    pub fn load(resource_dir: &Path, language: &str) -> Result<Self, TokenizerError> {
        let path = Self::resource_path(resource_dir, language);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TokenizerError::ResourceMissing {
                    language: primary_language(language),
                    reason: format!("{} does not exist", path.display()),
                });
            }
            Err(e) => {
                return Err(TokenizerError::Internal {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let abbreviations = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.trim_end_matches('.').to_lowercase())
            .collect();

        Ok(Self {
            language: primary_language(language),
            abbreviations,
        })
    }

    pub fn install(&self, resource_dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(resource_dir)?;
        let path = Self::resource_path(resource_dir, &self.language);
        let mut entries: Vec<&str> = self.abbreviations.iter().map(String::as_str).collect();
        entries.sort_unstable();
        fs::write(&path, entries.join("\n") + "\n")?;
        Ok(path)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word.to_lowercase())
    }
}

/// Punctuation-driven splitter that refuses to break after known abbreviations
/// and single-letter initials.
#[derive(Debug, Clone)]
pub struct RuleTokenizer {
    resources: TokenizerResources,
}

impl RuleTokenizer {
    pub fn new(resources: TokenizerResources) -> Self {
        Self { resources }
    }

    fn is_terminator(c: char) -> bool {
        matches!(c, '.' | '!' | '?' | '…')
    }

    fn is_closing(c: char) -> bool {
        matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '»')
    }

    /// True when the single period ending `preceding` belongs to an abbreviation or initial.
    fn ends_with_abbreviation(&self, preceding: &str) -> bool {
        let Some(word) = preceding.split_whitespace().last() else {
            return false;
        };
        let word = word.trim_start_matches(['(', '[', '"', '\'', '“', '‘', '«']);
        let mut chars = word.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_alphabetic() {
                return true;
            }
        }
        self.resources.is_abbreviation(word)
    }
}

impl SentenceTokenizer for RuleTokenizer {
    fn language(&self) -> &str {
        self.resources.language()
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let byte_at = |i: usize| chars.get(i).map(|(b, _)| *b).unwrap_or(text.len());

        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            if !Self::is_terminator(chars[i].1) {
                i += 1;
                continue;
            }

            let mut j = i;
            while j < chars.len() && Self::is_terminator(chars[j].1) {
                j += 1;
            }
            let single_period = j - i == 1 && chars[i].1 == '.';
            while j < chars.len() && Self::is_closing(chars[j].1) {
                j += 1;
            }

            let at_boundary = j == chars.len() || chars[j].1.is_whitespace();
            if at_boundary
                && !(single_period && self.ends_with_abbreviation(&text[start..byte_at(i)]))
            {
                let sentence = text[start..byte_at(j)].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = byte_at(j);
            }
            i = j;
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        Ok(sentences)
    }
}

/// Stand-in used when setup could not produce a tokenizer; every call reports why.
#[derive(Debug, Clone)]
pub struct UnavailableTokenizer {
    language: String,
    error: TokenizerError,
}

impl SentenceTokenizer for UnavailableTokenizer {
    fn language(&self) -> &str {
        &self.language
    }

    fn tokenize(&self, _text: &str) -> Result<Vec<String>, TokenizerError> {
        Err(self.error.clone())
    }
}

#[derive(Debug)]
pub enum SetupOutcome {
    /// Resources were already present.
    Ready(RuleTokenizer),
    /// Resources were missing and the bundled list was installed.
    Installed { tokenizer: RuleTokenizer, path: PathBuf },
    /// No resources exist for the language.
    Missing { language: String, reason: String },
    /// Resources exist but could not be used.
    Failed { language: String, reason: String },
}

impl SetupOutcome {
    pub fn is_usable(&self) -> bool {
        matches!(self, SetupOutcome::Ready(_) | SetupOutcome::Installed { .. })
    }

    pub fn into_tokenizer(self) -> Box<dyn SentenceTokenizer> {
        match self {
            SetupOutcome::Ready(tokenizer) | SetupOutcome::Installed { tokenizer, .. } => {
                Box::new(tokenizer)
            }
            SetupOutcome::Missing { language, reason } => Box::new(UnavailableTokenizer {
                language: language.clone(),
                error: TokenizerError::ResourceMissing { language, reason },
            }),
            SetupOutcome::Failed { language, reason } => Box::new(UnavailableTokenizer {
                language,
                error: TokenizerError::Internal { reason },
            }),
        }
    }
}

/// Locate or install the tokenizer resources for `language`. Run once at startup.
pub fn setup_tokenizer(resource_dir: &Path, language: &str) -> SetupOutcome {
    let language = primary_language(language);
    match TokenizerResources::load(resource_dir, &language) {
        Ok(resources) => {
            debug!("Loaded tokenizer resources for '{}'", language);
            SetupOutcome::Ready(RuleTokenizer::new(resources))
        }
        Err(TokenizerError::ResourceMissing { reason, .. }) => {
            let Some(bundled) = TokenizerResources::bundled(&language) else {
                warn!("No tokenizer resources for '{}': {}", language, reason);
                return SetupOutcome::Missing { language, reason };
            };
            match bundled.install(resource_dir) {
                Ok(path) => {
                    info!("Installed tokenizer resources to {}", path.display());
                    SetupOutcome::Installed {
                        tokenizer: RuleTokenizer::new(bundled),
                        path,
                    }
                }
                Err(e) => SetupOutcome::Failed {
                    language,
                    reason: format!(
                        "could not install resources into {}: {}",
                        resource_dir.display(),
                        e
                    ),
                },
            }
        }
        Err(TokenizerError::Internal { reason }) => SetupOutcome::Failed { language, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn english() -> RuleTokenizer {
        RuleTokenizer::new(TokenizerResources::bundled("en").unwrap())
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = english()
            .tokenize("Hello there. How are you? I am fine! Thanks")
            .unwrap();
        assert_eq!(
            sentences,
            vec!["Hello there.", "How are you?", "I am fine!", "Thanks"]
        );
    }

    #[test]
    fn keeps_abbreviations_and_initials_together() {
        let sentences = english()
            .tokenize("Dr. Smith met J. Doe at 3 p.m. yesterday. It went well.")
            .unwrap();
        assert_eq!(
            sentences,
            vec!["Dr. Smith met J. Doe at 3 p.m. yesterday.", "It went well."]
        );
    }

    #[test]
    fn decimals_and_closing_quotes() {
        let sentences = english()
            .tokenize("It costs 3.50 dollars. \"Really?\" she asked.")
            .unwrap();
        assert_eq!(
            sentences,
            vec!["It costs 3.50 dollars.", "\"Really?\"", "she asked."]
        );
    }

    #[test]
    fn unpunctuated_text_is_one_sentence() {
        let sentences = english()
            .tokenize("so today we are going to talk about rust and why it matters")
            .unwrap();
        assert_eq!(sentences.len(), 1);
        assert!(english().tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn language_codes_are_normalized() {
        assert_eq!(primary_language("en-US"), "en");
        assert_eq!(primary_language("PT_br"), "pt");
        assert!(TokenizerResources::bundled("en-GB").is_some());
        assert!(TokenizerResources::bundled("xx").is_none());
    }

    #[test]
    fn setup_installs_then_reuses_bundled_resources() {
        let dir = TempDir::new().unwrap();

        let first = setup_tokenizer(dir.path(), "en");
        let SetupOutcome::Installed { path, .. } = &first else {
            panic!("expected install, got {:?}", first);
        };
        assert!(path.exists());

        let second = setup_tokenizer(dir.path(), "en-US");
        assert!(matches!(second, SetupOutcome::Ready(_)));
        assert_eq!(second.into_tokenizer().language(), "en");
    }

    #[test]
    fn setup_reads_custom_resource_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            TokenizerResources::resource_path(dir.path(), "nl"),
            "# dutch\nbijv.\nenz\n",
        )
        .unwrap();

        let tokenizer = setup_tokenizer(dir.path(), "nl").into_tokenizer();
        let sentences = tokenizer.tokenize("Fruit, bijv. appels. Klaar.").unwrap();
        assert_eq!(sentences, vec!["Fruit, bijv. appels.", "Klaar."]);
    }

    #[test]
    fn missing_language_yields_resource_missing_error() {
        let dir = TempDir::new().unwrap();
        let outcome = setup_tokenizer(dir.path(), "xx");
        assert!(!outcome.is_usable());

        let err = outcome.into_tokenizer().tokenize("Some text.").unwrap_err();
        assert!(matches!(err, TokenizerError::ResourceMissing { .. }));
        let transcript_err: TranscriptError = err.into();
        assert_eq!(
            transcript_err.kind(),
            crate::error::ErrorKind::TokenizerResourceMissing
        );
    }

    #[test]
    fn unreadable_resource_yields_internal_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be cannot be read as text.
        fs::create_dir(TokenizerResources::resource_path(dir.path(), "en")).unwrap();

        let outcome = setup_tokenizer(dir.path(), "en");
        assert!(matches!(outcome, SetupOutcome::Failed { .. }));
        let err = outcome.into_tokenizer().tokenize("Text.").unwrap_err();
        assert!(matches!(err, TokenizerError::Internal { .. }));
    }
}
