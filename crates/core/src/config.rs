use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{cache::get_root_data_dir, error::ConfigError, paragraph::ParagraphConfig};

/// Settings loaded from `config.toml`. Every field has a default, so an empty
/// or partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Caption language requested from the source.
    pub language: String,

    /// Directory the transcript text files are written to.
    pub output_dir: PathBuf,

    pub paragraphs: ParagraphConfig,
    pub retrieval: RetrievalConfig,
    pub tokenizer: TokenizerConfig,
    pub words: WordsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            output_dir: PathBuf::from("."),
            paragraphs: ParagraphConfig::default(),
            retrieval: RetrievalConfig::default(),
            tokenizer: TokenizerConfig::default(),
            words: WordsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Program invoked to download captions.
    pub program: String,

    /// Per-attempt limit in seconds.
    pub timeout_secs: u64,

    pub attempts: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            timeout_secs: 30,
            attempts: 2,
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Network stall limit handed to the program, half the per-attempt limit.
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs((self.timeout_secs / 2).max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Where abbreviation lists live. Defaults to the user data directory.
    pub resource_dir: Option<PathBuf>,
}

impl TokenizerConfig {
    pub fn resource_dir(&self) -> PathBuf {
        self.resource_dir
            .clone()
            .unwrap_or_else(|| get_root_data_dir().join("tokenizers"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordsConfig {
    pub max_words: usize,
    pub extra_stopwords: Vec<String>,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            max_words: 100,
            extra_stopwords: Vec::new(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("captext")
            .join("config.toml")
    }

    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &content)
    }

    /// Load an explicit path, or the default location when it exists, or defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
