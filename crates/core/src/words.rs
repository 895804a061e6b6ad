use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;

use crate::paragraph::NOTHING_EXTRACTED_MESSAGE;

/// NLTK's English stopword list.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w[\w']+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Words excluded from frequency counts, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    pub fn english() -> Self {
        Self(ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect())
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.0
            .extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }
}

/// Rank the most frequent non-stopwords in `text`.
///
/// Returns `None` when there is nothing worth showing: empty text, a formatter
/// message instead of a transcript, or only stopwords.
pub fn word_frequencies(
    text: &str,
    stopwords: &Stopwords,
    max_words: usize,
) -> Option<Vec<WordCount>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with("Error:") || text == NOTHING_EXTRACTED_MESSAGE {
        return None;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for m in WORD_RE.find_iter(text) {
        let word = m.as_str().to_lowercase();
        let word = word.strip_suffix("'s").unwrap_or(&word);
        if word.chars().all(|c| c.is_numeric()) || stopwords.contains(word) {
            continue;
        }
        *counts.entry(word.to_string()).or_default() += 1;
    }

    if counts.is_empty() {
        return None;
    }

    let mut ranked: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(max_words);
    Some(ranked)
}
