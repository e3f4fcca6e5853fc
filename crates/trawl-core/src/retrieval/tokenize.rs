//! Query/document tokenization for the sparse index.
//!
//! Tokens are lowercased, filtered to purely alphabetic terms, and stripped
//! of stop words. The word splitter itself is pluggable; when the primary
//! splitter reports itself unavailable the index falls back to naive
//! whitespace splitting with the same filters.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Default English stop words, mirroring the usual corpus lists.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "all", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being",
        "below", "between", "both", "but", "by", "can", "could", "did", "do",
        "does", "doing", "down", "during", "each", "few", "for", "from",
        "further", "had", "has", "have", "having", "he", "her", "here",
        "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it",
        "its", "just", "me", "more", "most", "my", "no", "nor", "not", "now",
        "of", "off", "on", "once", "only", "or", "other", "our", "out",
        "over", "own", "same", "she", "should", "so", "some", "such", "than",
        "that", "the", "their", "them", "then", "there", "these", "they",
        "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which",
        "while", "who", "whom", "why", "will", "with", "would", "you",
        "your", "yours",
    ]
    .into_iter()
    .collect()
});

/// Word splitter used ahead of the shared lowercase/alpha/stop-word filters.
pub trait Tokenizer: Send + Sync {
    /// Whether this splitter can run at all (e.g., its model or data files
    /// are present). Checked before use instead of catching a failure
    /// mid-split.
    fn is_available(&self) -> bool {
        true
    }

    /// Split raw text into word candidates. Filtering happens downstream.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Default splitter: breaks on any non-alphanumeric character, which
/// separates punctuation from words the way a word tokenizer would.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn split(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }
}

/// Fallback splitter: naive whitespace splitting.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn split(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(|t| t.to_string()).collect()
    }
}

/// Tokenization pipeline: pluggable splitter plus the shared filters.
pub struct TokenPipeline {
    primary: Box<dyn Tokenizer>,
    fallback: WhitespaceTokenizer,
    stop_words: HashSet<String>,
}

impl TokenPipeline {
    pub fn new(primary: Box<dyn Tokenizer>) -> Self {
        Self {
            primary,
            fallback: WhitespaceTokenizer,
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Replace the stop-word set.
    pub fn with_stop_words(mut self, stop_words: HashSet<String>) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Tokenize `text`: split, lowercase, keep purely alphabetic terms,
    /// drop stop words.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let raw = if self.primary.is_available() {
            self.primary.split(text)
        } else {
            self.fallback.split(text)
        };

        raw.into_iter()
            .filter(|t| t.chars().all(|c| c.is_alphabetic()))
            .map(|t| t.to_lowercase())
            .filter(|t| !self.stop_words.contains(t))
            .collect()
    }
}

impl Default for TokenPipeline {
    fn default() -> Self {
        Self::new(Box::new(WordTokenizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnavailableTokenizer;
    impl Tokenizer for UnavailableTokenizer {
        fn is_available(&self) -> bool {
            false
        }
        fn split(&self, _text: &str) -> Vec<String> {
            unreachable!("must not be called when unavailable")
        }
    }

    #[test]
    fn test_lowercase_and_stop_word_removal() {
        let pipeline = TokenPipeline::default();
        let tokens = pipeline.tokenize("The Quick Brown Fox and the lazy dog");
        assert_eq!(tokens, vec!["quick", "brown", "fox", "lazy", "dog"]);
    }

    #[test]
    fn test_non_alphabetic_tokens_dropped() {
        let pipeline = TokenPipeline::default();
        let tokens = pipeline.tokenize("rust 2024 version-1 async/await!");
        // "2024" is numeric; hyphen/slash splits leave alphabetic parts
        assert_eq!(tokens, vec!["rust", "version", "async", "await"]);
    }

    #[test]
    fn test_fallback_when_primary_unavailable() {
        let pipeline = TokenPipeline::new(Box::new(UnavailableTokenizer));
        let tokens = pipeline.tokenize("simple whitespace split");
        assert_eq!(tokens, vec!["simple", "whitespace", "split"]);
    }

    #[test]
    fn test_custom_stop_words() {
        let stops: HashSet<String> = ["rust".to_string()].into_iter().collect();
        let pipeline = TokenPipeline::default().with_stop_words(stops);
        let tokens = pipeline.tokenize("the rust index");
        assert_eq!(tokens, vec!["the", "index"]);
    }

    #[test]
    fn test_empty_input() {
        let pipeline = TokenPipeline::default();
        assert!(pipeline.tokenize("").is_empty());
        assert!(pipeline.tokenize("  \t\n").is_empty());
    }
}
