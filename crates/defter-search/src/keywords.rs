//! Deterministic stop-word keyword extraction.
//!
//! The fallback when AI extraction fails or is disabled. Pure and infallible:
//! the same query always yields the same keywords, in query order.

use async_trait::async_trait;
use std::collections::HashSet;

use defter_core::{defaults, Result};

use crate::fold::fold_case;

/// Source of query keywords.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Extract an ordered, most-relevant-first keyword list for a query.
    async fn extract(&self, query: &str) -> Result<Vec<String>>;

    /// Short label used in log fields.
    fn name(&self) -> &'static str;
}

/// Tokenizer plus stop-word filter.
#[derive(Debug, Clone)]
pub struct StopWordExtractor {
    stop_words: HashSet<String>,
    min_token_chars: usize,
}

impl Default for StopWordExtractor {
    fn default() -> Self {
        Self::new(defaults::STOP_WORDS.iter().copied())
    }
}

impl StopWordExtractor {
    /// Create an extractor with a custom stop-word list.
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| fold_case(w.as_ref()))
                .collect(),
            min_token_chars: defaults::MIN_TOKEN_CHARS,
        }
    }

    /// Tokens with at most this many characters are dropped.
    pub fn with_min_token_chars(mut self, chars: usize) -> Self {
        self.min_token_chars = chars;
        self
    }

    /// Lowercase, strip `.,?!`, split on whitespace, drop short tokens and stop words.
    ///
    /// Order is preserved and duplicates are kept.
    pub fn extract(&self, query: &str) -> Vec<String> {
        let cleaned: String = fold_case(query)
            .chars()
            .filter(|c| !defaults::STRIP_PUNCTUATION.contains(c))
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| token.chars().count() > self.min_token_chars)
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl KeywordExtractor for StopWordExtractor {
    async fn extract(&self, query: &str) -> Result<Vec<String>> {
        Ok(StopWordExtractor::extract(self, query))
    }

    fn name(&self) -> &'static str {
        "stop_words"
    }
}

/// Extract keywords with the default Turkish stop-word list.
pub fn extract_simple(query: &str) -> Vec<String> {
    StopWordExtractor::default().extract(query)
}
