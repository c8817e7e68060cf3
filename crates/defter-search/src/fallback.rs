//! Primary-then-fallback keyword extraction.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use defter_core::Result;

use crate::keywords::{KeywordExtractor, StopWordExtractor};

/// Await `primary`; on error log at WARN and use the deterministic extractor instead.
///
/// Never fails. An `Ok` result from `primary` is returned as-is.
pub async fn with_fallback<F>(primary: F, query: &str, fallback: &StopWordExtractor) -> Vec<String>
where
    F: Future<Output = Result<Vec<String>>>,
{
    match primary.await {
        Ok(keywords) => keywords,
        Err(e) => {
            let keywords = fallback.extract(query);
            warn!(
                subsystem = "search",
                component = "keywords",
                op = "fallback",
                error_kind = e.kind(),
                error = %e,
                keyword_count = keywords.len(),
                fallback = true,
                "Keyword extraction failed, using stop-word fallback"
            );
            keywords
        }
    }
}

/// Keyword stage of the query path.
///
/// Runs the primary extractor when one is configured and falls back to stop
/// words on failure; with no primary, only stop words are used.
pub struct KeywordPipeline {
    primary: Option<Arc<dyn KeywordExtractor>>,
    fallback: StopWordExtractor,
}

impl KeywordPipeline {
    /// Primary extractor with stop-word fallback.
    pub fn new(primary: Arc<dyn KeywordExtractor>, fallback: StopWordExtractor) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }

    /// Stop-word extraction only.
    pub fn stop_words_only(fallback: StopWordExtractor) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    /// Replace the primary extractor, keeping the current stop-word fallback.
    pub fn with_primary(mut self, primary: Arc<dyn KeywordExtractor>) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Extract keywords for a query. Never fails.
    pub async fn extract(&self, query: &str) -> Vec<String> {
        match &self.primary {
            Some(primary) => {
                debug!(
                    subsystem = "search",
                    component = "keywords",
                    extractor = primary.name(),
                    "Extracting keywords"
                );
                with_fallback(primary.extract(query), query, &self.fallback).await
            }
            None => {
                debug!(
                    subsystem = "search",
                    component = "keywords",
                    extractor = "stop_words",
                    "Primary keyword extractor disabled"
                );
                self.fallback.extract(query)
            }
        }
    }
}
