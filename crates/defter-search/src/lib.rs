//! # defter-search
//!
//! Keyword retrieval for the defter query path.
//!
//! This crate provides:
//! - Deterministic stop-word keyword extraction
//! - Keyword extraction through the language model
//! - A fallback combinator that never lets extraction fail a query
//! - Case-insensitive keyword inclusion filtering over notes
//!
//! ## Example
//!
//! ```ignore
//! use defter_search::{filter_notes, AiKeywordExtractor, KeywordPipeline, StopWordExtractor};
//!
//! let pipeline = KeywordPipeline::new(
//!     Arc::new(AiKeywordExtractor::new(model)),
//!     StopWordExtractor::default(),
//! );
//! let keywords = pipeline.extract("Marketten ne alacaktım?").await;
//! let matches = filter_notes(&store.list().await?, &keywords);
//! ```

pub mod ai_keywords;
pub mod fallback;
pub mod filter;
pub mod fold;
pub mod keywords;

// Re-export core types
pub use defter_core::*;

pub use ai_keywords::{keyword_prompt, parse_keyword_response, AiKeywordExtractor};
pub use fallback::{with_fallback, KeywordPipeline};
pub use filter::filter_notes;
pub use fold::fold_case;
pub use keywords::{extract_simple, KeywordExtractor, StopWordExtractor};
