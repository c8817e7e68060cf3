//! Centralized default constants for defter.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration types in the other crates start from these constants and let
//! files or environment variables override them.

use crate::models::GenerationOptions;

// =============================================================================
// COMMANDS
// =============================================================================

/// Prefixes that turn a message into a create-note command. Compared
/// case-insensitively against the trimmed message; each ends with `:`.
pub const CREATE_NOTE_PREFIXES: &[&str] = &["not oluştur:", "not ekle:"];

/// Phrases that request the most recent note, matched anywhere in the message.
pub const SHOW_LAST_NOTE_PHRASES: &[&str] = &["son notumu göster"];

// =============================================================================
// KEYWORD EXTRACTION
// =============================================================================

/// Turkish stop words dropped by the deterministic extractor.
pub const STOP_WORDS: &[&str] = &[
    "var", "yok", "mi", "ne", "nedir", "nasıl", "nerede", "hangi", "bir", "ve", "veya", "ile",
    "için", "gibi", "de", "da", "ki", "bu", "şu", "o", "ben", "sen", "biz", "siz", "onlar",
];

/// Punctuation stripped from queries before tokenizing.
pub const STRIP_PUNCTUATION: &[char] = &['.', ',', '?', '!'];

/// Tokens with this many characters or fewer are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Minimum number of keywords requested from the model.
pub const KEYWORD_MIN: usize = 20;

/// Maximum number of keywords kept from the model response.
pub const KEYWORD_MAX: usize = 30;

// =============================================================================
// NOTE CREATION
// =============================================================================

/// Domain hints that, together with an action verb, trigger content expansion.
pub const AUGMENT_HINTS: &[&str] = &["hakkında"];

/// Action verbs that, together with a domain hint, trigger content expansion.
pub const AUGMENT_VERBS: &[&str] = &["oluştur", "yaz", "anlat"];

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// Number of content characters shown to the model when generating a title.
pub const TITLE_SOURCE_CHARS: usize = 500;

// =============================================================================
// PROMPT COMPOSITION
// =============================================================================

/// Composed prompts longer than this (in characters) are logged as oversized.
pub const PROMPT_SOFT_LIMIT_CHARS: usize = 100_000;

// =============================================================================
// REPLIES
// =============================================================================

/// Reply returned whenever a chat turn fails.
pub const APOLOGY_REPLY: &str = "Üzgünüm, bir hata oluştu. Lütfen tekrar deneyin.";

/// Reply returned after a note was created.
pub const NOTE_CREATED_REPLY: &str =
    "Not başarıyla oluşturuldu! İçeriği görmek için \"son notumu göster\" yazabilirsiniz.";

/// Reply returned when the last note is requested but none exist.
pub const NO_NOTES_YET_REPLY: &str = "Henüz hiç not oluşturmamışsınız.";

// =============================================================================
// GENERATION PRESETS
// =============================================================================

/// Sampling for keyword extraction.
pub const KEYWORD_GENERATION: GenerationOptions = GenerationOptions {
    temperature: Some(0.4),
    top_p: None,
    top_k: None,
    max_output_tokens: Some(1000),
};

/// Sampling for note content expansion.
pub const EXPANSION_GENERATION: GenerationOptions = GenerationOptions {
    temperature: Some(0.9),
    top_p: Some(0.95),
    top_k: Some(40),
    max_output_tokens: Some(8192),
};

/// Sampling for note title generation.
pub const TITLE_GENERATION: GenerationOptions = GenerationOptions {
    temperature: Some(0.7),
    top_p: None,
    top_k: None,
    max_output_tokens: Some(100),
};

/// Sampling for the grounded chat answer.
pub const CHAT_GENERATION: GenerationOptions = GenerationOptions {
    temperature: Some(0.7),
    top_p: Some(0.95),
    top_k: Some(40),
    max_output_tokens: Some(8192),
};

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini API base URL.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model name (Ollama).
pub const OLLAMA_MODEL: &str = "gpt-oss:20b";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Generation calls slower than this are logged as slow.
pub const SLOW_GENERATION_MS: u64 = 30_000;
