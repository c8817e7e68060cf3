//! Keyword extraction through the language model.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, trace};

use defter_core::{defaults, Error, GenerationOptions, LanguageModel, Result};

use crate::fold::fold_case;
use crate::keywords::KeywordExtractor;

/// Build the keyword instruction for a query.
///
/// Asks for `min..=max` newline-separated keywords ordered by importance,
/// including synonyms and time/place/person descriptors where relevant.
pub fn keyword_prompt(query: &str, min: usize, max: usize) -> String {
    format!(
        "Aşağıdaki soruyla ilgili anahtar kelimeleri ve anlamsal olarak bağlantılı tüm kelimeleri bul.
Kelimeleri önem sırasına göre sırala.
Her kelime tek satırda olmalı.
Sadece kelimeleri listele, başka bir şey yazma.
Türkçe karakter kullanma.
En az {min}, en fazla {max} kelime olsun.
Eş anlamlı kelimeleri de ekle.
Zaman ve tarihle ilgili sorularda: gun, ay, yil, saat, dakika gibi zaman birimleri ekle.
Yer ve konumla ilgili sorularda: adres, semt, mahalle, cadde, sokak gibi konum birimleri ekle.
Kişilerle ilgili sorularda: isim, soyisim, unvan, rol gibi tanımlayıcılar ekle.

Soru: \"{query}\""
    )
}

/// Remove a leading bullet (`-`, `*`, `•`) or ordinal (`1. `, `2) `) marker.
///
/// An ordinal only counts as a marker when whitespace follows it.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();

    if let Some(rest) = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('•'))
    {
        return rest.trim_start();
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            // `2024.` and `1.5 litre` are keywords, not ordinals.
            if after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }

    line
}

/// Parse a newline-delimited model response into at most `max` keywords.
///
/// Lines are trimmed, list markers removed, case-folded; empty lines dropped.
pub fn parse_keyword_response(response: &str, max: usize) -> Vec<String> {
    response
        .lines()
        .map(strip_list_marker)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(fold_case)
        .take(max)
        .collect()
}

/// Keyword extractor backed by a language model call.
pub struct AiKeywordExtractor {
    model: Arc<dyn LanguageModel>,
    min_keywords: usize,
    max_keywords: usize,
    options: GenerationOptions,
}

impl AiKeywordExtractor {
    /// Create an extractor with the default keyword bounds and sampling.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            min_keywords: defaults::KEYWORD_MIN,
            max_keywords: defaults::KEYWORD_MAX,
            options: defaults::KEYWORD_GENERATION,
        }
    }

    /// Set the requested minimum and the enforced maximum keyword count.
    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_keywords = min;
        self.max_keywords = max;
        self
    }

    /// Override sampling options for the extraction call.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract keywords, failing with `ExtractionFailed` on any model error or empty output.
    #[instrument(skip(self, query), fields(subsystem = "search", component = "ai_keywords", op = "extract", model = %self.model.model_name()))]
    pub async fn extract_with_ai(&self, query: &str) -> Result<Vec<String>> {
        let start = Instant::now();
        let prompt = keyword_prompt(query, self.min_keywords, self.max_keywords);

        let response = self
            .model
            .complete(&prompt, &self.options)
            .await
            .map_err(|e| Error::ExtractionFailed(e.to_string()))?;

        let keywords = parse_keyword_response(&response, self.max_keywords);
        if keywords.is_empty() {
            return Err(Error::ExtractionFailed(
                "model returned no keywords".to_string(),
            ));
        }

        debug!(
            keyword_count = keywords.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "AI keywords extracted"
        );
        trace!(keywords = ?keywords, "AI keyword list");
        Ok(keywords)
    }
}

#[async_trait]
impl KeywordExtractor for AiKeywordExtractor {
    async fn extract(&self, query: &str) -> Result<Vec<String>> {
        self.extract_with_ai(query).await
    }

    fn name(&self) -> &'static str {
        "ai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defter_inference::mock::MockLanguageModel;

    #[test]
    fn test_prompt_embeds_query_and_bounds() {
        let prompt = keyword_prompt("Marketten ne alacaktım?", 20, 30);
        assert!(prompt.contains("Soru: \"Marketten ne alacaktım?\""));
        assert!(prompt.contains("En az 20, en fazla 30 kelime olsun."));
        assert!(prompt.contains("Her kelime tek satırda olmalı."));
    }

    #[test]
    fn test_parse_splits_lines_and_drops_blanks() {
        let keywords = parse_keyword_response("  market \n\nsut\n   \nekmek\n", 30);
        assert_eq!(keywords, vec!["market", "sut", "ekmek"]);
    }

    #[test]
    fn test_parse_strips_list_markers_and_lowercases() {
        let response = "- Market\n* Alisveris\n• Sut\n1. Ekmek\n2) Liste\n2024";
        let keywords = parse_keyword_response(response, 30);
        assert_eq!(
            keywords,
            vec!["market", "alisveris", "sut", "ekmek", "liste", "2024"]
        );
    }

    #[test]
    fn test_parse_truncates_to_max() {
        let response = (1..=40)
            .map(|i| format!("kelime{}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let keywords = parse_keyword_response(&response, 30);
        assert_eq!(keywords.len(), 30);
        assert_eq!(keywords[0], "kelime1");
        assert_eq!(keywords[29], "kelime30");
    }

    #[test]
    fn test_bare_marker_line_is_dropped() {
        assert!(parse_keyword_response("-\n•\n*", 30).is_empty());
    }

    #[test]
    fn test_numeric_keywords_are_not_ordinals() {
        let keywords = parse_keyword_response("2024.\n1.5 litre\n3) 10:30\n12.Mayıs", 30);
        assert_eq!(keywords, vec!["2024.", "1.5 litre", "10:30", "12.mayıs"]);
    }

    #[tokio::test]
    async fn test_extract_with_ai_uses_keyword_sampling() {
        let model = MockLanguageModel::new().with_fixed_response("market\nsut");
        let extractor = AiKeywordExtractor::new(Arc::new(model.clone()));

        let keywords = extractor.extract_with_ai("süt aldım mı?").await.unwrap();
        assert_eq!(keywords, vec!["market", "sut"]);

        let calls = model.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "complete");
        assert!(calls[0].input.contains("Soru: \"süt aldım mı?\""));
        assert_eq!(calls[0].options, defaults::KEYWORD_GENERATION);
    }

    #[tokio::test]
    async fn test_model_failure_is_extraction_failed() {
        let model = MockLanguageModel::new().failing_complete();
        let extractor = AiKeywordExtractor::new(Arc::new(model));

        let err = extractor.extract_with_ai("soru").await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_response_is_extraction_failed() {
        let model = MockLanguageModel::new().with_fixed_response("  \n\n");
        let extractor = AiKeywordExtractor::new(Arc::new(model));

        let err = extractor.extract_with_ai("soru").await.unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_custom_bounds_shape_prompt_and_truncation() {
        let model = MockLanguageModel::new().with_fixed_response("a1\nb2\nc3\nd4");
        let extractor = AiKeywordExtractor::new(Arc::new(model.clone())).with_bounds(2, 3);

        let keywords = extractor.extract_with_ai("soru").await.unwrap();
        assert_eq!(keywords, vec!["a1", "b2", "c3"]);
        assert!(model.get_calls()[0].input.contains("En az 2, en fazla 3"));
    }
}
