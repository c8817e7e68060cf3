//! Note creation with optional model expansion and a generated title.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use defter_core::{defaults, Error, GenerationOptions, LanguageModel, Note, NoteStore, Result};

use crate::text::{before_ci, truncate_chars};

/// Characters trimmed from both ends of a generated title.
const TITLE_DECORATION: &[char] = &['"', '\'', '“', '”', '‘', '’', '«', '»', '`', '*', '_', '#'];

/// Decides when note content should be expanded by the model.
///
/// Fires when the lowercased content contains one of `hints` and one of `verbs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationTrigger {
    pub hints: Vec<String>,
    pub verbs: Vec<String>,
}

impl Default for AugmentationTrigger {
    fn default() -> Self {
        Self {
            hints: defaults::AUGMENT_HINTS.iter().map(|s| s.to_string()).collect(),
            verbs: defaults::AUGMENT_VERBS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AugmentationTrigger {
    /// The hint that triggered expansion, if any.
    pub fn matched_hint(&self, content: &str) -> Option<&str> {
        let lowered = content.to_lowercase();
        let has_verb = self
            .verbs
            .iter()
            .any(|v| lowered.contains(v.to_lowercase().as_str()));
        if !has_verb {
            return None;
        }
        self.hints
            .iter()
            .find(|h| lowered.contains(h.to_lowercase().as_str()))
            .map(String::as_str)
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self
            .hints
            .iter()
            .chain(self.verbs.iter())
            .any(|w| w.trim().is_empty())
        {
            return Err("augmentation hints and verbs must not be blank".to_string());
        }
        Ok(())
    }
}

/// Instruction asking the model to expand a topic request into a structured note.
pub fn expansion_prompt(content: &str, hint: &str) -> String {
    let topic = before_ci(content, &hint.to_lowercase())
        .unwrap_or(content)
        .trim();
    format!(
        "{content}

Lütfen bu bilgileri aşağıdaki formatta ver:

[BAŞLIK]
{topic} Hakkında Bilgiler

[İÇERİK]
• Maddeler halinde, detaylı ve bilgilendirici bilgiler
• Her madde en az 2-3 cümle içermeli
• Bilimsel ve doğru bilgiler kullan
• Türkçe karakterleri düzgün kullan
• Sonunda bir özet paragraf ekle"
    )
}

/// Instruction asking the model for a short title of `content`.
pub fn title_prompt(content: &str, source_chars: usize, max_chars: usize) -> String {
    format!(
        "Aşağıdaki içerik için {max_chars} karakterden kısa, açıklayıcı bir başlık oluştur.
Başlık konuyu tam olarak yansıtmalı.
Sadece başlığı yaz, başka bir şey ekleme.

İçerik:
{}...",
        truncate_chars(content, source_chars)
    )
}

/// Reduce a model reply to a usable title.
///
/// Keeps the first non-empty line, strips surrounding quotes and markdown,
/// and truncates to `max_chars` characters. `None` when nothing remains.
pub fn sanitize_title(raw: &str, max_chars: usize) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let cleaned = line
        .trim_matches(|c: char| TITLE_DECORATION.contains(&c) || c.is_whitespace());
    let title = truncate_chars(cleaned, max_chars).trim_end();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Creates notes from create-note commands.
pub struct NoteCreationAssistant {
    store: Arc<dyn NoteStore>,
    model: Arc<dyn LanguageModel>,
    trigger: AugmentationTrigger,
    expansion_options: GenerationOptions,
    title_options: GenerationOptions,
    title_max_chars: usize,
    title_source_chars: usize,
}

impl NoteCreationAssistant {
    pub fn new(store: Arc<dyn NoteStore>, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            store,
            model,
            trigger: AugmentationTrigger::default(),
            expansion_options: defaults::EXPANSION_GENERATION,
            title_options: defaults::TITLE_GENERATION,
            title_max_chars: defaults::TITLE_MAX_CHARS,
            title_source_chars: defaults::TITLE_SOURCE_CHARS,
        }
    }

    pub fn with_trigger(mut self, trigger: AugmentationTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Sampling for the expansion and title calls.
    pub fn with_options(mut self, expansion: GenerationOptions, title: GenerationOptions) -> Self {
        self.expansion_options = expansion;
        self.title_options = title;
        self
    }

    /// Create and persist a note from raw command content.
    ///
    /// Expansion runs only when the trigger fires. The title always comes from
    /// a second model call. Nothing is stored unless every model call succeeded;
    /// all failures surface as `NoteCreationFailed`.
    #[instrument(skip(self, raw), fields(subsystem = "chat", component = "assistant", op = "create_note"))]
    pub async fn create_note(&self, raw: &str) -> Result<Note> {
        let start = Instant::now();
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::NoteCreationFailed("note content is empty".to_string()));
        }

        let hint = self.trigger.matched_hint(raw);
        let content = match hint {
            Some(hint) => {
                debug!(hint, "Augmentation triggered, expanding content");
                let expanded = self
                    .model
                    .complete(&expansion_prompt(raw, hint), &self.expansion_options)
                    .await
                    .map_err(|e| Error::NoteCreationFailed(format!("expansion failed: {}", e)))?;
                let expanded = expanded.trim();
                if expanded.is_empty() {
                    return Err(Error::NoteCreationFailed(
                        "model returned empty expansion".to_string(),
                    ));
                }
                expanded.to_string()
            }
            None => raw.to_string(),
        };

        let reply = self
            .model
            .complete(
                &title_prompt(&content, self.title_source_chars, self.title_max_chars),
                &self.title_options,
            )
            .await
            .map_err(|e| Error::NoteCreationFailed(format!("title generation failed: {}", e)))?;
        let title = sanitize_title(&reply, self.title_max_chars)
            .ok_or_else(|| Error::NoteCreationFailed("model returned empty title".to_string()))?;

        let note = self
            .store
            .insert(&title, &content)
            .await
            .map_err(|e| Error::NoteCreationFailed(format!("store insert failed: {}", e)))?;

        info!(
            note_id = %note.id,
            augmented = hint.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Note created"
        );
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defter_db::MemoryNoteStore;
    use defter_inference::mock::MockLanguageModel;

    #[test]
    fn test_trigger_requires_hint_and_verb() {
        let trigger = AugmentationTrigger::default();
        assert_eq!(
            trigger.matched_hint("Kediler hakkında bir yazı yaz"),
            Some("hakkında")
        );
        assert_eq!(trigger.matched_hint("Kediler hakkında notlarım"), None);
        assert_eq!(trigger.matched_hint("bir yazı yaz"), None);
    }

    #[test]
    fn test_trigger_is_case_insensitive() {
        let trigger = AugmentationTrigger::default();
        assert!(trigger.matched_hint("Roma Hakkında bilgi OLUŞTUR").is_some());
    }

    #[test]
    fn test_expansion_prompt_heading_from_text_before_hint() {
        let prompt = expansion_prompt("Kara delikler hakkında bilgi yaz", "hakkında");
        assert!(prompt.starts_with("Kara delikler hakkında bilgi yaz\n\n"));
        assert!(prompt.contains("[BAŞLIK]\nKara delikler Hakkında Bilgiler\n"));
        assert!(prompt.contains("[İÇERİK]"));
        assert!(prompt.ends_with("Sonunda bir özet paragraf ekle"));
    }

    #[test]
    fn test_title_prompt_uses_first_chars() {
        let content = "a".repeat(600);
        let prompt = title_prompt(&content, 500, 50);
        assert!(prompt.contains(&format!("İçerik:\n{}...", "a".repeat(500))));
        assert!(!prompt.contains(&"a".repeat(501)));
        assert!(prompt.starts_with("Aşağıdaki içerik için 50 karakterden kısa"));
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(
            sanitize_title("\n  \"Alışveriş Listesi\"  \nek açıklama", 50).as_deref(),
            Some("Alışveriş Listesi")
        );
        assert_eq!(
            sanitize_title("**Toplantı Notları**", 50).as_deref(),
            Some("Toplantı Notları")
        );
        assert_eq!(sanitize_title("# Başlık", 50).as_deref(), Some("Başlık"));
        assert_eq!(sanitize_title("  \n\"\"\n", 50), None);
    }

    #[test]
    fn test_sanitize_title_truncates_in_characters() {
        let long = "ş".repeat(80);
        let title = sanitize_title(&long, 50).unwrap();
        assert_eq!(title.chars().count(), 50);
    }

    #[tokio::test]
    async fn test_plain_note_skips_expansion() {
        let store = Arc::new(MemoryNoteStore::new());
        let model = MockLanguageModel::new().with_fixed_response("Market Alışverişi");
        let assistant = NoteCreationAssistant::new(store.clone(), Arc::new(model.clone()));

        let note = assistant.create_note("süt, ekmek, yumurta").await.unwrap();

        assert_eq!(note.title, "Market Alışverişi");
        assert_eq!(note.content, "süt, ekmek, yumurta");
        let calls = model.get_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].input.contains("başlık oluştur"));
        assert_eq!(calls[0].options, defaults::TITLE_GENERATION);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_augmented_note_expands_then_titles() {
        let store = Arc::new(MemoryNoteStore::new());
        let model = MockLanguageModel::new()
            .with_response_mapping("Lütfen bu bilgileri", "• Kara delikler yoğundur.")
            .with_response_mapping("başlık oluştur", "Kara Delikler");
        let assistant = NoteCreationAssistant::new(store.clone(), Arc::new(model.clone()));

        let note = assistant
            .create_note("Kara delikler hakkında bilgi yaz")
            .await
            .unwrap();

        assert_eq!(note.title, "Kara Delikler");
        assert_eq!(note.content, "• Kara delikler yoğundur.");

        let calls = model.get_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].options, defaults::EXPANSION_GENERATION);
        assert!(calls[1].input.contains("• Kara delikler yoğundur."));
        assert_eq!(calls[1].options, defaults::TITLE_GENERATION);
    }

    #[tokio::test]
    async fn test_title_failure_persists_nothing() {
        let store = Arc::new(MemoryNoteStore::new());
        let model = MockLanguageModel::new().failing_complete();
        let assistant = NoteCreationAssistant::new(store.clone(), Arc::new(model));

        let err = assistant.create_note("süt al").await.unwrap_err();
        assert!(matches!(err, Error::NoteCreationFailed(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_expansion_persists_nothing() {
        let store = Arc::new(MemoryNoteStore::new());
        let model = MockLanguageModel::new()
            .with_response_mapping("Lütfen bu bilgileri", "   ")
            .with_fixed_response("Başlık");
        let assistant = NoteCreationAssistant::new(store.clone(), Arc::new(model.clone()));

        let err = assistant
            .create_note("Roma hakkında yazı yaz")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoteCreationFailed(_)));
        assert_eq!(model.complete_call_count(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_title_persists_nothing() {
        let store = Arc::new(MemoryNoteStore::new());
        let model = MockLanguageModel::new().with_fixed_response("\n\n");
        let assistant = NoteCreationAssistant::new(store.clone(), Arc::new(model));

        let err = assistant.create_note("süt al").await.unwrap_err();
        assert!(matches!(err, Error::NoteCreationFailed(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_custom_trigger() {
        let store = Arc::new(MemoryNoteStore::new());
        let model = MockLanguageModel::new().with_fixed_response("Title");
        let assistant = NoteCreationAssistant::new(store, Arc::new(model.clone()))
            .with_trigger(AugmentationTrigger {
                hints: vec!["about".to_string()],
                verbs: vec!["write".to_string()],
            });

        assistant.create_note("write about cats").await.unwrap();
        assert_eq!(model.complete_call_count(), 2);
    }
}
