//! Top-level chat turn handling.
//!
//! ```text
//! Idle -> Classifying -> Creating                                     -> Idle
//!                     -> LastNoteLookup                               -> Idle
//!                     -> Extracting -> Filtering -> Composing -> Completing -> Idle
//! ```

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

use defter_core::{
    defaults, Command, Error, GenerationOptions, LanguageModel, Note, NoteStore, Result,
};
use defter_search::{
    filter_notes, AiKeywordExtractor, KeywordExtractor, KeywordPipeline, StopWordExtractor,
};

use crate::assistant::NoteCreationAssistant;
use crate::classifier::CommandClassifier;
use crate::config::ChatConfig;
use crate::prompt::PromptComposer;

/// Pipeline state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Classifying,
    Creating,
    LastNoteLookup,
    Extracting,
    Filtering,
    Composing,
    Completing,
}

impl ChatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Classifying => "classifying",
            Self::Creating => "creating",
            Self::LastNoteLookup => "last_note_lookup",
            Self::Extracting => "extracting",
            Self::Filtering => "filtering",
            Self::Composing => "composing",
            Self::Completing => "completing",
        }
    }
}

fn enter(state: ChatState) {
    debug!(state = state.as_str(), "State transition");
}

/// Reply shown for the most recent note.
pub fn last_note_reply(note: &Note) -> String {
    format!(
        "Son notunuz:\n\nBaşlık: {}\n\nİçerik:\n{}",
        note.title, note.content
    )
}

/// Entry point for chat messages.
///
/// Holds no per-turn state; concurrent turns share only the collaborators.
pub struct ChatOrchestrator {
    store: Arc<dyn NoteStore>,
    model: Arc<dyn LanguageModel>,
    classifier: CommandClassifier,
    assistant: NoteCreationAssistant,
    keywords: KeywordPipeline,
    composer: PromptComposer,
    chat_options: GenerationOptions,
}

impl ChatOrchestrator {
    /// Wire the pipeline from configuration.
    pub fn new(
        store: Arc<dyn NoteStore>,
        model: Arc<dyn LanguageModel>,
        config: &ChatConfig,
    ) -> Self {
        let stop_words = StopWordExtractor::new(&config.stop_words);
        let keywords = if config.ai_keywords {
            let ai = AiKeywordExtractor::new(Arc::clone(&model))
                .with_bounds(config.keyword_min, config.keyword_max)
                .with_options(config.generation.keyword);
            KeywordPipeline::new(Arc::new(ai), stop_words)
        } else {
            KeywordPipeline::stop_words_only(stop_words)
        };

        let assistant = NoteCreationAssistant::new(Arc::clone(&store), Arc::clone(&model))
            .with_trigger(config.augmentation.clone())
            .with_options(config.generation.expansion, config.generation.title);

        info!(
            subsystem = "chat",
            component = "orchestrator",
            model = %model.model_name(),
            ai_keywords = config.ai_keywords,
            "Chat orchestrator ready"
        );

        Self {
            store,
            model,
            classifier: CommandClassifier::new(
                &config.create_note_prefixes,
                &config.show_last_note_phrases,
            ),
            assistant,
            keywords,
            composer: PromptComposer::new().with_soft_limit(config.prompt_soft_limit),
            chat_options: config.generation.chat,
        }
    }

    /// Replace the primary keyword extractor, keeping the configured stop-word fallback.
    pub fn with_keyword_extractor(mut self, extractor: Arc<dyn KeywordExtractor>) -> Self {
        self.keywords = self.keywords.with_primary(extractor);
        self
    }

    /// Handle one message. Never fails: errors are logged and become the apology reply.
    pub async fn handle(&self, message: &str) -> String {
        match self.try_handle(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    subsystem = "chat",
                    component = "orchestrator",
                    error_kind = e.kind(),
                    error = %e,
                    "Chat turn failed"
                );
                enter(ChatState::Idle);
                defaults::APOLOGY_REPLY.to_string()
            }
        }
    }

    /// Handle one message, returning errors to the caller.
    #[instrument(skip(self, message), fields(subsystem = "chat", component = "orchestrator", op = "handle"))]
    pub async fn try_handle(&self, message: &str) -> Result<String> {
        let start = Instant::now();

        enter(ChatState::Classifying);
        let command = self.classifier.classify(message)?;
        debug!(command = command.label(), "Message classified");

        let reply = match command {
            Command::CreateNote(content) => {
                enter(ChatState::Creating);
                self.assistant.create_note(&content).await?;
                defaults::NOTE_CREATED_REPLY.to_string()
            }
            Command::ShowLastNote => {
                enter(ChatState::LastNoteLookup);
                match self.store.latest().await? {
                    Some(note) => last_note_reply(&note),
                    None => defaults::NO_NOTES_YET_REPLY.to_string(),
                }
            }
            Command::Query(text) => self.answer(&text).await?,
        };

        enter(ChatState::Idle);
        debug!(
            response_len = reply.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat turn complete"
        );
        Ok(reply)
    }

    async fn answer(&self, question: &str) -> Result<String> {
        enter(ChatState::Extracting);
        let keywords = self.keywords.extract(question).await;
        debug!(keyword_count = keywords.len(), "Keywords ready");

        enter(ChatState::Filtering);
        let notes = self.store.list().await.map_err(|e| match e {
            Error::StoreUnavailable(_) => e,
            other => Error::StoreUnavailable(other.to_string()),
        })?;
        let matched = filter_notes(&notes, &keywords);
        debug!(result_count = matched.len(), "Notes filtered");

        enter(ChatState::Composing);
        let prompt = self.composer.compose(question, &keywords, &matched);

        enter(ChatState::Completing);
        let mut session = self.model.start_session(&self.chat_options);
        // The first reply only acknowledges the instructions.
        session.send(&prompt).await?;
        session.send(question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use defter_db::MemoryNoteStore;
    use defter_inference::mock::MockLanguageModel;
    use uuid::Uuid;

    struct FailingStore;

    #[async_trait]
    impl NoteStore for FailingStore {
        async fn list(&self) -> Result<Vec<Note>> {
            Err(Error::StoreUnavailable("connection refused".to_string()))
        }
        async fn insert(&self, _title: &str, _content: &str) -> Result<Note> {
            Err(Error::StoreUnavailable("connection refused".to_string()))
        }
        async fn delete(&self, _id: Uuid) -> Result<()> {
            Err(Error::StoreUnavailable("connection refused".to_string()))
        }
        async fn latest(&self) -> Result<Option<Note>> {
            Err(Error::StoreUnavailable("connection refused".to_string()))
        }
    }

    fn orchestrator(store: Arc<dyn NoteStore>, model: &MockLanguageModel) -> ChatOrchestrator {
        ChatOrchestrator::new(store, Arc::new(model.clone()), &ChatConfig::default())
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ChatState::LastNoteLookup.as_str(), "last_note_lookup");
        assert_eq!(ChatState::Idle.as_str(), "idle");
    }

    #[test]
    fn test_last_note_reply_format() {
        let note = Note::new("Alışveriş", "süt\nekmek");
        assert_eq!(
            last_note_reply(&note),
            "Son notunuz:\n\nBaşlık: Alışveriş\n\nİçerik:\nsüt\nekmek"
        );
    }

    #[tokio::test]
    async fn test_show_last_note_when_empty() {
        let model = MockLanguageModel::new();
        let chat = orchestrator(Arc::new(MemoryNoteStore::new()), &model);

        assert_eq!(chat.handle("son notumu göster").await, defaults::NO_NOTES_YET_REPLY);
        assert!(model.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_command_becomes_apology() {
        let model = MockLanguageModel::new();
        let chat = orchestrator(Arc::new(MemoryNoteStore::new()), &model);

        assert!(matches!(
            chat.try_handle("not oluştur:").await,
            Err(Error::InvalidCommand(_))
        ));
        assert_eq!(chat.handle("not oluştur:").await, defaults::APOLOGY_REPLY);
        assert!(model.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_on_query_is_store_unavailable() {
        let model = MockLanguageModel::new().with_fixed_response("anahtar");
        let chat = orchestrator(Arc::new(FailingStore), &model);

        let err = chat.try_handle("market listem").await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert_eq!(model.send_call_count(), 0);
        assert_eq!(chat.handle("market listem").await, defaults::APOLOGY_REPLY);
    }

    #[tokio::test]
    async fn test_session_failure_becomes_apology() {
        let model = MockLanguageModel::new().failing_send();
        let chat = orchestrator(Arc::new(MemoryNoteStore::new()), &model);

        assert_eq!(chat.handle("toplantı ne zaman?").await, defaults::APOLOGY_REPLY);
    }

    struct FailingKeywords;

    #[async_trait]
    impl KeywordExtractor for FailingKeywords {
        async fn extract(&self, _query: &str) -> Result<Vec<String>> {
            Err(Error::ExtractionFailed("unavailable".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_replaced_extractor_falls_back_to_configured_stop_words() {
        let model = MockLanguageModel::new().with_echo();
        let config = ChatConfig {
            stop_words: vec!["proje".to_string()],
            ..ChatConfig::default()
        };
        let chat = ChatOrchestrator::new(
            Arc::new(MemoryNoteStore::new()),
            Arc::new(model.clone()),
            &config,
        )
        .with_keyword_extractor(Arc::new(FailingKeywords));

        chat.handle("proje takvimi").await;

        let calls = model.get_calls();
        assert_eq!(model.operations(), vec!["send", "send"]);
        assert!(calls[0].input.contains("ANAHTAR KELİMELER:\ntakvimi\n\n"));
    }

    #[tokio::test]
    async fn test_ai_keywords_disabled_skips_complete() {
        let model = MockLanguageModel::new().with_echo();
        let config = ChatConfig {
            ai_keywords: false,
            ..ChatConfig::default()
        };
        let chat = ChatOrchestrator::new(
            Arc::new(MemoryNoteStore::new()),
            Arc::new(model.clone()),
            &config,
        );

        let reply = chat.handle("toplantı ne zaman?").await;
        assert_eq!(reply, "toplantı ne zaman?");
        assert_eq!(model.operations(), vec!["send", "send"]);
    }
}
