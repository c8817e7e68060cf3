//! End-to-end chat pipeline tests against the in-memory store and mock model.

use std::sync::Arc;

use async_trait::async_trait;
use defter_chat::{
    defaults, last_note_reply, ChatConfig, ChatOrchestrator, Error, NoteStore, Result,
    NO_MATCHING_NOTES,
};
use defter_db::MemoryNoteStore;
use defter_inference::mock::MockLanguageModel;
use defter_search::KeywordExtractor;

struct FixedKeywords(Vec<&'static str>);

#[async_trait]
impl KeywordExtractor for FixedKeywords {
    async fn extract(&self, _query: &str) -> Result<Vec<String>> {
        Ok(self.0.iter().map(|k| k.to_string()).collect())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn chat_with(
    store: &Arc<MemoryNoteStore>,
    model: &MockLanguageModel,
    keywords: Option<Vec<&'static str>>,
) -> ChatOrchestrator {
    let config = ChatConfig::default();
    let chat = ChatOrchestrator::new(store.clone(), Arc::new(model.clone()), &config);
    match keywords {
        Some(k) => chat.with_keyword_extractor(Arc::new(FixedKeywords(k))),
        None => chat,
    }
}

async fn seeded_store() -> Arc<MemoryNoteStore> {
    let store = Arc::new(MemoryNoteStore::new());
    store
        .insert("Alışveriş Listesi", "süt, ekmek, yumurta")
        .await
        .unwrap();
    store
        .insert("Toplantı", "pazartesi saat 10:00 proje toplantısı")
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_shopping_question_is_grounded_in_matching_note() {
    let store = seeded_store().await;
    let model = MockLanguageModel::new().with_echo();
    let chat = chat_with(&store, &model, Some(vec!["alışveriş", "market"]));

    let reply = chat.handle("Marketten ne alacaktım?").await;
    assert_eq!(reply, "Marketten ne alacaktım?");

    let calls = model.get_calls();
    assert_eq!(model.operations(), vec!["send", "send"]);

    let prompt = &calls[0].input;
    assert!(prompt.starts_with("Sen bir not asistanısın."));
    assert!(prompt.contains("SORU: \"Marketten ne alacaktım?\""));
    assert!(prompt.contains("ANAHTAR KELİMELER:\nalışveriş\nmarket"));
    assert!(prompt.contains("Başlık: Alışveriş Listesi"));
    assert!(prompt.contains("İçerik: süt, ekmek, yumurta"));
    assert!(!prompt.contains("Toplantı"));

    assert_eq!(calls[1].input, "Marketten ne alacaktım?");
    assert_eq!(calls[0].options, defaults::CHAT_GENERATION);
    assert_eq!(calls[1].options, defaults::CHAT_GENERATION);
}

#[tokio::test]
async fn test_unmatched_question_uses_no_notes_sentence() {
    let store = seeded_store().await;
    let model = MockLanguageModel::new().with_echo();
    let chat = chat_with(&store, &model, Some(vec!["tatil"]));

    chat.handle("Tatil planım neydi?").await;

    let calls = model.get_calls();
    assert!(calls[0].input.contains(NO_MATCHING_NOTES));
    assert!(!calls[0].input.contains("İLGİLİ NOTLARINIZ"));
}

#[tokio::test]
async fn test_ai_keyword_failure_falls_back_to_stop_words() {
    let store = Arc::new(MemoryNoteStore::new());
    store.insert("Market", "süt, ekmek").await.unwrap();
    let model = MockLanguageModel::new().failing_complete().with_echo();
    let chat = chat_with(&store, &model, None);

    let reply = chat.handle("market listem nerede?").await;
    assert_eq!(reply, "market listem nerede?");
    assert_eq!(model.operations(), vec!["complete", "send", "send"]);

    let prompt = &model.get_calls()[1].input;
    assert!(prompt.contains("ANAHTAR KELİMELER:\nmarket\nlistem"));
    assert!(prompt.contains("Başlık: Market"));
}

#[tokio::test]
async fn test_ai_keywords_feed_filter() {
    let store = seeded_store().await;
    let model = MockLanguageModel::new()
        .with_response_mapping("anahtar kelime", "1. alışveriş\n2. süt")
        .with_echo();
    let chat = chat_with(&store, &model, None);

    chat.handle("Ne almam gerekiyordu?").await;

    let calls = model.get_calls();
    assert_eq!(calls[0].operation, "complete");
    assert_eq!(calls[0].options, defaults::KEYWORD_GENERATION);
    assert!(calls[1].input.contains("ANAHTAR KELİMELER:\nalışveriş\nsüt"));
    assert!(calls[1].input.contains("Başlık: Alışveriş Listesi"));
}

#[tokio::test]
async fn test_plain_note_creation_generates_title_only() {
    let store = Arc::new(MemoryNoteStore::new());
    let model = MockLanguageModel::new().with_fixed_response("Alışveriş Listesi");
    let chat = chat_with(&store, &model, None);

    let reply = chat.handle("not ekle: süt, ekmek, yumurta").await;
    assert_eq!(reply, defaults::NOTE_CREATED_REPLY);
    assert_eq!(model.operations(), vec!["complete"]);
    assert_eq!(model.get_calls()[0].options, defaults::TITLE_GENERATION);

    let notes = store.list().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Alışveriş Listesi");
    assert_eq!(notes[0].content, "süt, ekmek, yumurta");
}

#[tokio::test]
async fn test_topic_request_is_expanded_before_titling() {
    let store = Arc::new(MemoryNoteStore::new());
    let model = MockLanguageModel::new()
        .with_scripted_responses(["• Kara delikler çok yoğundur.", "\"Kara Delikler\""]);
    let chat = chat_with(&store, &model, None);

    let reply = chat
        .handle("not oluştur: Kara delikler hakkında bilgi yaz")
        .await;
    assert_eq!(reply, defaults::NOTE_CREATED_REPLY);

    let calls = model.get_calls();
    assert_eq!(model.operations(), vec!["complete", "complete"]);
    assert!(calls[0].input.contains("Kara delikler Hakkında Bilgiler"));
    assert_eq!(calls[0].options, defaults::EXPANSION_GENERATION);
    assert!(calls[1].input.contains("• Kara delikler çok yoğundur."));
    assert_eq!(calls[1].options, defaults::TITLE_GENERATION);

    let note = store.latest().await.unwrap().unwrap();
    assert_eq!(note.title, "Kara Delikler");
    assert_eq!(note.content, "• Kara delikler çok yoğundur.");
}

#[tokio::test]
async fn test_failed_creation_stores_nothing() {
    let store = Arc::new(MemoryNoteStore::new());
    let model = MockLanguageModel::new().failing_complete();
    let chat = chat_with(&store, &model, None);

    assert!(matches!(
        chat.try_handle("not ekle: süt al").await,
        Err(Error::NoteCreationFailed(_))
    ));
    assert_eq!(chat.handle("not ekle: süt al").await, defaults::APOLOGY_REPLY);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_empty_create_command_is_rejected() {
    let store = Arc::new(MemoryNoteStore::new());
    let model = MockLanguageModel::new();
    let chat = chat_with(&store, &model, None);

    assert!(matches!(
        chat.try_handle("not oluştur:").await,
        Err(Error::InvalidCommand(_))
    ));
    assert_eq!(chat.handle("not oluştur:   ").await, defaults::APOLOGY_REPLY);
    assert!(store.is_empty().await);
    assert!(model.get_calls().is_empty());
}

#[tokio::test]
async fn test_show_last_note_after_creation() {
    let store = Arc::new(MemoryNoteStore::new());
    let model = MockLanguageModel::new().with_scripted_responses(["Birinci", "İkinci"]);
    let chat = chat_with(&store, &model, None);

    assert_eq!(chat.handle("son notumu göster").await, defaults::NO_NOTES_YET_REPLY);

    chat.handle("not ekle: ilk içerik").await;
    chat.handle("not ekle: ikinci içerik").await;

    let latest = store.latest().await.unwrap().unwrap();
    assert_eq!(latest.title, "İkinci");
    assert_eq!(
        chat.handle("Son notumu göster lütfen").await,
        last_note_reply(&latest)
    );
    assert_eq!(model.complete_call_count(), 2);
}

#[tokio::test]
async fn test_created_note_is_found_by_later_question() {
    let store = Arc::new(MemoryNoteStore::new());
    let model = MockLanguageModel::new()
        .with_scripted_responses(["Veteriner Randevusu"])
        .with_echo();
    let chat = chat_with(&store, &model, Some(vec!["veteriner"]));

    chat.handle("not ekle: cuma 15:00 veteriner, kedi aşısı").await;
    chat.handle("Veteriner ne zaman?").await;

    let calls = model.get_calls();
    let prompt = &calls[calls.len() - 2].input;
    assert!(prompt.contains("Başlık: Veteriner Randevusu"));
    assert!(prompt.contains("İçerik: cuma 15:00 veteriner, kedi aşısı"));
}
