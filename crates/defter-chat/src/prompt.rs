//! Grounding prompt composition for the query path.

use std::fmt::Write;
use tracing::{debug, warn};

use defter_core::{defaults, Note};

/// Sentence used in place of note transcripts when nothing matched.
pub const NO_MATCHING_NOTES: &str = "Aradığınız konuyla ilgili notlarda bir bilgi bulunamadı.";

/// Marker opening each note transcript.
pub const NOTE_BEGIN: &str = "--- Not Başlangıcı ---";

/// Marker closing each note transcript.
pub const NOTE_END: &str = "--- Not Sonu ---";

const PERSONA: &str =
    "Sen bir not asistanısın. Sana verilen notları analiz edip kullanıcının sorularını cevaplayacaksın.";

const RULES: &str = "ÖNEMLİ KURALLAR:
1. SADECE verilen notlardaki bilgileri kullan
2. Notlarda olmayan hiçbir bilgiyi uydurma
3. Eğer bir bilgi bulamazsan \"Notlarınızda bu konuda bir bilgi bulamadım\" de
4. Cevap verirken notlardaki bilgileri olduğu gibi kullan
5. Tarih ve saat bilgilerini dikkate al
6. Alışveriş ve market ile ilgili sorularda tüm notları dikkatlice kontrol et
7. Eğer bir notta alışveriş listesi varsa, içeriğini detaylı olarak paylaş
8. Yanıtını şu formatta ver:
   - Bulduğum notlar: [not başlıkları]
   - İlgili bilgiler: [notlardaki ilgili içerik]
   - Yanıtım: [net ve kısa cevap]";

/// Builds the system instruction that restricts the model to retrieved notes.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    soft_limit_chars: usize,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            soft_limit_chars: defaults::PROMPT_SOFT_LIMIT_CHARS,
        }
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts longer than this many characters are logged at WARN. Never truncated.
    pub fn with_soft_limit(mut self, chars: usize) -> Self {
        self.soft_limit_chars = chars;
        self
    }

    /// Compose the prompt: persona and question, keywords, rules, then notes.
    ///
    /// Deterministic for the same inputs. The keyword block is omitted when
    /// there are no keywords; with no notes the transcript section is replaced
    /// by [`NO_MATCHING_NOTES`].
    pub fn compose(&self, question: &str, keywords: &[String], notes: &[Note]) -> String {
        let mut prompt = String::new();

        // write! into a String cannot fail
        let _ = write!(prompt, "{}\n\nSORU: \"{}\"\n\n", PERSONA, question);

        if !keywords.is_empty() {
            let _ = write!(prompt, "ANAHTAR KELİMELER:\n{}\n\n", keywords.join("\n"));
        }

        prompt.push_str(RULES);

        if notes.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(NO_MATCHING_NOTES);
        } else {
            prompt.push_str("\n\nİLGİLİ NOTLARINIZ:\n");
            for note in notes {
                let _ = write!(
                    prompt,
                    "\n{}\nBaşlık: {}\nİçerik: {}\nTarih: {}\n{}\n",
                    NOTE_BEGIN,
                    note.title,
                    note.content,
                    note.created_at.format("%d.%m.%Y"),
                    NOTE_END
                );
            }
        }

        let chars = prompt.chars().count();
        debug!(
            subsystem = "chat",
            component = "prompt",
            keyword_count = keywords.len(),
            result_count = notes.len(),
            prompt_len = prompt.len(),
            "Prompt composed"
        );
        if chars > self.soft_limit_chars {
            warn!(
                subsystem = "chat",
                component = "prompt",
                prompt_chars = chars,
                soft_limit = self.soft_limit_chars,
                result_count = notes.len(),
                "Composed prompt exceeds soft limit"
            );
        }

        prompt
    }
}
