//! Command classification for incoming chat messages.

use tracing::debug;

use defter_core::{defaults, Command, Error, Result};

use crate::text::strip_prefix_ci;

/// Maps raw chat text to a [`Command`].
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    create_prefixes: Vec<String>,
    show_last_phrases: Vec<String>,
}

impl Default for CommandClassifier {
    fn default() -> Self {
        Self::new(defaults::CREATE_NOTE_PREFIXES, defaults::SHOW_LAST_NOTE_PHRASES)
    }
}

impl CommandClassifier {
    /// Create a classifier; prefixes and phrases are matched case-insensitively.
    pub fn new<P, S>(create_prefixes: &[P], show_last_phrases: &[S]) -> Self
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            create_prefixes: create_prefixes
                .iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
            show_last_phrases: show_last_phrases
                .iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Classify a message.
    ///
    /// Create-note prefixes are checked first and split by prefix length, so
    /// the content may itself contain `:`. A prefix with nothing after it is
    /// an `InvalidCommand`. Queries keep the original, untrimmed text.
    pub fn classify(&self, input: &str) -> Result<Command> {
        let trimmed = input.trim();

        for prefix in &self.create_prefixes {
            if let Some(rest) = strip_prefix_ci(trimmed, prefix) {
                let content = rest.trim();
                if content.is_empty() {
                    return Err(Error::InvalidCommand(format!(
                        "'{}' must be followed by note content",
                        prefix
                    )));
                }
                debug!(subsystem = "chat", component = "classifier", command = "create_note", "Classified message");
                return Ok(Command::CreateNote(content.to_string()));
            }
        }

        let lowered = trimmed.to_lowercase();
        if self
            .show_last_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
        {
            debug!(subsystem = "chat", component = "classifier", command = "show_last_note", "Classified message");
            return Ok(Command::ShowLastNote);
        }

        debug!(subsystem = "chat", component = "classifier", command = "query", "Classified message");
        Ok(Command::Query(input.to_string()))
    }
}
