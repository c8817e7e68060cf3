//! Core traits for defter abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and test doubles.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ChatTurn, GenerationOptions, Note};

// =============================================================================
// NOTE STORE TRAITS
// =============================================================================

/// Persistence boundary for notes.
///
/// Implementations must report failures as errors, distinct from empty
/// results: an empty store lists as `Ok(vec![])` and has `Ok(None)` as latest.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List all notes, newest first.
    async fn list(&self) -> Result<Vec<Note>>;

    /// Insert a note, assigning its id and creation timestamp.
    async fn insert(&self, title: &str, content: &str) -> Result<Note>;

    /// Permanently delete a note.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Fetch the most recently created note, if any.
    async fn latest(&self) -> Result<Option<Note>>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Stateful conversation with a language model.
///
/// Each `send` appends the user turn and the model reply to the history, so
/// later turns are answered with earlier ones as context. Sends on one session
/// must be issued sequentially.
#[async_trait]
pub trait ChatSession: Send {
    /// Send a user turn and return the model reply.
    async fn send(&mut self, text: &str) -> Result<String>;

    /// Turns exchanged so far, oldest first.
    fn history(&self) -> &[ChatTurn];
}

/// Generative language model capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Stateless single-prompt completion.
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Start a new, empty chat session using the given sampling options.
    fn start_session(&self, options: &GenerationOptions) -> Box<dyn ChatSession>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
