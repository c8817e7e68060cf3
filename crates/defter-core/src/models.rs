//! Core data models for defter.
//!
//! These types are shared across all defter crates and represent the core
//! domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A stored note.
///
/// Notes are owned by the note store. The chat pipeline only reads them or
/// asks the store to insert/delete; it never edits one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Assigned at creation, immutable afterwards.
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Build a new note with a fresh time-ordered id and the current timestamp.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// COMMAND TYPES
// =============================================================================

/// Intent derived from one incoming chat message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a note from the given raw content.
    CreateNote(String),
    /// Show the most recently created note.
    ShowLastNote,
    /// Answer a free-form question from the notes.
    Query(String),
}

impl Command {
    /// Short label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Command::CreateNote(_) => "create_note",
            Command::ShowLastNote => "show_last_note",
            Command::Query(_) => "query",
        }
    }
}

// =============================================================================
// GENERATION TYPES
// =============================================================================

/// Sampling options passed through to the language model untouched.
///
/// `None` leaves the backend's own default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// Speaker of a chat session turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// One turn of a chat session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_new_assigns_id_and_timestamp() {
        let before = Utc::now();
        let note = Note::new("Alışveriş", "süt, ekmek");
        assert_eq!(note.title, "Alışveriş");
        assert_eq!(note.content, "süt, ekmek");
        assert!(note.created_at >= before);
        assert_eq!(note.id.get_version_num(), 7);
    }

    #[test]
    fn test_note_ids_are_unique() {
        let a = Note::new("a", "a");
        let b = Note::new("b", "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_command_labels() {
        assert_eq!(Command::CreateNote("x".into()).label(), "create_note");
        assert_eq!(Command::ShowLastNote.label(), "show_last_note");
        assert_eq!(Command::Query("x".into()).label(), "query");
    }

    #[test]
    fn test_generation_options_builder() {
        let opts = GenerationOptions::default()
            .with_temperature(0.7)
            .with_top_p(0.95)
            .with_top_k(40)
            .with_max_output_tokens(8192);
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.top_p, Some(0.95));
        assert_eq!(opts.top_k, Some(40));
        assert_eq!(opts.max_output_tokens, Some(8192));
    }

    #[test]
    fn test_generation_options_skip_none_fields() {
        let opts = GenerationOptions::default().with_temperature(0.4);
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(json, r#"{"temperature":0.4}"#);
    }

    #[test]
    fn test_chat_role_display() {
        assert_eq!(ChatRole::User.to_string(), "user");
        assert_eq!(ChatRole::Model.to_string(), "model");
    }

    #[test]
    fn test_chat_turn_constructors() {
        assert_eq!(ChatTurn::user("hi").role, ChatRole::User);
        assert_eq!(ChatTurn::model("hello").role, ChatRole::Model);
    }
}
