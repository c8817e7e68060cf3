//! In-memory note store.
//!
//! Holds notes in a `tokio::sync::RwLock<Vec<Note>>`. Used by tests and by the
//! terminal driver when no database is configured; contents are lost on exit.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use defter_core::{Error, Note, NoteStore, Result};

use crate::validate_note_fields;

/// In-process implementation of NoteStore.
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryNoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing notes (timestamps kept as given).
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(notes),
        }
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }
}

/// Newest first; among equal timestamps the later insertion wins.
fn newest_first(notes: &[Note]) -> Vec<Note> {
    let mut sorted: Vec<Note> = notes.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>> {
        let notes = self.notes.read().await;
        Ok(newest_first(&notes))
    }

    async fn insert(&self, title: &str, content: &str) -> Result<Note> {
        validate_note_fields(title, content)?;

        let note = Note::new(title, content);
        self.notes.write().await.push(note.clone());
        debug!(
            subsystem = "db",
            component = "memory",
            op = "insert",
            note_id = %note.id,
            "Inserted note"
        );
        Ok(note)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Error::NotFound(format!("note {}", id)));
        }
        Ok(())
    }

    async fn latest(&self) -> Result<Option<Note>> {
        let notes = self.notes.read().await;
        Ok(newest_first(&notes).into_iter().next())
    }
}
