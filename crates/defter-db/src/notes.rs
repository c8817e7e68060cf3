//! PostgreSQL note store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use defter_core::{Error, Note, NoteStore, Result};

use crate::validate_note_fields;

const NOTE_COLUMNS: &str = "id, title, content, created_at";

/// PostgreSQL implementation of NoteStore.
pub struct PgNoteStore {
    pool: Pool<Postgres>,
}

impl PgNoteStore {
    /// Create a new PgNoteStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("migration failed: {}", e)))?;
        info!(subsystem = "db", component = "notes", "Migrations applied");
        Ok(())
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    #[instrument(skip(self), fields(subsystem = "db", component = "notes", op = "list"))]
    async fn list(&self) -> Result<Vec<Note>> {
        let sql = format!(
            "SELECT {} FROM notes ORDER BY created_at DESC, id DESC",
            NOTE_COLUMNS
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .fetch_all(&self.pool)
            .await?;
        debug!(result_count = notes.len(), "Listed notes");
        Ok(notes)
    }

    #[instrument(skip(self, title, content), fields(subsystem = "db", component = "notes", op = "insert"))]
    async fn insert(&self, title: &str, content: &str) -> Result<Note> {
        validate_note_fields(title, content)?;

        let sql = format!(
            "INSERT INTO notes ({}) VALUES ($1, $2, $3, $4) RETURNING {}",
            NOTE_COLUMNS, NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::now_v7())
            .bind(title)
            .bind(content)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        debug!(note_id = %note.id, "Inserted note");
        Ok(note)
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "notes", op = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("note {}", id)));
        }
        debug!(note_id = %id, "Deleted note");
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "notes", op = "latest"))]
    async fn latest(&self) -> Result<Option<Note>> {
        let sql = format!(
            "SELECT {} FROM notes ORDER BY created_at DESC, id DESC LIMIT 1",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }
}
