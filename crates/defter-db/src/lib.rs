//! # defter-db
//!
//! Note store implementations for defter.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgNoteStore`], a PostgreSQL implementation of [`NoteStore`]
//! - [`MemoryNoteStore`], an in-process implementation for tests and offline runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use defter_db::{create_pool, PgNoteStore, NoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/defter").await?;
//!     let store = PgNoteStore::new(pool);
//!     store.migrate().await?;
//!
//!     let note = store.insert("Alışveriş", "süt, ekmek, yumurta").await?;
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod notes;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use defter_core::*;

pub use memory::MemoryNoteStore;
pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Reject blank titles or contents before they reach a store.
pub(crate) fn validate_note_fields(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("note title must not be empty".to_string()));
    }
    if content.trim().is_empty() {
        return Err(Error::InvalidInput(
            "note content must not be empty".to_string(),
        ));
    }
    Ok(())
}
