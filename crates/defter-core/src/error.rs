//! Error types for defter.

use thiserror::Error;

/// Result type alias using defter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for defter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A recognized command was malformed (e.g. create-note prefix with no content)
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Keyword extraction failed. Recovered by the deterministic fallback.
    #[error("Keyword extraction failed: {0}")]
    ExtractionFailed(String),

    /// Model or store failure while creating a note
    #[error("Note creation failed: {0}")]
    NoteCreationFailed(String),

    /// Any note-store operation failure (wraps sqlx::Error)
    #[error("Note store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any language-model call failure
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Stable snake_case label for the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidCommand(_) => "invalid_command",
            Error::ExtractionFailed(_) => "extraction_failed",
            Error::NoteCreationFailed(_) => "note_creation_failed",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::ModelUnavailable(_) => "model_unavailable",
            Error::NotFound(_) => "not_found",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::StoreUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ModelUnavailable(e.to_string())
    }
}
