//! # defter-core
//!
//! Core types, traits, and abstractions for the defter notes assistant.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the storage, inference, search, and chat crates depend on. Nothing in
//! here performs I/O; the note store and the language model are reached only
//! through the [`NoteStore`] and [`LanguageModel`] traits.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
