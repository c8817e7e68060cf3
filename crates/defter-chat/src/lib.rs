//! # defter-chat
//!
//! Retrieval-augmented chat over notes.
//!
//! This crate provides:
//! - Command classification (create note, show last note, query)
//! - Note creation with optional model expansion and generated titles
//! - Grounding prompt composition from keyword-filtered notes
//! - [`ChatOrchestrator`], the single entry point for a chat turn
//! - [`ChatConfig`], loaded from TOML and environment
//!
//! ## Example
//!
//! ```rust,ignore
//! use defter_chat::{ChatConfig, ChatOrchestrator};
//!
//! let chat = ChatOrchestrator::new(store, model, &ChatConfig::load()?);
//! let reply = chat.handle("not ekle: süt, ekmek, yumurta").await;
//! let reply = chat.handle("Marketten ne alacaktım?").await;
//! ```

pub mod assistant;
pub mod classifier;
pub mod config;
pub mod orchestrator;
pub mod prompt;
mod text;

// Re-export core types
pub use defter_core::*;

pub use assistant::{
    expansion_prompt, sanitize_title, title_prompt, AugmentationTrigger, NoteCreationAssistant,
};
pub use classifier::CommandClassifier;
pub use config::{ChatConfig, ConfigError, GenerationPresets};
pub use orchestrator::{last_note_reply, ChatOrchestrator, ChatState};
pub use prompt::{PromptComposer, NOTE_BEGIN, NOTE_END, NO_MATCHING_NOTES};
