//! # defter-inference
//!
//! Language model backends for defter.
//!
//! This crate provides:
//! - Gemini `generateContent` backend (default)
//! - Ollama `/api/chat` backend
//! - Backend selection and configuration from TOML or environment
//! - A scriptable mock model (feature `mock`)
//!
//! # Feature Flags
//!
//! - `gemini` (default): Enable Gemini backend
//! - `ollama` (default): Enable Ollama backend
//! - `mock`: Expose [`mock::MockLanguageModel`] to dependent crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use defter_inference::config::InferenceConfig;
//! use defter_inference::{defaults, LanguageModel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = InferenceConfig::load().unwrap().build().unwrap();
//!     let reply = model.complete("Merhaba", &defaults::CHAT_GENERATION).await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

pub mod config;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

// Mock language model for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use defter_core::*;

pub use config::{ConfigError, GeminiConfig, InferenceConfig, ModelBackend, OllamaConfig};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiSession};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaBackend, OllamaSession};
