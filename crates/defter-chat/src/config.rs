//! Chat pipeline configuration.
//!
//! Defaults come from `defter_core::defaults`. A TOML file with a `[chat]`
//! table (path in `DEFTER_CONFIG`, shared with the inference config) can
//! override any field; `DEFTER_AI_KEYWORDS`, `DEFTER_KEYWORD_MIN`,
//! `DEFTER_KEYWORD_MAX` and `DEFTER_PROMPT_SOFT_LIMIT` override on top.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use defter_core::{defaults, Error, GenerationOptions};

use crate::assistant::AugmentationTrigger;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "DEFTER_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Sampling presets for each model call the pipeline makes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPresets {
    pub keyword: GenerationOptions,
    pub expansion: GenerationOptions,
    pub title: GenerationOptions,
    pub chat: GenerationOptions,
}

impl Default for GenerationPresets {
    fn default() -> Self {
        Self {
            keyword: defaults::KEYWORD_GENERATION,
            expansion: defaults::EXPANSION_GENERATION,
            title: defaults::TITLE_GENERATION,
            chat: defaults::CHAT_GENERATION,
        }
    }
}

/// Chat pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Create-note prefixes; each must end with `:`.
    pub create_note_prefixes: Vec<String>,
    /// Phrases requesting the most recent note.
    pub show_last_note_phrases: Vec<String>,
    /// Stop words for the deterministic keyword extractor.
    pub stop_words: Vec<String>,
    /// When note content is expanded by the model before saving.
    pub augmentation: AugmentationTrigger,
    /// Use the model for keyword extraction (stop words only when false).
    pub ai_keywords: bool,
    /// Keyword count requested from the model.
    pub keyword_min: usize,
    /// Keyword count kept from the model response.
    pub keyword_max: usize,
    /// Composed prompts above this many characters are logged as oversized.
    pub prompt_soft_limit: usize,
    pub generation: GenerationPresets,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            create_note_prefixes: owned(defaults::CREATE_NOTE_PREFIXES),
            show_last_note_phrases: owned(defaults::SHOW_LAST_NOTE_PHRASES),
            stop_words: owned(defaults::STOP_WORDS),
            augmentation: AugmentationTrigger::default(),
            ai_keywords: true,
            keyword_min: defaults::KEYWORD_MIN,
            keyword_max: defaults::KEYWORD_MAX,
            prompt_soft_limit: defaults::PROMPT_SOFT_LIMIT_CHARS,
            generation: GenerationPresets::default(),
        }
    }
}

impl ChatConfig {
    /// Load from `DEFTER_CONFIG` if it exists, otherwise defaults; then apply env overrides.
    pub fn load() -> ConfigResult<Self> {
        match env::var(CONFIG_PATH_ENV).ok().map(std::path::PathBuf::from) {
            Some(path) if path.exists() => {
                info!(
                    subsystem = "chat",
                    component = "config",
                    path = %path.display(),
                    "Loading chat config from file"
                );
                Self::from_file(&path)
            }
            _ => {
                debug!(
                    subsystem = "chat",
                    component = "config",
                    "No config file, using defaults with environment overrides"
                );
                Self::from_env()
            }
        }
    }

    /// Defaults with environment overrides.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. A missing `[chat]` table means defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the `[chat]` table from TOML text, without env overrides.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            chat: ChatConfig,
        }

        let root: TomlRoot = toml::from_str(content)?;
        root.chat.validate()?;
        Ok(root.chat)
    }

    /// Apply overrides from a variable lookup function.
    pub fn apply_overrides<F>(&mut self, get: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = get("DEFTER_AI_KEYWORDS") {
            self.ai_keywords = parse_bool("DEFTER_AI_KEYWORDS", &value)?;
        }
        if let Some(value) = get("DEFTER_KEYWORD_MIN") {
            self.keyword_min = parse_usize("DEFTER_KEYWORD_MIN", &value)?;
        }
        if let Some(value) = get("DEFTER_KEYWORD_MAX") {
            self.keyword_max = parse_usize("DEFTER_KEYWORD_MAX", &value)?;
        }
        if let Some(value) = get("DEFTER_PROMPT_SOFT_LIMIT") {
            self.prompt_soft_limit = parse_usize("DEFTER_PROMPT_SOFT_LIMIT", &value)?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.create_note_prefixes.is_empty() {
            return Err(ConfigError::Validation(
                "at least one create_note_prefix is required".to_string(),
            ));
        }
        for prefix in &self.create_note_prefixes {
            let head = prefix.strip_suffix(':').ok_or_else(|| {
                ConfigError::Validation(format!(
                    "create_note_prefix must end with ':', got: {:?}",
                    prefix
                ))
            })?;
            if head.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "create_note_prefix has no text before ':', got: {:?}",
                    prefix
                )));
            }
        }

        if self.show_last_note_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "show_last_note_phrases must not contain blank entries".to_string(),
            ));
        }

        if self.keyword_max == 0 {
            return Err(ConfigError::Validation(
                "keyword_max must be greater than zero".to_string(),
            ));
        }
        if self.keyword_min > self.keyword_max {
            return Err(ConfigError::Validation(format!(
                "keyword_min ({}) must not exceed keyword_max ({})",
                self.keyword_min, self.keyword_max
            )));
        }

        if self.prompt_soft_limit == 0 {
            return Err(ConfigError::Validation(
                "prompt_soft_limit must be greater than zero".to_string(),
            ));
        }

        self.augmentation.validate().map_err(ConfigError::Validation)
    }
}

fn parse_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_usize(name: &str, value: &str) -> ConfigResult<usize> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
