//! Inference configuration system.
//!
//! Selects and configures the language model backend. Configuration can be
//! loaded from:
//! - a TOML file with an `[inference]` table (path in `DEFTER_CONFIG`)
//! - environment variables (`DEFTER_*` prefixed, plus `GEMINI_API_KEY`)
//!
//! # Example
//!
//! ```rust,no_run
//! use defter_inference::config::InferenceConfig;
//!
//! // Load from DEFTER_CONFIG or fall back to env vars
//! let config = InferenceConfig::load().expect("Failed to load config");
//! let model = config.build().expect("Failed to build backend");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use defter_core::{defaults, Error, LanguageModel};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "DEFTER_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing configuration for selected backend: {0}")]
    MissingBackend(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Language model backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    #[default]
    Gemini,
    Ollama,
}

impl FromStr for ModelBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

fn validate_url(label: &str, url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} base_url cannot be empty",
            label
        )));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{} base_url must start with http:// or https://, got: {}",
            label, url
        )));
    }
    Ok(())
}

/// Gemini backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for the Generative Language API.
    #[serde(default = "GeminiConfig::default_base_url")]
    pub base_url: String,
    /// Model to use for text generation.
    #[serde(default = "GeminiConfig::default_model")]
    pub model: String,
    /// API key sent as the `key` query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            api_key: None,
        }
    }
}

impl GeminiConfig {
    fn default_base_url() -> String {
        defaults::GEMINI_URL.to_string()
    }

    fn default_model() -> String {
        defaults::GEMINI_MODEL.to_string()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("Gemini", &self.base_url)?;

        if self.model.is_empty() {
            return Err(ConfigError::Validation(
                "Gemini model cannot be empty".to_string(),
            ));
        }

        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() && !key.starts_with("${") => Ok(()),
            _ => Err(ConfigError::Validation(
                "Gemini api_key is required (set GEMINI_API_KEY)".to_string(),
            )),
        }
    }
}

/// Ollama backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for Ollama API.
    #[serde(default = "OllamaConfig::default_base_url")]
    pub base_url: String,
    /// Model to use for text generation.
    #[serde(default = "OllamaConfig::default_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            model: Self::default_model(),
        }
    }
}

impl OllamaConfig {
    fn default_base_url() -> String {
        defaults::OLLAMA_URL.to_string()
    }

    fn default_model() -> String {
        defaults::OLLAMA_MODEL.to_string()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("Ollama", &self.base_url)?;

        if self.model.is_empty() {
            return Err(ConfigError::Validation(
                "Ollama model cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Main inference configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Backend to use.
    pub backend: ModelBackend,
    /// Request timeout for generation calls, in seconds.
    #[serde(default = "InferenceConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Gemini configuration (if enabled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
    /// Ollama configuration (if enabled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<OllamaConfig>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Gemini,
            timeout_secs: Self::default_timeout_secs(),
            gemini: Some(GeminiConfig::default()),
            ollama: None,
        }
    }
}

impl InferenceConfig {
    fn default_timeout_secs() -> u64 {
        defaults::GEN_TIMEOUT_SECS
    }

    /// Path named by `DEFTER_CONFIG`, if set.
    pub fn config_path() -> Option<PathBuf> {
        env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
    }

    /// Load configuration from `DEFTER_CONFIG`, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                info!(
                    subsystem = "inference",
                    component = "config",
                    path = %path.display(),
                    "Loading inference config from file"
                );
                Self::from_file(&path)
            }
            _ => {
                debug!(
                    subsystem = "inference",
                    component = "config",
                    "No config file, using environment variables"
                );
                let config = Self::from_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text containing an `[inference]` table.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            inference: TomlInferenceConfig,
        }

        #[derive(Deserialize)]
        struct TomlInferenceConfig {
            backend: String,
            #[serde(default = "InferenceConfig::default_timeout_secs")]
            timeout_secs: u64,
            #[serde(default)]
            gemini: Option<GeminiConfig>,
            #[serde(default)]
            ollama: Option<OllamaConfig>,
        }

        let root: TomlRoot = toml::from_str(&content)?;

        let config = Self {
            backend: root.inference.backend.parse()?,
            timeout_secs: root.inference.timeout_secs,
            gemini: root.inference.gemini,
            ollama: root.inference.ollama,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from a variable lookup function.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = get("DEFTER_INFERENCE_BACKEND")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let timeout_secs = get("DEFTER_GEN_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Self::default_timeout_secs);

        let gemini = match backend {
            ModelBackend::Gemini => Some(GeminiConfig {
                base_url: get("DEFTER_GEMINI_URL").unwrap_or_else(GeminiConfig::default_base_url),
                model: get("DEFTER_GEMINI_MODEL").unwrap_or_else(GeminiConfig::default_model),
                api_key: get("GEMINI_API_KEY"),
            }),
            ModelBackend::Ollama => None,
        };

        let ollama = match backend {
            ModelBackend::Ollama => Some(OllamaConfig {
                base_url: get("DEFTER_OLLAMA_URL").unwrap_or_else(OllamaConfig::default_base_url),
                model: get("DEFTER_OLLAMA_MODEL").unwrap_or_else(OllamaConfig::default_model),
            }),
            ModelBackend::Gemini => None,
        };

        Self {
            backend,
            timeout_secs,
            gemini,
            ollama,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        match self.backend {
            ModelBackend::Gemini => {
                if self.gemini.is_none() {
                    return Err(ConfigError::MissingBackend(
                        "Gemini is selected but not configured".to_string(),
                    ));
                }
            }
            ModelBackend::Ollama => {
                if self.ollama.is_none() {
                    return Err(ConfigError::MissingBackend(
                        "Ollama is selected but not configured".to_string(),
                    ));
                }
            }
        }

        if let Some(ref gemini) = self.gemini {
            gemini.validate()?;
        }

        if let Some(ref ollama) = self.ollama {
            ollama.validate()?;
        }

        Ok(())
    }

    /// Construct the selected backend.
    pub fn build(&self) -> ConfigResult<Arc<dyn LanguageModel>> {
        self.validate()?;

        info!(
            subsystem = "inference",
            component = "config",
            backend = %self.backend,
            timeout_secs = self.timeout_secs,
            "Building language model backend"
        );

        match self.backend {
            #[cfg(feature = "gemini")]
            ModelBackend::Gemini => {
                let gemini = self
                    .gemini
                    .clone()
                    .ok_or_else(|| ConfigError::MissingBackend("gemini".to_string()))?;
                let backend = crate::gemini::GeminiBackend::with_config(gemini, self.timeout_secs)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?;
                Ok(Arc::new(backend))
            }
            #[cfg(feature = "ollama")]
            ModelBackend::Ollama => {
                let ollama = self
                    .ollama
                    .clone()
                    .ok_or_else(|| ConfigError::MissingBackend("ollama".to_string()))?;
                let backend = crate::ollama::OllamaBackend::with_config(ollama, self.timeout_secs)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?;
                Ok(Arc::new(backend))
            }
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::InvalidBackend(format!(
                "{} support not compiled in",
                other
            ))),
        }
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        let re = match regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}
