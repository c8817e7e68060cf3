//! Gemini inference backend implementation.
//!
//! Talks to the Generative Language API `models/{model}:generateContent`
//! endpoint. Chat sessions keep their history locally and resend it with every
//! turn, since the endpoint itself is stateless.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use defter_core::{
    defaults, ChatRole, ChatSession, ChatTurn, Error, GenerationOptions, LanguageModel, Result,
};

use crate::config::GeminiConfig;

/// Default Gemini endpoint.
pub const DEFAULT_GEMINI_URL: &str = defaults::GEMINI_URL;

/// Default generation model.
pub const DEFAULT_GEMINI_MODEL: &str = defaults::GEMINI_MODEL;

/// Shared HTTP state used by the backend and its sessions.
struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate(&self, turns: &[ChatTurn], options: &GenerationOptions) -> Result<String> {
        let start = Instant::now();
        let prompt_len: usize = turns.iter().map(|t| t.content.len()).sum();

        let request = GenerateRequest {
            contents: turns.iter().map(Content::from).collect(),
            generation_config: GenerationConfig::from(options),
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("Failed to parse response: {}", e)))?;

        let text = result.text().ok_or_else(|| {
            Error::ModelUnavailable("Gemini response contained no text".to_string())
        })?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > defaults::SLOW_GENERATION_MS {
            warn!(
                duration_ms = elapsed,
                prompt_len,
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(text)
    }
}

/// Gemini inference backend.
pub struct GeminiBackend {
    inner: Arc<GeminiClient>,
}

impl GeminiBackend {
    /// Create a backend from configuration.
    pub fn with_config(config: GeminiConfig, timeout_secs: u64) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("Gemini api_key is required".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing Gemini backend"
        );

        Ok(Self {
            inner: Arc::new(GeminiClient {
                client,
                base_url: config.base_url,
                model: config.model,
                api_key,
            }),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig {
            base_url: std::env::var("DEFTER_GEMINI_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string()),
            model: std::env::var("DEFTER_GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
        };
        let timeout_secs = std::env::var("DEFTER_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::GEN_TIMEOUT_SECS);
        Self::with_config(config, timeout_secs)
    }
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    #[instrument(skip(self, prompt, options), fields(subsystem = "inference", component = "gemini", op = "complete", model = %self.inner.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.inner.generate(&[ChatTurn::user(prompt)], options).await
    }

    fn start_session(&self, options: &GenerationOptions) -> Box<dyn ChatSession> {
        Box::new(GeminiSession {
            inner: Arc::clone(&self.inner),
            options: *options,
            history: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        &self.inner.model
    }
}

/// Multi-turn Gemini conversation.
pub struct GeminiSession {
    inner: Arc<GeminiClient>,
    options: GenerationOptions,
    history: Vec<ChatTurn>,
}

#[async_trait]
impl ChatSession for GeminiSession {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "gemini", op = "send", model = %self.inner.model, prompt_len = text.len(), history_len = self.history.len()))]
    async fn send(&mut self, text: &str) -> Result<String> {
        let mut turns = self.history.clone();
        turns.push(ChatTurn::user(text));

        let reply = self.inner.generate(&turns, &self.options).await?;

        turns.push(ChatTurn::model(reply.clone()));
        self.history = turns;
        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}

/// Request payload for `generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl From<&ChatTurn> for Content {
    fn from(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(turn.content.clone()),
            }],
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl From<&GenerationOptions> for GenerationConfig {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            max_output_tokens: options.max_output_tokens,
        }
    }
}

/// Response from `generateContent`.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
