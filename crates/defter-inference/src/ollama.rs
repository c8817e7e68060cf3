//! Ollama inference backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use defter_core::{
    defaults, ChatRole, ChatSession, ChatTurn, Error, GenerationOptions, LanguageModel, Result,
};

use crate::config::OllamaConfig;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::OLLAMA_MODEL;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = defaults::GEN_TIMEOUT_SECS;

struct OllamaClient {
    client: Client,
    base_url: String,
    gen_model: String,
}

impl OllamaClient {
    /// Uses the `/api/chat` endpoint for both single prompts and sessions, so
    /// thinking models keep their reasoning out of the returned content.
    async fn chat(&self, turns: &[ChatTurn], options: &GenerationOptions) -> Result<String> {
        let start = Instant::now();
        let prompt_len: usize = turns.iter().map(|t| t.content.len()).sum();

        debug!(turn_count = turns.len(), "Starting generation via chat API");

        let request = ChatRequest {
            model: self.gen_model.clone(),
            messages: turns.iter().map(ChatMessage::from).collect(),
            stream: false,
            options: ChatOptions::from(options),
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("Failed to parse response: {}", e)))?;

        let content = result.message.content;
        if content.trim().is_empty() {
            return Err(Error::ModelUnavailable(
                "Ollama response contained no text".to_string(),
            ));
        }
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
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
        Ok(content)
    }
}

/// Ollama inference backend.
pub struct OllamaBackend {
    inner: Arc<OllamaClient>,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default(), GEN_TIMEOUT_SECS)
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(config: OllamaConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "ollama",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing Ollama backend"
        );

        Ok(Self {
            inner: Arc::new(OllamaClient {
                client,
                base_url: config.base_url,
                gen_model: config.model,
            }),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig {
            base_url: std::env::var("DEFTER_OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            model: std::env::var("DEFTER_OLLAMA_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string()),
        };
        let timeout_secs = std::env::var("DEFTER_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);
        Self::with_config(config, timeout_secs)
    }
}

#[async_trait]
impl LanguageModel for OllamaBackend {
    #[instrument(skip(self, prompt, options), fields(subsystem = "inference", component = "ollama", op = "complete", model = %self.inner.gen_model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.inner.chat(&[ChatTurn::user(prompt)], options).await
    }

    fn start_session(&self, options: &GenerationOptions) -> Box<dyn ChatSession> {
        Box::new(OllamaSession {
            inner: Arc::clone(&self.inner),
            options: *options,
            history: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        &self.inner.gen_model
    }
}

/// Multi-turn Ollama conversation.
pub struct OllamaSession {
    inner: Arc<OllamaClient>,
    options: GenerationOptions,
    history: Vec<ChatTurn>,
}

#[async_trait]
impl ChatSession for OllamaSession {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "ollama", op = "send", model = %self.inner.gen_model, prompt_len = text.len(), history_len = self.history.len()))]
    async fn send(&mut self, text: &str) -> Result<String> {
        let mut turns = self.history.clone();
        turns.push(ChatTurn::user(text));

        let reply = self.inner.chat(&turns, &self.options).await?;

        turns.push(ChatTurn::model(reply.clone()));
        self.history = turns;
        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}

/// Chat API message for `/api/chat`.
#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Model => "assistant",
        };
        Self {
            role: role.to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Sampling options in Ollama's naming.
#[derive(Serialize, Default)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl From<&GenerationOptions> for ChatOptions {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            num_predict: options.max_output_tokens,
        }
    }
}

/// Request payload for the Ollama `/api/chat` endpoint.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

/// Response from the Ollama `/api/chat` endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}
