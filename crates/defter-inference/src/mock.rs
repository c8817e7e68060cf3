//! Mock language model for deterministic testing.
//!
//! Responses are resolved in this order: injected failures, scripted
//! responses (consumed front to back), substring mappings, echo mode, and
//! finally the fixed default response. Every `complete` and `send` is
//! recorded in a shared call log so tests can assert call order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use defter_inference::mock::MockLanguageModel;
//!
//! #[tokio::test]
//! async fn test_with_mock_model() {
//!     let model = MockLanguageModel::new()
//!         .with_response_mapping("anahtar kelimeleri", "süt\nmarket")
//!         .with_fixed_response("Tamam");
//!
//!     let keywords = model.complete("... anahtar kelimeleri ...", &opts).await.unwrap();
//!     assert_eq!(keywords, "süt\nmarket");
//!     assert_eq!(model.operations(), vec!["complete"]);
//! }
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use defter_core::{ChatSession, ChatTurn, Error, GenerationOptions, LanguageModel, Result};

/// Mock language model for testing.
#[derive(Clone)]
pub struct MockLanguageModel {
    config: Arc<MockConfig>,
    script: Arc<Mutex<VecDeque<String>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model_name: String,
    default_response: String,
    mappings: Vec<(String, String)>,
    echo: bool,
    fail_complete: bool,
    fail_send: bool,
    fail_on: Vec<String>,
    latency_ms: u64,
}

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// "complete" or "send".
    pub operation: String,
    pub input: String,
    pub options: GenerationOptions,
    pub timestamp: Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model_name: "mock-model".to_string(),
            default_response: "Mock response".to_string(),
            mappings: Vec::new(),
            echo: false,
            fail_complete: false,
            fail_send: false,
            fail_on: Vec::new(),
            latency_ms: 0,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockLanguageModel {
    /// Create a new mock model with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reported model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model_name = name.into();
        self
    }

    /// Set the response returned when nothing more specific applies.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `output` for any input containing `needle`. First match wins.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mappings
            .push((needle.into(), output.into()));
        self
    }

    /// Queue responses returned in order, ahead of mappings.
    pub fn with_scripted_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.script).extend(responses.into_iter().map(Into::into));
        self
    }

    /// Reply with the input text itself.
    pub fn with_echo(mut self) -> Self {
        Arc::make_mut(&mut self.config).echo = true;
        self
    }

    /// Make every `complete` call fail.
    pub fn failing_complete(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_complete = true;
        self
    }

    /// Make every session `send` fail.
    pub fn failing_send(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_send = true;
        self
    }

    /// Fail any call whose input contains `needle`.
    pub fn with_failure_on(mut self, needle: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_on.push(needle.into());
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.call_log).clone()
    }

    /// Operation names in call order.
    pub fn operations(&self) -> Vec<String> {
        lock(&self.call_log)
            .iter()
            .map(|c| c.operation.clone())
            .collect()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        lock(&self.call_log).clear()
    }

    /// Get number of `complete` calls.
    pub fn complete_call_count(&self) -> usize {
        self.count("complete")
    }

    /// Get number of session `send` calls.
    pub fn send_call_count(&self) -> usize {
        self.count("send")
    }

    fn count(&self, operation: &str) -> usize {
        lock(&self.call_log)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn log_call(&self, operation: &str, input: &str, options: &GenerationOptions) {
        lock(&self.call_log).push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
            options: *options,
            timestamp: Instant::now(),
        });
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    async fn respond(
        &self,
        operation: &str,
        input: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        self.log_call(operation, input, options);
        self.simulate_latency().await;

        let forced = match operation {
            "complete" => self.config.fail_complete,
            _ => self.config.fail_send,
        };
        if forced || self.config.fail_on.iter().any(|n| input.contains(n.as_str())) {
            return Err(Error::ModelUnavailable(format!(
                "simulated {} failure",
                operation
            )));
        }

        if let Some(next) = lock(&self.script).pop_front() {
            return Ok(next);
        }

        if let Some((_, output)) = self
            .config
            .mappings
            .iter()
            .find(|(needle, _)| input.contains(needle.as_str()))
        {
            return Ok(output.clone());
        }

        if self.config.echo {
            return Ok(input.to_string());
        }

        Ok(self.config.default_response.clone())
    }
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.respond("complete", prompt, options).await
    }

    fn start_session(&self, options: &GenerationOptions) -> Box<dyn ChatSession> {
        Box::new(MockSession {
            model: self.clone(),
            options: *options,
            history: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Chat session backed by a [`MockLanguageModel`]; shares its call log.
pub struct MockSession {
    model: MockLanguageModel,
    options: GenerationOptions,
    history: Vec<ChatTurn>,
}

#[async_trait]
impl ChatSession for MockSession {
    async fn send(&mut self, text: &str) -> Result<String> {
        let reply = self.model.respond("send", text, &self.options).await?;
        self.history.push(ChatTurn::user(text));
        self.history.push(ChatTurn::model(reply.clone()));
        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}
