//! Completion client trait, configuration, and the HTTP implementation.

mod http;
mod retry;

pub use http::HttpCompletionClient;
pub use retry::RetryConfig;

use crate::errors::CompletionError;
use crate::persona::Persona;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default gateway base address.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Deterministic-leaning sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

fn default_timeout() -> u64 {
    60
}

/// Trait for obtaining generated text from a completion service.
///
/// One outbound call per invocation. Implementations must fail loudly:
/// an empty or undecodable response is a [`CompletionError`], never
/// silently-empty text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generates text for a persona-framed instruction.
    ///
    /// # Arguments
    ///
    /// * `persona` - The voice the model should assume
    /// * `instruction` - The task description for this call
    /// * `context` - Concatenated prior stage outputs (may be empty)
    async fn complete(
        &self,
        persona: &Persona,
        instruction: &str,
        context: &str,
    ) -> Result<String, CompletionError>;
}

/// Fixed configuration for the completion endpoint.
///
/// Constructed once by the host and passed by reference into the client
/// constructor; the model identifier, base address, and temperature are
/// never per-call parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Gateway base address.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Target model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Opaque bearer token for the gateway.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl CompletionConfig {
    /// Creates a configuration with the given credential and defaults for
    /// everything else.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: api_key.into(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: default_timeout(),
            retry: RetryConfig::default(),
        }
    }

    /// Sets the gateway base address.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Request deadline as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_defaults() {
        let config = CompletionConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_builders() {
        let config = CompletionConfig::new("sk-test")
            .with_base_url("https://gateway.local/v1")
            .with_model("test-model")
            .with_temperature(0.7)
            .with_timeout_seconds(10);

        assert_eq!(config.base_url, "https://gateway.local/v1");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.timeout_seconds, 10);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = CompletionConfig::new("sk-very-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_serialize_omits_credential() {
        let config = CompletionConfig::new("sk-very-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-very-secret"));
    }
}
