//! HTTP completion client speaking the OpenAI-compatible chat wire shape.

use super::{CompletionClient, CompletionConfig};
use crate::errors::CompletionError;
use crate::persona::Persona;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const MAX_ERROR_DETAIL: usize = 512;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Completion client over an OpenAI-compatible `/chat/completions`
/// endpoint.
///
/// One outbound request per [`CompletionClient::complete`] call, plus the
/// bounded retries of the configured [`super::RetryConfig`].
#[derive(Debug)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl HttpCompletionClient {
    /// Creates a client from a fixed configuration.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompletionError::network(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request(&self, persona: &Persona, instruction: &str, context: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(persona.system_prompt()),
                ChatMessage::user(user_content(instruction, context)),
            ],
            temperature: self.config.temperature,
        }
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        seconds: self.config.timeout_seconds,
                    }
                } else {
                    CompletionError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CompletionError::auth(format!("status {status}")));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                detail: truncate_detail(&detail),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::malformed(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        persona: &Persona,
        instruction: &str,
        context: &str,
    ) -> Result<String, CompletionError> {
        let request = self.build_request(persona, instruction, context);
        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(text) => {
                    tracing::debug!(
                        model = %self.config.model,
                        role = %persona.role,
                        chars = text.len(),
                        "completion succeeded"
                    );
                    return Ok(text);
                }
                Err(error) if self.config.retry.should_retry(&error, attempt) => {
                    let delay = self.config.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        model = %self.config.model,
                        role = %persona.role,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying completion request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(
                        model = %self.config.model,
                        role = %persona.role,
                        cause = error.cause(),
                        "completion failed"
                    );
                    return Err(error);
                }
            }
        }
    }
}

fn user_content(instruction: &str, context: &str) -> String {
    if context.is_empty() {
        instruction.to_string()
    } else {
        format!("{instruction}\n\nMaterial from earlier stages:\n{context}")
    }
}

fn truncate_detail(detail: &str) -> String {
    let trimmed = detail.trim();
    if trimmed.len() <= MAX_ERROR_DETAIL {
        return trimmed.to_string();
    }
    let mut cut = MAX_ERROR_DETAIL;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &trimmed[..cut])
}
