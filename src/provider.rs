//! Model providers: the async seam between the generation pipeline and
//! whatever service produces plan text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::PlanError;

/// One prompt/response exchange with a generative model. A single
/// attempt is made per plan; any failure routes the caller to the
/// deterministic fallback, so providers do not retry internally.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, PlanError>;
}

/// Configuration for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    /// Low temperature keeps plan output close to deterministic.
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Provider backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiModel {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiModel {
    pub fn new(config: OpenAiConfig) -> Result<Self, PlanError> {
        if config.api_key.trim().is_empty() {
            return Err(PlanError::model("missing API key for plan generation"));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PlanError::model(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, PlanError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| PlanError::model(format!("model request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(PlanError::model(format!(
                "model endpoint returned {status}: {text}"
            )));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| PlanError::model(format!("model response invalid: {err}")))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_text())
            .ok_or_else(|| PlanError::model("model response missing content"))
    }
}

/// Deterministic provider for tests and offline development: returns a
/// canned response verbatim.
#[derive(Debug, Clone)]
pub struct MockModel {
    response: String,
}

impl MockModel {
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::returning(
            r#"{"functions": [{"name": "navigate", "args": {"url": "https://www.google.com"}}], "explanation": "Canned single-step plan."}"#,
        )
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, PlanError> {
        Ok(self.response.clone())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: ChatCompletionContent,
}

/// Chat content is either a plain string or a list of text parts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatCompletionContent {
    Text(String),
    Parts(Vec<ChatCompletionPart>),
}

impl ChatCompletionContent {
    fn as_text(&self) -> Option<String> {
        match self {
            ChatCompletionContent::Text(value) => Some(value.clone()),
            ChatCompletionContent::Parts(parts) => {
                let text = parts
                    .iter()
                    .filter_map(|part| part.text.as_ref())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n");
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionPart {
    #[serde(default)]
    text: Option<String>,
}
