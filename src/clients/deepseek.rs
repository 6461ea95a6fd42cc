//! DeepSeek chat-completions client.
//!
//! Requests run in JSON mode: every quiz prompt asks for a single JSON
//! object, and DeepSeek then guarantees the reply parses as one.

use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, DeepSeekError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 1],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Configuration for the DeepSeek client
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask for `response_format: json_object`
    pub json_mode: bool,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: 500,
            temperature: 0.8,
            json_mode: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model, json_mode = config.json_mode, "Creating new DeepSeek client");
        Self { config, client: Client::new() }
    }

    /// Create a client reading `DEEPSEEK_API_KEY` from the environment/.env
    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::require_key()?;
        Ok(Self::new(DeepSeekConfig { api_key, ..Default::default() }))
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request(&self, prompt: String) -> CompletionRequest<'_> {
        CompletionRequest {
            model: &self.config.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: self.config.json_mode.then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

/// Map a non-success status and its body to an error.
fn status_error(status: StatusCode, body: String) -> DeepSeekError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => DeepSeekError::RateLimit,
        StatusCode::UNAUTHORIZED => DeepSeekError::Authentication,
        _ if body.trim().is_empty() => DeepSeekError::Api(format!("status {}", status)),
        _ => DeepSeekError::Api(body),
    }
}

/// Pull the first completion's text out of a response body.
fn completion_text(body: &str) -> Result<String, DeepSeekError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| DeepSeekError::InvalidResponse(e.to_string()))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DeepSeekError::Api("No choices in response".to_string()))?;

    if choice.finish_reason.as_deref() == Some("length") {
        warn!("DeepSeek stopped at max_tokens; the question JSON may be cut off");
    }

    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(DeepSeekError::Api("Empty completion".to_string())),
    }
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!("Sending request to DeepSeek API");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                DeepSeekError::Http(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read DeepSeek response body");
            DeepSeekError::Http(e.to_string())
        })?;
        debug!(status = %status, body_len = body.len(), "Received response from DeepSeek API");

        if !status.is_success() {
            let err = status_error(status, body);
            error!(status = %status, error = %err, "DeepSeek API error");
            return Err(err.into());
        }

        let text = completion_text(&body).map_err(|e| {
            error!(error = %e, "Unusable DeepSeek response");
            e
        })?;
        info!(response_len = text.len(), "Successfully received DeepSeek response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
