use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::{AIError, ClaudeError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ClaudeMessage; 1],
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Configuration for the Claude client
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 500,
            temperature: 0.8,
        }
    }
}

impl ClaudeConfig {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl KeyFromEnv for ClaudeClient {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
}

impl ClaudeClient {
    /// Create a client with explicit configuration
    pub fn new(config: ClaudeConfig) -> Self {
        info!(model = %config.model, "Creating new Claude client");
        Self { config, client: Client::new() }
    }

    /// Create a client reading `ANTHROPIC_API_KEY` from the environment/.env
    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::require_key()?;
        Ok(Self::new(ClaudeConfig { api_key, ..Default::default() }))
    }

    fn request(&self, prompt: String) -> ClaudeRequest<'_> {
        ClaudeRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: [ClaudeMessage { role: "user", content: prompt }],
        }
    }
}

fn status_error(status: StatusCode, body: String) -> ClaudeError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ClaudeError::RateLimit,
        StatusCode::UNAUTHORIZED => ClaudeError::Authentication,
        _ if body.trim().is_empty() => ClaudeError::Api(format!("status {}", status)),
        _ => ClaudeError::Api(body),
    }
}

/// Concatenate the text blocks of a Messages API response body.
fn message_text(body: &str) -> Result<String, ClaudeError> {
    let response: ClaudeResponse =
        serde_json::from_str(body).map_err(|e| ClaudeError::InvalidResponse(e.to_string()))?;

    if response.stop_reason.as_deref() == Some("max_tokens") {
        warn!("Claude stopped at max_tokens; the question JSON may be cut off");
    }

    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .collect();
    if text.trim().is_empty() {
        return Err(ClaudeError::Api("No content in response".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!("Sending request to Claude API");
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ClaudeError::Http(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read Claude response body");
            ClaudeError::Http(e.to_string())
        })?;
        debug!(status = %status, body_len = body.len(), "Received response from Claude API");

        if !status.is_success() {
            let err = status_error(status, body);
            error!(status = %status, error = %err, "Claude API error");
            return Err(err.into());
        }

        let text = message_text(&body).map_err(|e| {
            error!(error = %e, "Unusable Claude response");
            e
        })?;
        info!(response_len = text.len(), "Successfully received Claude response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let client = ClaudeClient::new(ClaudeConfig::default().with_model("claude-test"));
        let value = serde_json::to_value(client.request("prompt".to_string())).unwrap();
        assert_eq!(value["model"], "claude-test");
        assert_eq!(value["messages"][0]["content"], "prompt");
        assert_eq!(value["max_tokens"], 500);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new()), ClaudeError::RateLimit));
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, String::new()), ClaudeError::Authentication));
        match status_error(StatusCode::from_u16(529).unwrap(), r#"{"type":"overloaded_error"}"#.to_string()) {
            ClaudeError::Api(body) => assert!(body.contains("overloaded_error")),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_message_text_joins_text_blocks() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "Here you go: "},
                {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                {"type": "text", "text": "{\"question\": \"Q?\"}"}
            ],
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(message_text(body).unwrap(), r#"Here you go: {"question": "Q?"}"#);
    }

    #[test]
    fn test_message_text_errors() {
        assert!(matches!(message_text(r#"{"content": []}"#), Err(ClaudeError::Api(_))));
        assert!(matches!(
            message_text(r#"{"content": [{"type": "text", "text": ""}], "stop_reason": "max_tokens"}"#),
            Err(ClaudeError::Api(_))
        ));
        assert!(matches!(message_text("not json"), Err(ClaudeError::InvalidResponse(_))));
    }
}
