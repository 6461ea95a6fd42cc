use crate::core::LowLevelClient;
use crate::error::AIError;
use async_trait::async_trait;
use std::env;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Client type for lazy initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Claude,
    DeepSeek,
    Mock,
}

impl ClientType {
    /// Parse client type from string (case insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown client type: '{}'. Supported: claude, deepseek, mock", s)),
        }
    }

    /// Build the concrete client. Fails when the API key is missing.
    pub fn build(self) -> Result<Box<dyn LowLevelClient>, AIError> {
        match self {
            #[cfg(feature = "anthropic")]
            ClientType::Claude => Ok(Box::new(super::claude::ClaudeClient::from_env()?)),
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => Ok(Box::new(super::deepseek::DeepSeekClient::from_env()?)),
            ClientType::Mock => {
                // No handle is kept, so this mock always answers "{}".
                // Use FlexibleClient::mock() for a scriptable one.
                let (mock_client, _handle) = super::mock::MockClient::new();
                Ok(Box::new(mock_client))
            }
            #[allow(unreachable_patterns)]
            other => Err(AIError::Config(format!("{} support was not compiled in", other))),
        }
    }
}

impl Default for ClientType {
    /// Pick a client based on available API keys
    fn default() -> Self {
        let _ = dotenvy::dotenv();
        if env::var("ANTHROPIC_API_KEY").is_ok() {
            Self::Claude
        } else if env::var("DEEPSEEK_API_KEY").is_ok() {
            Self::DeepSeek
        } else {
            Self::Mock
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::Claude => write!(f, "Claude"),
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

enum Slot {
    Pending(ClientType),
    Ready(Box<dyn LowLevelClient>),
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Pending(kind) => write!(f, "Pending({})", kind),
            Slot::Ready(client) => write!(f, "Ready({:?})", client),
        }
    }
}

/// Wraps any `LowLevelClient`, optionally building it on first use.
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Arc<Mutex<Slot>>,
}

impl FlexibleClient {
    /// Defer construction of the concrete client until the first call
    pub fn new_lazy(client_type: ClientType) -> Self {
        Self { inner: Arc::new(Mutex::new(Slot::Pending(client_type))) }
    }

    /// Create a new FlexibleClient wrapping the given client
    pub fn new(client: Box<dyn LowLevelClient>) -> Self {
        Self { inner: Arc::new(Mutex::new(Slot::Ready(client))) }
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<super::mock::MockHandle>) {
        let (mock_client, handle) = super::mock::MockClient::new();
        (Self::new(Box::new(mock_client)), handle)
    }

    /// Create a FlexibleClient mock with predefined responses
    pub fn mock_with_responses(responses: Vec<super::mock::MockResponse>) -> (Self, Arc<super::mock::MockHandle>) {
        let (mock_client, handle) = super::mock::MockClient::with_responses(responses);
        (Self::new(Box::new(mock_client)), handle)
    }

    pub fn is_initialized(&self) -> bool {
        matches!(&*self.lock(), Slot::Ready(_))
    }

    /// Build the wrapped client if that has not happened yet. Runs at most once
    /// successfully; a failed build leaves the slot pending.
    pub fn ensure_initialized(&self) -> Result<(), AIError> {
        self.current().map(|_| ())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current(&self) -> Result<Box<dyn LowLevelClient>, AIError> {
        let mut slot = self.lock();
        let client = match &*slot {
            Slot::Ready(client) => return Ok(client.clone_box()),
            Slot::Pending(kind) => {
                info!(client = %kind, "Initializing model client");
                kind.build()?
            }
        };
        let handle = client.clone_box();
        *slot = Slot::Ready(client);
        Ok(handle)
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        // Clone the client so the mutex is not held across the await
        let client = self.current()?;
        debug!(prompt_len = prompt.len(), "Dispatching prompt");
        client.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_type_parsing() {
        assert_eq!(ClientType::from_str("claude"), Ok(ClientType::Claude));
        assert_eq!(ClientType::from_str("DEEPSEEK"), Ok(ClientType::DeepSeek));
        assert_eq!(ClientType::from_str(" mock "), Ok(ClientType::Mock));
        assert!(ClientType::from_str("gemini").is_err());
    }

    #[tokio::test]
    async fn test_lazy_mock_initializes_on_first_call() {
        let client = FlexibleClient::new_lazy(ClientType::Mock);
        assert!(!client.is_initialized());
        assert_eq!(client.ask_raw("hello".to_string()).await.unwrap(), "{}");
        assert!(client.is_initialized());
    }

    #[tokio::test]
    async fn test_clones_share_initialization() {
        let client = FlexibleClient::new_lazy(ClientType::Mock);
        let other = client.clone();
        client.ensure_initialized().unwrap();
        assert!(other.is_initialized());
    }
}
