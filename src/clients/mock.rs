use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{core::LowLevelClient, error::AIError};

/// A scripted reply for `MockClient`.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Raw model text returned from `ask_raw`
    Success(String),
    /// Transport-level failure
    Failure(String),
}

/// Shared control surface for a `MockClient` and its clones.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockHandle {
    /// Queue a response; replies are served in FIFO order.
    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        queue.extend(responses);
    }

    /// Number of `ask_raw` calls made so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).push(prompt);
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).pop_front()
    }
}

/// Mock client for testing. Once the script runs out it answers `{}`.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.add_responses(responses);
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        match self.handle.next(prompt) {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::Failure(message)) => Err(AIError::Mock(message)),
            None => Ok("{}".to_string()),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let (client, handle) = MockClient::with_responses(vec![
            MockResponse::Success("first".to_string()),
            MockResponse::Failure("boom".to_string()),
        ]);

        assert_eq!(client.ask_raw("p1".to_string()).await.unwrap(), "first");
        assert!(matches!(client.ask_raw("p2".to_string()).await, Err(AIError::Mock(m)) if m == "boom"));
        assert_eq!(client.ask_raw("p3".to_string()).await.unwrap(), "{}");
        assert_eq!(handle.call_count(), 3);
        assert_eq!(handle.prompts(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_clones_share_handle() {
        let (client, handle) = MockClient::new();
        let boxed = client.clone_box();
        handle.add_response(MockResponse::Success("shared".to_string()));
        assert_eq!(boxed.ask_raw("x".to_string()).await.unwrap(), "shared");
        assert_eq!(handle.remaining(), 0);
    }
}
