//! Capability seams: the low-level model client the generator prompts, and the
//! retry policy applied per question slot.

use crate::error::AIError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text. Extracting a `QuizQuestion` from that text is the generator's job.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

// Implement Clone for Box<dyn LowLevelClient>
impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}

/// Default number of generation attempts per question slot.
pub const DEFAULT_RETRY_LIMIT: usize = 5;

/// Bounded retry policy for a single question slot.
///
/// Retries cover unparseable model output only. A question that parses ends
/// the loop even if it later turns out to be a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_RETRY_LIMIT }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }
}
