use thiserror::Error;

/// Errors surfaced by quiz generation and navigation.
///
/// Malformed model output and duplicate questions are not errors: they are
/// absorbed by the retry loop and reported through `SlotOutcome`/`SlotResult`.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Missing dependency: {0} not provided")]
    MissingDependency(&'static str),
    #[error("Generation failed: {0}")]
    Generation(#[from] AIError),
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Quiz has no questions")]
    EmptyQuiz,
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Mock client error: {0}")]
    Mock(String),
    #[error("Client configuration error: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Unreadable response body: {0}")]
    InvalidResponse(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Unreadable response body: {0}")]
    InvalidResponse(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Collection unavailable: {0}")]
    Unavailable(String),
    #[error("Query failed: {0}")]
    Query(String),
}
