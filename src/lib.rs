pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod interceptors;
pub mod json_utils;
pub mod models;
pub mod navigation;
pub mod prompt;
pub mod retrieval;
pub mod session;

// Convenient re-exports
pub use error::QuizError;
pub use generator::{QuizGenerator, QuizReport, SlotOutcome, SlotResult};
pub use models::{Choice, QuestionBank, QuizQuestion};
pub use navigation::{Direction, QuestionIndex, QuizManager};
pub use retrieval::{InMemoryRetriever, Passage, RetrievedItem, Retriever};
pub use session::QuizSession;
