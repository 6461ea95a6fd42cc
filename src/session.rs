//! Per-user quiz session: owns the current index and the active manager.

use crate::error::QuizError;
use crate::models::{QuestionBank, QuizQuestion};
use crate::navigation::{Direction, QuestionIndex, QuizManager};
use tracing::info;

/// Immediate feedback for an answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_key: String,
    pub explanation: String,
}

#[derive(Debug, Default)]
pub struct QuizSession {
    manager: Option<QuizManager>,
    index: QuestionIndex,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new quiz, discarding any previous one and resetting to the
    /// first question.
    pub fn start(&mut self, bank: QuestionBank) -> Result<(), QuizError> {
        self.manager = None;
        self.index = QuestionIndex::default();
        let manager = QuizManager::from_bank(bank)?;
        info!(total = manager.total(), "Starting quiz session");
        self.manager = Some(manager);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.manager.is_some()
    }

    pub fn index(&self) -> QuestionIndex {
        self.index
    }

    fn manager(&self) -> Result<&QuizManager, QuizError> {
        self.manager.as_ref().ok_or(QuizError::EmptyQuiz)
    }

    pub fn current(&self) -> Result<&QuizQuestion, QuizError> {
        Ok(self.manager()?.question_at(self.index.get()))
    }

    /// 1-based question number and total, for display.
    pub fn position(&self) -> Result<(usize, usize), QuizError> {
        let manager = self.manager()?;
        Ok((manager.normalize(self.index.get()) + 1, manager.total()))
    }

    pub fn next(&mut self) -> Result<&QuizQuestion, QuizError> {
        self.go(Direction::Next)
    }

    pub fn previous(&mut self) -> Result<&QuizQuestion, QuizError> {
        self.go(Direction::Previous)
    }

    fn go(&mut self, direction: Direction) -> Result<&QuizQuestion, QuizError> {
        let manager = self.manager.as_ref().ok_or(QuizError::EmptyQuiz)?;
        manager.advance(&mut self.index, direction);
        Ok(manager.question_at(self.index.get()))
    }

    /// Check `selection` (a key like `"B"` or a label like `"B) text"`)
    /// against the current question.
    pub fn answer(&self, selection: &str) -> Result<AnswerFeedback, QuizError> {
        let question = self.current()?;
        Ok(AnswerFeedback {
            correct: question.is_correct(selection),
            correct_key: question.answer.clone(),
            explanation: question.explanation.clone(),
        })
    }
}
