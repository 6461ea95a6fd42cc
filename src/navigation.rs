//! Circular navigation over a finished question set.
//!
//! The manager is stateless with respect to position: the current index lives
//! in a caller-owned `QuestionIndex` that is passed into `advance`.

use crate::error::QuizError;
use crate::models::{QuestionBank, QuizQuestion};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Step direction for `QuizManager::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub fn delta(self) -> i64 {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Caller-held position within a quiz. Starts at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionIndex(pub i64);

impl QuestionIndex {
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Read-only view over a non-empty question list with wraparound indexing.
#[derive(Debug, Clone)]
pub struct QuizManager {
    questions: Arc<[QuizQuestion]>,
}

impl QuizManager {
    /// Fails with `EmptyQuiz` when there are no questions to navigate.
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }
        Ok(Self { questions: questions.into() })
    }

    pub fn from_bank(bank: QuestionBank) -> Result<Self, QuizError> {
        Self::new(bank.into_vec())
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Map any integer, negative included, into `[0, total)`.
    pub fn normalize(&self, index: i64) -> usize {
        // Always in range: total >= 1 and rem_euclid is non-negative
        index.rem_euclid(self.total() as i64) as usize
    }

    /// Question at `index`, wrapping in both directions.
    pub fn question_at(&self, index: i64) -> &QuizQuestion {
        &self.questions[self.normalize(index)]
    }

    /// Pure transition: the index reached from `current` after moving `delta`.
    pub fn step(&self, current: i64, delta: i64) -> i64 {
        self.normalize(current.wrapping_add(delta)) as i64
    }

    /// Move the caller's index one question in `direction`.
    #[instrument(skip(self), fields(total = self.total()))]
    pub fn advance(&self, cursor: &mut QuestionIndex, direction: Direction) {
        let next = self.step(cursor.0, direction.delta());
        debug!(from = cursor.0, to = next, "Advanced question index");
        cursor.0 = next;
    }
}
