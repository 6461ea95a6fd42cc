//! Question records produced by the generator and consumed by navigation.
//!
//! The JSON shape matches what the model is asked to emit:
//! `{"question", "choices": [{"key", "value"}], "answer", "explanation"}`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Number of choices every question must carry.
pub const CHOICES_PER_QUESTION: usize = 4;

/// Keys of the four choices, in presentation order.
pub const CHOICE_KEYS: [&str; CHOICES_PER_QUESTION] = ["A", "B", "C", "D"];

/// A single multiple-choice option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "One answer option of a multiple-choice question")]
pub struct Choice {
    /// Single-letter identifier, `A` through `D`
    #[schemars(description = "Single letter identifier: A, B, C or D")]
    pub key: String,
    /// Option text shown to the user
    pub value: String,
}

impl Choice {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// A generated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Quiz Question", description = "A multiple-choice quiz question with four options")]
pub struct QuizQuestion {
    /// The question text
    pub question: String,
    /// Exactly four options keyed A to D
    #[schemars(description = "Four key/value pairs keyed A, B, C, D")]
    pub choices: Vec<Choice>,
    /// Key of the correct choice
    #[schemars(description = "The key of the correct choice")]
    pub answer: String,
    /// Why the answer is correct
    pub explanation: String,
}

impl QuizQuestion {
    /// True when there are exactly four choices keyed A, B, C and D
    /// (trimmed, case-insensitive, in any order).
    pub fn has_valid_choices(&self) -> bool {
        if self.choices.len() != CHOICES_PER_QUESTION {
            return false;
        }
        let keys: HashSet<String> = self
            .choices
            .iter()
            .map(|c| c.key.trim().to_ascii_uppercase())
            .collect();
        CHOICE_KEYS.iter().all(|k| keys.contains(*k))
    }

    /// True when `answer` names one of the choice keys.
    ///
    /// Generated questions are not rejected when this fails; the generator
    /// only logs it.
    pub fn answer_is_valid(&self) -> bool {
        self.choice(&self.answer).is_some()
    }

    /// Look up a choice by key (trimmed, case-insensitive).
    pub fn choice(&self, key: &str) -> Option<&Choice> {
        let key = key.trim();
        self.choices.iter().find(|c| c.key.trim().eq_ignore_ascii_case(key))
    }

    /// Whether a user's selection is the correct answer.
    ///
    /// Accepts either a bare key (`"b"`) or a rendered label (`"B) Oxygen"`).
    pub fn is_correct(&self, selection: &str) -> bool {
        let selection = selection.trim();
        let answer = self.answer.trim();
        if answer.is_empty() || selection.is_empty() {
            return false;
        }
        if selection.eq_ignore_ascii_case(answer) {
            return true;
        }
        selection
            .get(..answer.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(answer))
            && selection[answer.len()..].starts_with(')')
    }

    /// Choices rendered as `"A) value"`.
    pub fn choice_labels(&self) -> Vec<String> {
        self.choices.iter().map(|c| format!("{}) {}", c.key, c.value)).collect()
    }
}

impl fmt::Display for QuizQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.question)?;
        for label in self.choice_labels() {
            write!(f, "\n  {}", label)?;
        }
        Ok(())
    }
}

/// Ordered, duplicate-free collection of questions for one quiz session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive match on question text.
    pub fn contains_question(&self, text: &str) -> bool {
        self.questions.iter().any(|q| q.question == text)
    }

    pub(crate) fn push(&mut self, question: QuizQuestion) {
        self.questions.push(question);
    }

    pub(crate) fn clear(&mut self) {
        self.questions.clear();
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuizQuestion> {
        self.questions.iter()
    }

    pub fn as_slice(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn into_vec(self) -> Vec<QuizQuestion> {
        self.questions
    }
}

impl<'a> IntoIterator for &'a QuestionBank {
    type Item = &'a QuizQuestion;
    type IntoIter = std::slice::Iter<'a, QuizQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

impl From<QuestionBank> for Vec<QuizQuestion> {
    fn from(bank: QuestionBank) -> Self {
        bank.questions
    }
}
