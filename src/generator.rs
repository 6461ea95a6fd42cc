//! Retrieval-augmented quiz generation.
//!
//! Each question slot gets up to `RetryConfig::max_attempts` generation
//! attempts. Attempts are retried only when the model output cannot be parsed
//! into a well-formed question; a parsed duplicate is rejected and its slot is
//! left empty, so a quiz may come back shorter than requested.

use crate::clients::FlexibleClient;
use crate::config::{GeneratorConfig, DEFAULT_TOPIC, MAX_QUESTIONS, NO_CONTEXT};
use crate::core::LowLevelClient;
use crate::error::QuizError;
use crate::interceptors::Interceptor;
use crate::json_utils::extract_first;
use crate::models::{QuestionBank, QuizQuestion};
use crate::prompt::{add_schema_guidance, render_question_prompt};
use crate::retrieval::Retriever;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of the bounded retry loop for one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    /// A well-formed question was produced on attempt `attempts`
    Generated { question: QuizQuestion, attempts: usize },
    /// Every attempt produced unusable output
    Exhausted { attempts: usize },
}

/// Why a generated question was kept out of the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Duplicate,
    MissingQuestion,
}

/// What happened to one requested slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotResult {
    Accepted { attempts: usize },
    Rejected { attempts: usize, reason: RejectReason },
    Exhausted { attempts: usize },
}

impl SlotResult {
    pub fn attempts(&self) -> usize {
        match self {
            SlotResult::Accepted { attempts }
            | SlotResult::Rejected { attempts, .. }
            | SlotResult::Exhausted { attempts } => *attempts,
        }
    }
}

/// The bank from one `generate_quiz` run plus per-slot bookkeeping.
#[derive(Debug, Clone)]
pub struct QuizReport {
    pub requested: usize,
    pub bank: QuestionBank,
    pub slots: Vec<SlotResult>,
}

impl QuizReport {
    /// Number of requested questions that did not make it into the bank.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.bank.len())
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }

    /// Total generation calls made across all slots.
    pub fn total_attempts(&self) -> usize {
        self.slots.iter().map(SlotResult::attempts).sum()
    }
}

/// Builds a bank of unique multiple-choice questions on a topic.
#[derive(Debug)]
pub struct QuizGenerator {
    topic: String,
    num_questions: usize,
    retriever: Option<Arc<dyn Retriever>>,
    llm: FlexibleClient,
    config: GeneratorConfig,
    interceptor: Option<Arc<dyn Interceptor>>,
    question_bank: QuestionBank,
}

impl QuizGenerator {
    /// A blank or missing topic falls back to `DEFAULT_TOPIC`.
    ///
    /// Fails with `InvalidArgument` when `num_questions` exceeds `MAX_QUESTIONS`;
    /// no model or retrieval call is made in that case.
    pub fn new(
        topic: Option<&str>,
        num_questions: usize,
        retriever: Option<Arc<dyn Retriever>>,
        llm: FlexibleClient,
    ) -> Result<Self, QuizError> {
        if num_questions > MAX_QUESTIONS {
            return Err(QuizError::InvalidArgument(format!(
                "number of questions cannot exceed {} (got {})",
                MAX_QUESTIONS, num_questions
            )));
        }

        let topic = match topic.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_TOPIC.to_string(),
        };

        info!(topic = %topic, num_questions, "Creating quiz generator");
        Ok(Self {
            topic,
            num_questions,
            retriever,
            llm,
            config: GeneratorConfig::default(),
            interceptor: None,
            question_bank: QuestionBank::new(),
        })
    }

    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn num_questions(&self) -> usize {
        self.num_questions
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Questions accepted by the most recent `generate_quiz` run.
    pub fn question_bank(&self) -> &QuestionBank {
        &self.question_bank
    }

    /// Make one generation attempt.
    ///
    /// `Ok(None)` means the model answered but the output was not a usable
    /// question; callers retry on that. Transport failures and a missing
    /// retriever are errors.
    #[instrument(skip(self), fields(topic = %self.topic))]
    pub async fn generate_single_question(&self) -> Result<Option<QuizQuestion>, QuizError> {
        self.llm.ensure_initialized()?;
        let retriever = self
            .retriever
            .as_ref()
            .ok_or(QuizError::MissingDependency("retriever"))?;

        let context = self.retrieve_context(retriever.as_ref()).await?;
        let mut prompt = render_question_prompt(&self.topic, &context);
        if self.config.schema_guidance {
            prompt = add_schema_guidance(prompt);
        }

        let raw = self.llm.ask_raw(prompt.clone()).await?;
        debug!(response = %raw, "Raw LLM response");

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(&self.topic, &prompt, &raw).await {
                warn!(error = %e, "Failed to save transcript");
            }
        }

        Ok(parse_question(&raw))
    }

    /// Run the bounded retry loop for one slot.
    pub async fn generate_slot(&self) -> Result<SlotOutcome, QuizError> {
        let max_attempts = self.config.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.generate_single_question().await? {
                Some(question) => {
                    return Ok(SlotOutcome::Generated { question, attempts: attempt });
                }
                None => debug!(attempt, max_attempts, "Attempt produced no usable question"),
            }
        }
        Ok(SlotOutcome::Exhausted { attempts: max_attempts })
    }

    /// Generate the quiz, returning only the accepted questions.
    pub async fn generate_quiz(&mut self) -> Result<QuestionBank, QuizError> {
        Ok(self.generate_quiz_with_report().await?.bank)
    }

    /// Generate the quiz and report what happened to every slot.
    ///
    /// The bank is reset first. Its final length is at most `num_questions`.
    #[instrument(skip(self), fields(topic = %self.topic, num_questions = self.num_questions))]
    pub async fn generate_quiz_with_report(&mut self) -> Result<QuizReport, QuizError> {
        self.question_bank.clear();
        let mut slots = Vec::with_capacity(self.num_questions);

        for slot in 0..self.num_questions {
            let result = match self.generate_slot().await? {
                SlotOutcome::Generated { question, attempts } => {
                    match self.check_question(&question) {
                        None => {
                            info!(slot, attempts, "Successfully generated unique question");
                            self.question_bank.push(question);
                            SlotResult::Accepted { attempts }
                        }
                        Some(reason) => {
                            error!(slot, ?reason, question = %question.question, "Duplicate or invalid question detected");
                            SlotResult::Rejected { attempts, reason }
                        }
                    }
                }
                SlotOutcome::Exhausted { attempts } => {
                    error!(slot, attempts, "No usable question after retries");
                    SlotResult::Exhausted { attempts }
                }
            };
            slots.push(result);
        }

        let report = QuizReport {
            requested: self.num_questions,
            bank: self.question_bank.clone(),
            slots,
        };
        if report.is_complete() {
            info!(generated = report.bank.len(), "Quiz generation complete");
        } else {
            warn!(generated = report.bank.len(), requested = report.requested, "Quiz is shorter than requested");
        }
        Ok(report)
    }

    /// True if `candidate` has non-blank question text that is not already
    /// in the bank (exact, case-sensitive comparison). Whitespace-only text
    /// counts as a missing question.
    pub fn validate_question(&self, candidate: &QuizQuestion) -> bool {
        self.check_question(candidate).is_none()
    }

    fn check_question(&self, candidate: &QuizQuestion) -> Option<RejectReason> {
        if candidate.question.trim().is_empty() {
            return Some(RejectReason::MissingQuestion);
        }
        if self.question_bank.contains_question(&candidate.question) {
            return Some(RejectReason::Duplicate);
        }
        None
    }

    async fn retrieve_context(&self, retriever: &dyn Retriever) -> Result<String, QuizError> {
        let items = retriever.query_by_topic(&self.topic).await?;
        match items.first() {
            Some(item) => {
                debug!(hits = items.len(), score = ?item.score(), "Using top passage as context");
                Ok(item.passage().text.clone())
            }
            None => {
                debug!("Retrieval returned no passages");
                Ok(NO_CONTEXT.to_string())
            }
        }
    }
}

/// Extract a well-formed question from raw model output.
fn parse_question(raw: &str) -> Option<QuizQuestion> {
    let Some(question) = extract_first::<QuizQuestion>(raw) else {
        warn!(response_len = raw.len(), "Model response did not contain a quiz question");
        return None;
    };
    if !question.has_valid_choices() {
        warn!(choices = question.choices.len(), "Question needs four choices keyed A to D");
        return None;
    }
    if !question.answer_is_valid() {
        warn!(answer = %question.answer, "Answer key does not match any choice");
    }
    Some(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Choice;

    fn question(text: &str) -> QuizQuestion {
        QuizQuestion {
            question: text.to_string(),
            choices: ["A", "B", "C", "D"]
                .iter()
                .map(|k| Choice::new(*k, format!("option {}", k)))
                .collect(),
            answer: "A".to_string(),
            explanation: "because".to_string(),
        }
    }

    fn generator() -> QuizGenerator {
        let (llm, _handle) = FlexibleClient::mock();
        QuizGenerator::new(Some("Rust"), 2, None, llm).unwrap()
    }

    #[test]
    fn test_validate_question_rejects_exact_duplicates_only() {
        let mut gen = generator();
        gen.question_bank.push(question("What is ownership?"));

        assert!(!gen.validate_question(&question("What is ownership?")));
        assert!(gen.validate_question(&question("what is ownership?")));
        assert!(gen.validate_question(&question("What is ownership? ")));
        assert!(!gen.validate_question(&question("   ")));
    }

    #[test]
    fn test_parse_question_from_fenced_output() {
        let raw = format!(
            "Sure! Here is your question:\n```json\n{}\n```",
            serde_json::to_string(&question("Fenced?")).unwrap()
        );
        assert_eq!(parse_question(&raw).unwrap().question, "Fenced?");
    }

    #[test]
    fn test_parse_question_rejects_bad_shapes() {
        assert!(parse_question("{}").is_none());
        assert!(parse_question("not json at all").is_none());

        let mut three = question("Three choices?");
        three.choices.pop();
        assert!(parse_question(&serde_json::to_string(&three).unwrap()).is_none());
    }

    #[test]
    fn test_parse_question_keeps_mismatched_answer() {
        let mut q = question("Odd answer?");
        q.answer = "Z".to_string();
        let parsed = parse_question(&serde_json::to_string(&q).unwrap()).unwrap();
        assert!(!parsed.answer_is_valid());
    }

    #[test]
    fn test_report_shortfall() {
        let report = QuizReport {
            requested: 3,
            bank: QuestionBank::new(),
            slots: vec![
                SlotResult::Exhausted { attempts: 5 },
                SlotResult::Rejected { attempts: 1, reason: RejectReason::Duplicate },
                SlotResult::Exhausted { attempts: 5 },
            ],
        };
        assert_eq!(report.shortfall(), 3);
        assert!(!report.is_complete());
        assert_eq!(report.total_attempts(), 11);
    }
}
