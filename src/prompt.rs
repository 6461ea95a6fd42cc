//! Instruction template sent to the model for each question attempt.

use crate::models::QuizQuestion;
use schemars::schema_for;

/// Render the question-generation prompt for `topic`, grounded on `context`.
pub fn render_question_prompt(topic: &str, context: &str) -> String {
    format!(
        r#"You are a subject matter expert on the topic: {topic}

Follow the instructions to create a quiz question:
1. Generate a question based on the topic provided and context as key "question"
2. Provide 4 multiple choice answers to the question as a list of key-value pairs "choices"
3. Provide the correct answer for the question from the list of answers as key "answer"
4. Provide an explanation as to why the answer is correct as key "explanation"

Ensure your response is a valid JSON object with the following structure:
{{
    "question": "<question>",
    "choices": [
        {{"key": "A", "value": "<choice>"}},
        {{"key": "B", "value": "<choice>"}},
        {{"key": "C", "value": "<choice>"}},
        {{"key": "D", "value": "<choice>"}}
    ],
    "answer": "<answer key from choices list>",
    "explanation": "<explanation as to why the answer is correct>"
}}

Context: {context}
"#
    )
}

/// Append the JSON schema of `QuizQuestion` to a prompt.
pub fn add_schema_guidance(prompt: String) -> String {
    let schema = schema_for!(QuizQuestion);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{}\n## Response Format\nThe JSON object must match this schema:\n```json\n{}\n```",
        prompt, schema_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_substitutes_topic_and_context() {
        let prompt = render_question_prompt("Photosynthesis", "Plants convert light into chemical energy.");
        assert!(prompt.contains("expert on the topic: Photosynthesis"));
        assert!(prompt.contains("Context: Plants convert light into chemical energy."));
        assert!(prompt.contains(r#"{"key": "D", "value": "<choice>"}"#));
    }

    #[test]
    fn test_braces_in_input_are_left_alone() {
        let prompt = render_question_prompt("{context}", "{topic}");
        assert!(prompt.contains("topic: {context}"));
        assert!(prompt.contains("Context: {topic}"));
    }

    #[test]
    fn test_schema_guidance_lists_fields() {
        let prompt = add_schema_guidance(render_question_prompt("Rust", "none"));
        assert!(prompt.contains("## Response Format"));
        assert!(prompt.contains("\"explanation\""));
    }
}
