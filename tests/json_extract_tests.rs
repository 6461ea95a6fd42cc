use quizify::json_utils::{extract_all, extract_first, find_json_structures, NodeType};
use quizify::QuizQuestion;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Item { x: i32 }

#[test]
fn extract_all_from_array() {
    let s = r#"[{"x":1},{"x":2},{"x":3}]"#;
    let v: Vec<Item> = extract_all(s);
    assert_eq!(v.len(), 3);
    assert_eq!(v[0].x, 1);
    assert_eq!(v[2].x, 3);
}

#[test]
fn extract_all_mixed_text_and_objects() {
    let s = r#"prefix {"x":10} middle {"y":99} tail {"x":20} end"#;
    let v: Vec<Item> = extract_all(s);
    assert_eq!(v, vec![Item { x: 10 }, Item { x: 20 }]);
}

#[test]
fn brackets_inside_strings_are_ignored() {
    let s = r#"note: {"text": "a } tricky [ string", "x": 1} done"#;
    let roots = find_json_structures(s);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].kind, NodeType::Object);
    assert_eq!(roots[0].slice(s), r#"{"text": "a } tricky [ string", "x": 1}"#);
}

#[test]
fn extract_first_question_from_chatty_reply() {
    let s = r#"Here is a question about photosynthesis:

```json
{
    "question": "What gas do plants release?",
    "choices": [
        {"key": "A", "value": "Oxygen"},
        {"key": "B", "value": "Nitrogen"},
        {"key": "C", "value": "Methane"},
        {"key": "D", "value": "Helium"}
    ],
    "answer": "A",
    "explanation": "Oxygen is released when water is split."
}
```

Let me know if you want another!"#;
    let q: QuizQuestion = extract_first(s).expect("question in reply");
    assert_eq!(q.question, "What gas do plants release?");
    assert_eq!(q.choices.len(), 4);
    assert!(q.answer_is_valid());
}

#[test]
fn extract_first_finds_nested_question() {
    let s = r#"{"result": {"question": "Nested?", "choices": [], "answer": "A", "explanation": ""}}"#;
    let q: QuizQuestion = extract_first(s).expect("nested question");
    assert_eq!(q.question, "Nested?");
}

#[test]
fn extract_first_none_without_match() {
    assert!(extract_first::<QuizQuestion>("no json here").is_none());
    assert!(extract_first::<QuizQuestion>("{}").is_none());
    assert!(extract_first::<QuizQuestion>(r#"{"question": "truncated", "choices": ["#).is_none());
}
