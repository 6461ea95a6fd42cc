
use quizify::error::QuizError;
use quizify::{Direction, QuestionIndex, QuizManager, QuizQuestion, QuizSession};
use test_utils::question;

fn questions(total: usize) -> Vec<QuizQuestion> {
    (0..total).map(|i| question(&format!("Question {}?", i))).collect()
}

#[test]
fn test_index_is_periodic_in_total() {
    for total in 1..=7usize {
        let manager = QuizManager::new(questions(total)).unwrap();
        let t = total as i64;
        for i in -20..=20i64 {
            for k in -3..=3i64 {
                assert_eq!(
                    manager.question_at(i),
                    manager.question_at(i + k * t),
                    "total={} i={} k={}",
                    total,
                    i,
                    k
                );
            }
            assert!(manager.normalize(i) < total);
        }
    }
}

#[test]
fn test_advance_is_reversible() {
    for total in 1..=6usize {
        let manager = QuizManager::new(questions(total)).unwrap();
        for start in -(total as i64)..(2 * total as i64) {
            let origin = manager.step(start, 0);

            let mut cursor = QuestionIndex(origin);
            manager.advance(&mut cursor, Direction::Next);
            manager.advance(&mut cursor, Direction::Previous);
            assert_eq!(cursor.get(), origin);

            manager.advance(&mut cursor, Direction::Previous);
            manager.advance(&mut cursor, Direction::Next);
            assert_eq!(cursor.get(), origin);
        }
    }
}

#[test]
fn test_previous_from_first_of_five_shows_last() {
    let manager = QuizManager::new(questions(5)).unwrap();
    let mut cursor = QuestionIndex(0);

    manager.advance(&mut cursor, Direction::Previous);

    assert_eq!(cursor.get(), 4);
    assert_eq!(manager.question_at(4).question, "Question 4?");
}

#[test]
fn test_full_cycle_returns_to_start() {
    let manager = QuizManager::new(questions(4)).unwrap();
    let mut cursor = QuestionIndex::default();
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(manager.question_at(cursor.get()).question.clone());
        manager.advance(&mut cursor, Direction::Next);
    }
    assert_eq!(cursor.get(), 0);
    assert_eq!(seen, ["Question 0?", "Question 1?", "Question 2?", "Question 3?"]);
}

#[test]
fn test_session_navigation_and_feedback() {
    let mut session = QuizSession::new();
    assert!(matches!(session.current(), Err(QuizError::EmptyQuiz)));

    let mut bank_source = quizify::QuestionBank::default();
    assert!(matches!(session.start(bank_source.clone()), Err(QuizError::EmptyQuiz)));
    assert!(!session.is_active());

    bank_source = serde_json::from_value(serde_json::to_value(questions(3)).unwrap()).unwrap();
    session.start(bank_source.clone()).unwrap();
    assert_eq!(session.position().unwrap(), (1, 3));

    assert_eq!(session.previous().unwrap().question, "Question 2?");
    assert_eq!(session.position().unwrap(), (3, 3));

    let feedback = session.answer("B) Carbon dioxide").unwrap();
    assert!(feedback.correct);
    assert_eq!(feedback.correct_key, "B");
    assert!(!session.answer("a").unwrap().correct);

    // A new quiz resets the position
    session.start(bank_source).unwrap();
    assert_eq!(session.index(), QuestionIndex(0));
    assert_eq!(session.next().unwrap().question, "Question 1?");
}
