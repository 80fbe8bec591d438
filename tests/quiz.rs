//! Quiz Integration Tests
//!
//! Payload parsing, prompt construction, and scoring.

use youcademy::adapters::prompts::quiz_prompt;
use youcademy::domain::{parse_quiz, ParseError, QuizQuestion, QuizSession, SelectOutcome};

const QUIZ: &str = r#"[
  {"question": "What is borrowed?", "options": ["A reference", "A copy", "A box"], "answer": "A reference",
   "explanation": "Borrowing creates a reference."},
  {"question": "Who owns a value?", "options": ["One owner", "Everyone", "No one", "The GC"], "answer": "One owner"}
]"#;

fn questions() -> Vec<QuizQuestion> {
    parse_quiz(QUIZ).unwrap()
}

#[test]
fn test_parse_valid_quiz() {
    let quiz = questions();
    assert_eq!(quiz.len(), 2);
    assert_eq!(quiz[0].answer, "A reference");
    assert_eq!(quiz[0].explanation.as_deref(), Some("Borrowing creates a reference."));
    assert_eq!(quiz[1].explanation, None);
    assert_eq!(quiz[1].options.len(), 4);
}

#[test]
fn test_fenced_quiz_parses_identically() {
    let fenced = format!("```json\n{}\n```", QUIZ);
    assert_eq!(parse_quiz(&fenced).unwrap(), questions());

    let bare_fence = format!("```\n{}\n```", QUIZ);
    assert_eq!(parse_quiz(&bare_fence).unwrap(), questions());
}

#[test]
fn test_rejects_malformed_quizzes() {
    assert!(matches!(parse_quiz("nope"), Err(ParseError::InvalidJson(_))));
    assert_eq!(parse_quiz(r#"{"question": "Q"}"#), Err(ParseError::NotAnArray));
    assert_eq!(parse_quiz("[]"), Err(ParseError::EmptyQuiz));

    let two_options = r#"[{"question": "Q", "options": ["A", "B"], "answer": "A"}]"#;
    assert!(matches!(
        parse_quiz(two_options),
        Err(ParseError::InvalidQuestion { index: 0, .. })
    ));

    let foreign_answer = r#"[
      {"question": "Q1", "options": ["A", "B", "C"], "answer": "A"},
      {"question": "Q2", "options": ["A", "B", "C"], "answer": "Z"}
    ]"#;
    assert!(matches!(
        parse_quiz(foreign_answer),
        Err(ParseError::InvalidQuestion { index: 1, .. })
    ));

    let missing_answer = r#"[{"question": "Q", "options": ["A", "B", "C"]}]"#;
    assert!(matches!(
        parse_quiz(missing_answer),
        Err(ParseError::InvalidQuestion { index: 0, .. })
    ));
}

#[test]
fn test_prompt_embeds_transcript() {
    let prompt = quiz_prompt("Speaker 1: ownership matters");
    assert!(prompt.contains("Speaker 1: ownership matters"));
    assert!(prompt.ends_with("---"));
}

#[test]
fn test_session_starts_unanswered() {
    let session = QuizSession::new(questions().len());
    assert_eq!(session.selections().len(), 2);
    assert_eq!(session.answered(), 0);
    assert!(!session.is_complete());
}

#[test]
fn test_selection_can_change_until_complete() {
    let quiz = questions();
    let mut session = QuizSession::new(quiz.len());

    assert_eq!(session.select(&quiz, 0, "A copy"), SelectOutcome::Recorded);
    assert_eq!(session.select(&quiz, 0, "A reference"), SelectOutcome::Recorded);
    assert_eq!(session.selection(0), Some("A reference"));
    assert_eq!(session.answered(), 1);

    assert_eq!(
        session.select(&quiz, 1, "The GC"),
        SelectOutcome::Completed { score: 1 }
    );
    assert_eq!(session.select(&quiz, 1, "One owner"), SelectOutcome::Ignored);
    assert_eq!(session.score(), Some(1));
}

#[test]
fn test_perfect_score() {
    let quiz = questions();
    let mut session = QuizSession::new(quiz.len());
    session.select(&quiz, 1, "One owner");
    let outcome = session.select(&quiz, 0, "A reference");
    assert_eq!(outcome, SelectOutcome::Completed { score: 2 });
}
