//! Quiz questions and the answering session.

use serde::{Deserialize, Serialize};

/// A multiple-choice question as returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Result of recording a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Nothing changed (quiz finished, bad index, or unknown option)
    Ignored,
    /// Selection stored, some questions still unanswered
    Recorded,
    /// Last open question answered; score computed
    Completed { score: usize },
}

/// User answers for one quiz instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSession {
    selections: Vec<Option<String>>,
    score: Option<usize>,
}

impl QuizSession {
    /// One empty slot per question
    pub fn new(question_count: usize) -> Self {
        Self {
            selections: vec![None; question_count],
            score: None,
        }
    }

    pub fn selections(&self) -> &[Option<String>] {
        &self.selections
    }

    pub fn selection(&self, index: usize) -> Option<&str> {
        self.selections.get(index).and_then(|s| s.as_deref())
    }

    pub fn score(&self) -> Option<usize> {
        self.score
    }

    pub fn is_complete(&self) -> bool {
        self.score.is_some()
    }

    pub fn answered(&self) -> usize {
        self.selections.iter().filter(|s| s.is_some()).count()
    }

    /// Record an answer and score the quiz once every slot is filled.
    ///
    /// The score is computed exactly once; later selections are ignored.
    pub fn select(&mut self, quiz: &[QuizQuestion], index: usize, option: &str) -> SelectOutcome {
        if self.score.is_some() {
            return SelectOutcome::Ignored;
        }

        let Some(question) = quiz.get(index) else {
            return SelectOutcome::Ignored;
        };
        if index >= self.selections.len() || !question.has_option(option) {
            return SelectOutcome::Ignored;
        }

        self.selections[index] = Some(option.to_string());

        if self.selections.iter().all(Option::is_some) {
            let score = self
                .selections
                .iter()
                .zip(quiz)
                .filter(|(selected, q)| selected.as_deref() == Some(q.answer.as_str()))
                .count();
            self.score = Some(score);
            return SelectOutcome::Completed { score };
        }

        SelectOutcome::Recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: format!("Pick {}", answer),
            options: vec!["A".into(), "B".into(), "C".into(), "X".into()],
            answer: answer.to_string(),
            explanation: None,
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = QuizSession::new(4);
        assert_eq!(session.selections(), &[None, None, None, None]);
        assert_eq!(session.score(), None);
    }

    #[test]
    fn test_unknown_option_ignored() {
        let quiz = vec![question("A")];
        let mut session = QuizSession::new(1);
        assert_eq!(session.select(&quiz, 0, "Z"), SelectOutcome::Ignored);
        assert_eq!(session.answered(), 0);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let quiz = vec![question("A")];
        let mut session = QuizSession::new(1);
        assert_eq!(session.select(&quiz, 3, "A"), SelectOutcome::Ignored);
    }

    #[test]
    fn test_score_counts_matches() {
        let quiz = vec![question("A"), question("B"), question("C")];
        let mut session = QuizSession::new(3);
        assert_eq!(session.select(&quiz, 0, "A"), SelectOutcome::Recorded);
        assert_eq!(session.select(&quiz, 1, "X"), SelectOutcome::Recorded);
        assert_eq!(session.select(&quiz, 2, "C"), SelectOutcome::Completed { score: 2 });
        assert_eq!(session.score(), Some(2));
    }
}
