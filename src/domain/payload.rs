//! Parse-and-validate for model output.
//!
//! Model responses are untyped text that is expected to be JSON of a known
//! shape. Nothing here trusts that expectation: every step returns a
//! `ParseError` instead of panicking.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::quiz::QuizQuestion;

/// Allowed number of options per question
pub const OPTIONS_PER_QUESTION: RangeInclusive<usize> = 3..=4;

/// Which text the content prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    Summary,
    Transcript,
}

impl ContentMode {
    /// JSON field carrying the requested text
    pub fn field(&self) -> &'static str {
        match self {
            ContentMode::Summary => "summary",
            ContentMode::Transcript => "transcript",
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Malformed model output
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing or non-text field '{0}'")]
    MissingField(&'static str),

    #[error("parsed data is not a valid quiz array")]
    NotAnArray,

    #[error("quiz contains no questions")]
    EmptyQuiz,

    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

/// Decoded content response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPayload {
    /// Title proposed by the model, if any
    pub title: Option<String>,
    /// The requested text (summary or transcript)
    pub body: String,
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("code fence pattern is valid")
    })
}

/// Remove a surrounding markdown code fence, if present
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match fence_pattern().captures(trimmed).and_then(|c| c.get(2)) {
        Some(inner) if !inner.as_str().trim().is_empty() => inner.as_str().trim(),
        _ => trimmed,
    }
}

fn parse_json(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Parse a summary/transcript response
pub fn parse_content(mode: ContentMode, raw: &str) -> Result<ContentPayload, ParseError> {
    let value = parse_json(raw)?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let body = object
        .get(mode.field())
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingField(mode.field()))?
        .to_string();

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(ContentPayload { title, body })
}

/// Parse and validate a quiz response
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizQuestion>, ParseError> {
    let value = parse_json(raw)?;
    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray);
    };
    if items.is_empty() {
        return Err(ParseError::EmptyQuiz);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let question: QuizQuestion =
                serde_json::from_value(item).map_err(|e| ParseError::InvalidQuestion {
                    index,
                    reason: e.to_string(),
                })?;
            validate_question(index, &question)?;
            Ok(question)
        })
        .collect()
}

fn validate_question(index: usize, question: &QuizQuestion) -> Result<(), ParseError> {
    let invalid = |reason: String| ParseError::InvalidQuestion { index, reason };

    if question.question.trim().is_empty() {
        return Err(invalid("empty question text".to_string()));
    }
    if !OPTIONS_PER_QUESTION.contains(&question.options.len()) {
        return Err(invalid(format!(
            "expected 3-4 options, got {}",
            question.options.len()
        )));
    }
    if !question.has_option(&question.answer) {
        return Err(invalid(format!(
            "answer '{}' is not one of the options",
            question.answer
        )));
    }
    Ok(())
}
