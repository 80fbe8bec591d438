//! Per-section failures.
//!
//! Every failure is scoped to one section. Messages distinguish a request
//! that failed from a request that returned unusable data.

use thiserror::Error;

use crate::adapters::ModelError;
use crate::domain::{ParseError, Section};

/// Why a section ended up in the error state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("{}", fetch_message(*section, source))]
    Fetch {
        section: Section,
        source: ModelError,
    },

    #[error("{}", parse_message(*section, source))]
    Parse {
        section: Section,
        source: ParseError,
    },

    #[error("Generating the {section} stopped unexpectedly: {reason}")]
    Aborted { section: Section, reason: String },
}

impl SectionError {
    pub fn fetch(section: Section) -> impl FnOnce(ModelError) -> Self {
        move |source| SectionError::Fetch { section, source }
    }

    pub fn parse(section: Section) -> impl FnOnce(ParseError) -> Self {
        move |source| SectionError::Parse { section, source }
    }

    pub fn section(&self) -> Section {
        match self {
            SectionError::Fetch { section, .. }
            | SectionError::Parse { section, .. }
            | SectionError::Aborted { section, .. } => *section,
        }
    }

    /// True when the payload arrived but could not be used
    pub fn is_parse(&self) -> bool {
        matches!(self, SectionError::Parse { .. })
    }
}

fn fetch_message(section: Section, source: &ModelError) -> String {
    match section {
        Section::Quiz => format!(
            "Failed to generate quiz. The model may have had an issue creating the content. Details: {}",
            source
        ),
        _ => format!(
            "Failed to generate {}. Please check the video URL and your API key. Details: {}",
            section, source
        ),
    }
}

fn parse_message(section: Section, source: &ParseError) -> String {
    match section {
        Section::Quiz => format!(
            "AI returned invalid quiz data. The response could not be used as a quiz. Details: {}",
            source
        ),
        _ => format!("AI returned invalid {} data. Details: {}", section, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_failure_kinds() {
        let fetch = SectionError::fetch(Section::Summary)(ModelError::Transport("offline".into()));
        let parse = SectionError::parse(Section::Summary)(ParseError::NotAnObject);

        assert!(fetch.to_string().starts_with("Failed to generate summary."));
        assert!(fetch.to_string().contains("offline"));
        assert!(parse.to_string().starts_with("AI returned invalid summary data."));
        assert!(parse.is_parse());
        assert!(!fetch.is_parse());
    }

    #[test]
    fn test_quiz_fetch_message() {
        let err = SectionError::fetch(Section::Quiz)(ModelError::NoContent {
            reason: "empty response".into(),
        });
        assert!(err.to_string().starts_with("Failed to generate quiz."));
        assert_eq!(err.section(), Section::Quiz);
    }
}
