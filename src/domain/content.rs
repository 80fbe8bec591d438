//! Sections, their lifecycle states, and the aggregated content result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::quiz::QuizQuestion;

/// Title shown when no fetch has produced one
pub const UNTITLED: &str = "Untitled Video";

/// One independently loaded part of the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Transcript,
    Quiz,
}

impl Section {
    /// All sections in display order
    pub const ALL: [Section; 3] = [Section::Summary, Section::Transcript, Section::Quiz];

    /// Capitalized label for headings
    pub fn label(&self) -> &'static str {
        match self {
            Section::Summary => "Summary",
            Section::Transcript => "Transcript",
            Section::Quiz => "Quiz",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Summary => "summary",
            Section::Transcript => "transcript",
            Section::Quiz => "quiz",
        };
        f.write_str(name)
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" | "s" => Ok(Section::Summary),
            "transcript" | "t" => Ok(Section::Transcript),
            "quiz" | "q" => Ok(Section::Quiz),
            other => Err(format!("Unknown section '{}'", other)),
        }
    }
}

/// Loading lifecycle of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Per-section states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionStates {
    pub summary: SectionState,
    pub transcript: SectionState,
    pub quiz: SectionState,
}

impl SectionStates {
    pub fn get(&self, section: Section) -> SectionState {
        match section {
            Section::Summary => self.summary,
            Section::Transcript => self.transcript,
            Section::Quiz => self.quiz,
        }
    }

    pub fn set(&mut self, section: Section, state: SectionState) {
        match section {
            Section::Summary => self.summary = state,
            Section::Transcript => self.transcript = state,
            Section::Quiz => self.quiz = state,
        }
    }

    /// True while any section is waiting on the model
    pub fn any_loading(&self) -> bool {
        Section::ALL
            .iter()
            .any(|s| self.get(*s) == SectionState::Loading)
    }
}

/// Per-section error messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<String>,
}

impl SectionErrors {
    pub fn get(&self, section: Section) -> Option<&str> {
        match section {
            Section::Summary => self.summary.as_deref(),
            Section::Transcript => self.transcript.as_deref(),
            Section::Quiz => self.quiz.as_deref(),
        }
    }

    fn slot(&mut self, section: Section) -> &mut Option<String> {
        match section {
            Section::Summary => &mut self.summary,
            Section::Transcript => &mut self.transcript,
            Section::Quiz => &mut self.quiz,
        }
    }

    pub fn set(&mut self, section: Section, message: impl Into<String>) {
        *self.slot(section) = Some(message.into());
    }

    pub fn clear(&mut self, section: Section) {
        *self.slot(section) = None;
    }
}

/// Aggregated output of one request, filled in incrementally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResult {
    pub title: String,
    pub summary: String,
    pub transcript: String,
    pub quiz: Vec<QuizQuestion>,
}

impl ContentResult {
    /// Set the title unless one is already present.
    ///
    /// Returns true if this call wrote the title.
    pub fn offer_title(&mut self, title: &str) -> bool {
        let candidate = title.trim();
        if !self.title.is_empty() || candidate.is_empty() {
            return false;
        }
        self.title = candidate.to_string();
        true
    }

    /// Title for display, with the untitled fallback
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Text of a text section (the quiz has none)
    pub fn text(&self, section: Section) -> Option<&str> {
        match section {
            Section::Summary => Some(&self.summary),
            Section::Transcript => Some(&self.transcript),
            Section::Quiz => None,
        }
    }
}
