//! Domain types for youcademy.
//!
//! This module contains the core data structures:
//! - Video: URL validation and the validated video reference
//! - Content: sections, section states, and the aggregated result
//! - Quiz: questions and the answering session
//! - Payload: parse-and-validate of model responses

pub mod content;
pub mod payload;
pub mod quiz;
pub mod video;

// Re-export commonly used types
pub use content::{ContentResult, Section, SectionErrors, SectionState, SectionStates, UNTITLED};
pub use payload::{parse_content, parse_quiz, strip_code_fence, ContentMode, ContentPayload, ParseError};
pub use quiz::{QuizQuestion, QuizSession, SelectOutcome};
pub use video::{validate, ValidationError, VideoRef};
