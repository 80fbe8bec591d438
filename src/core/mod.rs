//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: per-request state machine for summary, transcript and quiz
//! - SectionError: per-section failure taxonomy

pub mod error;
pub mod orchestrator;

// Re-export commonly used types
pub use error::SectionError;
pub use orchestrator::{Applied, Orchestrator, Snapshot};
