//! youcademy - AI study companion for YouTube videos
//!
//! Turns a YouTube link into a summary, a speaker-labelled transcript, and a
//! multiple-choice quiz generated from that transcript, using a multimodal
//! model (Gemini) as the backend.
//!
//! # Architecture
//!
//! The system is built around a per-request state machine:
//! - Every submission gets a new generation; late results from older
//!   generations are discarded
//! - Summary and transcript load concurrently and fail independently
//! - The quiz is only generated on demand, from a ready transcript
//!
//! # Modules
//!
//! - `adapters`: Model backends (Gemini) and prompts
//! - `core`: Orchestration logic (Orchestrator, SectionError)
//! - `domain`: Data structures (VideoRef, ContentResult, QuizSession)
//! - `shell`: Tabs, views, read-aloud, clipboard and export
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Interactive session
//! youcademy study https://youtu.be/dQw4w9WgXcQ
//!
//! # One-shot fetch with quiz, as JSON
//! youcademy fetch https://youtu.be/dQw4w9WgXcQ --quiz --json
//!
//! # Check a URL
//! youcademy validate "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod shell;

// Re-export main types at crate root for convenience
pub use core::{Orchestrator, SectionError};
pub use domain::{ContentResult, QuizQuestion, QuizSession, Section, SectionState, VideoRef};

// Model backends
pub use adapters::{ContentModel, GeminiClient, ModelError};
