//! Model client interfaces.
//!
//! The orchestrator depends only on the `ContentModel` trait; the Gemini
//! client is one implementation and tests inject scripted ones.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ContentMode, VideoRef};

// Re-export the Gemini client
pub use gemini::GeminiClient;

/// Failures talking to the model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("API key is missing. Please set the GEMINI_API_KEY environment variable.")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model declined to produce content: {reason}")]
    NoContent { reason: String },
}

/// Generative model reached through a single request/response call.
///
/// Both operations are single-shot; retrying is the caller's job.
#[async_trait]
pub trait ContentModel: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Produce a summary or transcript for a video; text expected to be a JSON object
    async fn fetch_content(&self, mode: ContentMode, video: &VideoRef) -> Result<String, ModelError>;

    /// Produce a quiz from a prompt embedding the transcript; text expected to be a JSON array
    async fn fetch_quiz(&self, prompt: &str) -> Result<String, ModelError>;
}
