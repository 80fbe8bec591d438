//! YouTube URL validation.
//!
//! Accepts watch URLs (`?v=ID`), short URLs (`youtu.be/ID`) and embed URLs
//! (`/embed/ID`). Structured parsing is attempted first; anything it cannot
//! resolve goes through a permissive regex scan of the raw input.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Length of every YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// Message shown when no identifier can be extracted
pub const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL. Please enter a valid URL (e.g., youtube.com/watch?v=... or youtu.be/...).";

/// Fallback pattern for inputs the URL parser rejects (missing scheme, odd paths)
fn fallback_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
            .expect("fallback video id pattern is valid")
    })
}

/// Validation failures for user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please paste a YouTube URL.")]
    Empty,

    #[error("{}", INVALID_URL_MESSAGE)]
    NoVideoId { input: String },
}

/// A validated reference to a single video.
///
/// Immutable once created; a new submission always builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRef {
    id: String,
    source: String,
}

impl VideoRef {
    /// The 11-character video identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The input the identifier was extracted from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Canonical watch URL, used as the file URI sent to the model
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    /// Embeddable player URL
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?rel=0", self.id)
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Validate free-form input and extract a video reference
pub fn validate(input: &str) -> Result<VideoRef, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    extract_video_id(trimmed)
        .map(|id| VideoRef {
            id,
            source: trimmed.to_string(),
        })
        .ok_or_else(|| ValidationError::NoVideoId {
            input: trimmed.to_string(),
        })
}

/// Extract an 11-character video id, or None
pub fn extract_video_id(input: &str) -> Option<String> {
    if let Some(id) = extract_structured(input).filter(|id| is_id_length(id)) {
        return Some(id);
    }

    let captures = fallback_pattern().captures(input)?;
    let id = captures.get(2)?.as_str();
    is_id_length(id).then(|| id.to_string())
}

/// Inspect hostname and path/query of a well-formed URL
fn extract_structured(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    let host = parsed.host_str()?;

    if host.contains("youtube.com") {
        if let Some((_, v)) = parsed.query_pairs().find(|(key, _)| key == "v") {
            if !v.is_empty() {
                return Some(v.into_owned());
            }
        }
        if let Some(rest) = parsed.path().strip_prefix("/embed/") {
            return Some(rest.to_string());
        }
    }

    if host.contains("youtu.be") {
        return parsed.path().strip_prefix('/').map(str::to_string);
    }

    None
}

fn is_id_length(id: &str) -> bool {
    id.chars().count() == VIDEO_ID_LEN
}
