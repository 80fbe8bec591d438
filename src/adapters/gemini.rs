//! Gemini adapter for content and quiz generation.
//!
//! Talks to the `models/{model}:generateContent` REST endpoint. Content
//! requests attach the video as a file part; quiz requests are text only.
//! Both ask for a JSON response body.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::prompts::content_prompt;
use super::{ContentModel, ModelError};
use crate::config::GeminiSettings;
use crate::domain::{ContentMode, VideoRef};

const VIDEO_MIME_TYPE: &str = "video/mp4";
const JSON_MIME_TYPE: &str = "application/json";

/// Gemini REST client
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: &'static str,
    file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

/// Response body (only the fields we read)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Result<String, ModelError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelError::NoContent {
                reason: format!("prompt blocked ({})", reason),
            });
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ModelError::NoContent {
                reason: "no candidates returned".to_string(),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .map(|r| format!("empty response (finish reason {})", r))
                .unwrap_or_else(|| "empty response".to_string());
            return Err(ModelError::NoContent { reason });
        }

        Ok(text)
    }
}

impl GeminiClient {
    /// Create a client from resolved settings
    pub fn from_settings(settings: &GeminiSettings) -> Result<Self, ModelError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ModelError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        Ok(Self {
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Model this client targets
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the generateContent URL
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one generateContent call and return the response text
    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String, ModelError> {
        let request = GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini request rejected");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Transport(format!("unreadable response body: {}", e)))?;

        let text = parsed.into_text()?;
        debug!(bytes = text.len(), "Gemini response received");
        Ok(text)
    }
}

#[async_trait]
impl ContentModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, video), fields(model = %self.model, video = %video))]
    async fn fetch_content(&self, mode: ContentMode, video: &VideoRef) -> Result<String, ModelError> {
        let parts = vec![
            Part::Text {
                text: content_prompt(mode),
            },
            Part::File {
                file_data: FileData {
                    mime_type: VIDEO_MIME_TYPE,
                    file_uri: video.watch_url(),
                },
            },
        ];
        self.generate(parts).await
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn fetch_quiz(&self, prompt: &str) -> Result<String, ModelError> {
        self.generate(vec![Part::Text { text: prompt }]).await
    }
}
