//! Prompt templates sent to the model.

use crate::domain::ContentMode;

/// Asks for a title and a 2-4 paragraph summary as `{title, summary}`
pub const SUMMARY_FROM_VIDEO_PROMPT: &str = r#"Analyze the video and provide the following:
1. A concise and accurate title for the video.
2. A summary of the video, capturing the main points and key takeaways in 2-4 paragraphs.

Respond with a single JSON object of the form {"title": string, "summary": string}."#;

/// Asks for a title and a speaker-labelled transcript as `{title, transcript}`
pub const TRANSCRIPT_FROM_VIDEO_PROMPT: &str = r#"Analyze the video and provide the following:
1. A concise and accurate title for the video.
2. A detailed, accurate, and well-formatted transcript. If possible, label different speakers (e.g., Speaker 1:, Speaker 2:).

Respond with a single JSON object of the form {"title": string, "transcript": string}."#;

/// Instruction block placed in front of the transcript
pub const QUIZ_FROM_TRANSCRIPT_PROMPT: &str = r#"Based on the video transcript provided below, generate a quiz with at least 10 multiple-choice questions.
The questions should be directly answerable from the information present in the transcript. Do not infer information beyond the provided text.
For each question, provide the question, 3-4 options, the correct answer, and a brief explanation.
Respond with a JSON array of objects of the form {"question": string, "options": string[], "answer": string, "explanation": string}. The answer must be exactly one of the options.
"#;

/// Template for a content request
pub fn content_prompt(mode: ContentMode) -> &'static str {
    match mode {
        ContentMode::Summary => SUMMARY_FROM_VIDEO_PROMPT,
        ContentMode::Transcript => TRANSCRIPT_FROM_VIDEO_PROMPT,
    }
}

/// Full quiz prompt with the transcript embedded
pub fn quiz_prompt(transcript: &str) -> String {
    format!(
        "{}\n\n---\nVideo Transcript:\n{}\n---",
        QUIZ_FROM_TRANSCRIPT_PROMPT, transcript
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_prompt_embeds_transcript() {
        let prompt = quiz_prompt("Speaker 1: hello");
        assert!(prompt.starts_with(QUIZ_FROM_TRANSCRIPT_PROMPT));
        assert!(prompt.ends_with("Video Transcript:\nSpeaker 1: hello\n---"));
    }

    #[test]
    fn test_content_prompt_names_field() {
        assert!(content_prompt(ContentMode::Summary).contains("\"summary\""));
        assert!(content_prompt(ContentMode::Transcript).contains("\"transcript\""));
    }
}
