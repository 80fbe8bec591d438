//! Paginated document export for summaries and transcripts.
//!
//! Layout: upper-cased title, a rule, an export stamp, then the body
//! word-wrapped to the configured width. Pages hold a fixed number of lines,
//! end with a "Page i of n" footer, and are separated by form feeds.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs;

use crate::config::ExportSettings;
use crate::domain::Section;

const MAX_TITLE_CHARS: usize = 50;
const PAGE_BREAK: char = '\u{000C}';

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There is no {0} to export yet")]
    NothingToExport(Section),

    #[error("Only the summary and transcript can be exported")]
    NotExportable(Section),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// File name for an exported section, e.g. `Summary_My_Talk.txt`
pub fn file_name(section: Section, title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_TITLE_CHARS)
        .collect();
    format!("{}_{}.txt", section.label(), sanitized)
}

/// Greedy word wrap; paragraphs and blank lines are kept, overlong words are split
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                let piece: String = chunk.iter().collect();
                let piece_len = chunk.len();

                if current_len > 0 && current_len + 1 + piece_len > width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(&piece);
                current_len += piece_len;
            }
        }

        lines.push(current);
    }

    lines
}

/// Split lines into pages of at most `lines_per_page` lines
pub fn paginate(lines: Vec<String>, lines_per_page: usize) -> Vec<Vec<String>> {
    let per_page = lines_per_page.max(1);
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines.chunks(per_page).map(<[String]>::to_vec).collect()
}

/// Render the full document text
pub fn render_document(
    section: Section,
    title: &str,
    body: &str,
    settings: &ExportSettings,
    exported_at: DateTime<Utc>,
) -> String {
    let width = settings.line_width.max(1);

    let mut lines = wrap(&title.to_uppercase(), width);
    lines.push("-".repeat(width));
    lines.push(format!(
        "{} | exported {}",
        section.label(),
        exported_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(String::new());
    lines.extend(wrap(body, width));

    let pages = paginate(lines, settings.lines_per_page);
    let total = pages.len();

    let mut document = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            document.push(PAGE_BREAK);
            document.push('\n');
        }
        for line in page {
            document.push_str(line);
            document.push('\n');
        }
        document.push('\n');
        document.push_str(&format!("Page {} of {}\n", i + 1, total));
    }
    document
}

/// Write a section to `dir` and return the file path
pub async fn export(
    section: Section,
    title: &str,
    body: &str,
    settings: &ExportSettings,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    if section == Section::Quiz {
        return Err(ExportError::NotExportable(section));
    }
    if body.trim().is_empty() || title.trim().is_empty() {
        return Err(ExportError::NothingToExport(section));
    }

    fs::create_dir_all(dir).await.map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name(section, title));
    let document = render_document(section, title, body, settings, Utc::now());
    fs::write(&path, document)
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn settings(width: usize, lines: usize) -> ExportSettings {
        ExportSettings {
            dir: PathBuf::from("."),
            line_width: width,
            lines_per_page: lines,
        }
    }

    #[test]
    fn test_file_name_sanitized_and_truncated() {
        assert_eq!(file_name(Section::Summary, "Rust: A Tour!"), "Summary_Rust__A_Tour_.txt");
        let long = "x".repeat(80);
        assert_eq!(
            file_name(Section::Transcript, &long),
            format!("Transcript_{}.txt", "x".repeat(50))
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
    }

    #[test]
    fn test_wrap_keeps_paragraphs_and_splits_long_words() {
        let lines = wrap("abcdefghij\n\nxy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "", "xy"]);
    }

    #[test]
    fn test_paginate() {
        let lines: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let pages = paginate(lines, 2);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2], vec!["4".to_string()]);
    }

    #[test]
    fn test_render_document_pages() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let body = "word ".repeat(40);
        let doc = render_document(Section::Summary, "My Talk", &body, &settings(20, 5), at);

        assert!(doc.starts_with("MY TALK\n"));
        assert!(doc.contains("Summary | exported 2026-10-18 09:30 UTC"));
        assert!(doc.contains("Page 1 of "));
        assert_eq!(doc.matches(PAGE_BREAK).count() + 1, doc.matches("Page ").count());
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = export(
            Section::Transcript,
            "Talk",
            "Speaker 1: hi",
            &settings(40, 10),
            temp.path(),
        )
        .await
        .unwrap();

        assert_eq!(path, temp.path().join("Transcript_Talk.txt"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Speaker 1: hi"));
    }

    #[tokio::test]
    async fn test_export_requires_content() {
        let temp = TempDir::new().unwrap();
        let result = export(Section::Summary, "Talk", "  ", &settings(40, 10), temp.path()).await;
        assert!(matches!(result, Err(ExportError::NothingToExport(Section::Summary))));
    }
}
