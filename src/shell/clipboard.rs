//! Clipboard copy via a system command (`pbcopy`, `wl-copy`, `xclip`).

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

const COPY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("No clipboard command configured")]
    NotConfigured,

    #[error("Failed to run clipboard command '{command}': {reason}")]
    Command { command: String, reason: String },

    #[error("Clipboard command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Destination for copied text
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard backed by a command that reads the text from stdin
pub struct SystemClipboard {
    command: Vec<String>,
    timeout: Duration,
}

impl SystemClipboard {
    pub fn new(command: Vec<String>) -> Self {
        Self::with_timeout(command, COPY_TIMEOUT)
    }

    /// Bound on writing the text and waiting for the command to exit
    pub fn with_timeout(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let (program, args) = self.command.split_first().ok_or(ClipboardError::NotConfigured)?;
        let failed = |reason: String| ClipboardError::Command {
            command: program.clone(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(text.as_bytes()).await?;
                // Drop stdin to signal EOF
            }
            child.wait_with_output().await
        };

        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| ClipboardError::Timeout {
                command: program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(stderr.trim().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_clipboard() {
        let clipboard = SystemClipboard::new(Vec::new());
        assert!(matches!(
            clipboard.copy("text").await,
            Err(ClipboardError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let clipboard = SystemClipboard::new(vec!["/nonexistent/youcademy-clip".to_string()]);
        assert!(matches!(
            clipboard.copy("text").await,
            Err(ClipboardError::Command { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stalled_reader_times_out() {
        // `sleep` never drains stdin, so a large write blocks on the full pipe
        let clipboard = SystemClipboard::with_timeout(
            vec!["sleep".to_string(), "30".to_string()],
            Duration::from_millis(200),
        );
        let text = "x".repeat(4 * 1024 * 1024);

        let started = std::time::Instant::now();
        let result = clipboard.copy(&text).await;
        assert!(matches!(result, Err(ClipboardError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_through_cat() {
        let clipboard = SystemClipboard::new(vec!["cat".to_string()]);
        assert!(clipboard.copy("hello").await.is_ok());
    }
}
