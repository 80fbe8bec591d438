//! Read-aloud through a text-to-speech engine.
//!
//! The platform engine is process-wide, so it sits behind the
//! `SpeechSynthesizer` trait and callers hold handles instead of touching
//! the engine directly. `SystemSpeech` drives a local TTS binary (`say` on
//! macOS, `espeak` elsewhere).

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, warn};

/// An installed voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier passed back to the engine
    pub id: String,
    /// Display name
    pub name: String,
    /// Language tag (e.g. `en_US`, `en-gb`)
    pub lang: String,
}

impl Voice {
    pub fn is_english(&self) -> bool {
        self.lang.to_ascii_lowercase().starts_with("en")
    }
}

/// Identifies one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeechHandle(u64);

impl SpeechHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Failed to start speech command '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("Speech command '{command}' failed: {reason}")]
    Command { command: String, reason: String },
}

/// Text-to-speech engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Currently known voices
    fn voices(&self) -> Vec<Voice>;

    /// Notified whenever the voice list changes
    fn subscribe_voices(&self) -> watch::Receiver<Vec<Voice>>;

    /// Start reading `text` aloud
    async fn speak(&self, text: &str, voice: &Voice) -> Result<SpeechHandle, SpeechError>;

    /// Stop an utterance; unknown or finished handles are ignored
    async fn cancel(&self, handle: SpeechHandle) -> Result<(), SpeechError>;

    /// True while the utterance is still playing
    fn is_speaking(&self, handle: SpeechHandle) -> bool;
}

/// Preferred voice: an English voice with a female-sounding name, else any English voice
pub fn pick_voice(voices: &[Voice]) -> Option<Voice> {
    const PREFERRED: [&str; 3] = ["Female", "Samantha", "Zira"];

    voices
        .iter()
        .find(|v| v.is_english() && PREFERRED.iter().any(|p| v.name.contains(p)))
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .cloned()
}

/// Which command-line dialect the configured binary speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// macOS `say`
    Say,
    /// `espeak` / `espeak-ng`
    Espeak,
}

impl Dialect {
    fn detect(program: &str) -> Self {
        let name = Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name == "say" {
            Dialect::Say
        } else {
            Dialect::Espeak
        }
    }

    fn list_args(&self) -> &'static [&'static str] {
        match self {
            Dialect::Say => &["-v", "?"],
            Dialect::Espeak => &["--voices"],
        }
    }

    fn speak_args(&self, voice: &Voice) -> Vec<String> {
        match self {
            Dialect::Say => vec!["-v".into(), voice.id.clone(), "-f".into(), "-".into()],
            Dialect::Espeak => vec!["-v".into(), voice.id.clone(), "--stdin".into()],
        }
    }

    fn parse_voices(&self, listing: &str) -> Vec<Voice> {
        match self {
            Dialect::Say => parse_say_voices(listing),
            Dialect::Espeak => parse_espeak_voices(listing),
        }
    }
}

/// `say -v ?` lines look like `Samantha            en_US    # Hello, my name is Samantha.`
fn parse_say_voices(listing: &str) -> Vec<Voice> {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let line = LINE.get_or_init(|| {
        Regex::new(r"^(.+?)\s+([a-z]{2,3}[_-][A-Za-z0-9]+)\s+#").expect("say voice pattern is valid")
    });

    listing
        .lines()
        .filter_map(|l| line.captures(l))
        .map(|c| {
            let name = c[1].trim().to_string();
            Voice {
                id: name.clone(),
                name,
                lang: c[2].to_string(),
            }
        })
        .collect()
}

/// `espeak --voices` prints a header, then `Pty Language Age/Gender VoiceName File ...`
fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter(|l| !l.trim_start().starts_with("Pty"))
        .filter_map(|l| {
            let tokens: Vec<&str> = l.split_whitespace().collect();
            if tokens.len() < 4 {
                return None;
            }
            let gender = if tokens[2].ends_with('F') { " (Female)" } else { "" };
            Some(Voice {
                id: tokens[1].to_string(),
                name: format!("{}{}", tokens[3], gender),
                lang: tokens[1].to_string(),
            })
        })
        .collect()
}

/// Speech through a local TTS binary
pub struct SystemSpeech {
    program: String,
    args: Vec<String>,
    dialect: Dialect,
    voices: watch::Sender<Vec<Voice>>,
    children: Mutex<HashMap<u64, Child>>,
    next_id: AtomicU64,
}

impl SystemSpeech {
    /// Create from a command line (program followed by extra arguments)
    pub fn new(command: &[String]) -> Self {
        let (program, args) = match command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => ("espeak".to_string(), Vec::new()),
        };
        let (voices, _) = watch::channel(Vec::new());

        Self {
            dialect: Dialect::detect(&program),
            program,
            args,
            voices,
            children: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Query the engine for its voices and notify subscribers.
    ///
    /// Returns the number of voices found.
    pub async fn refresh_voices(&self) -> Result<usize, SpeechError> {
        let output = Command::new(&self.program)
            .args(self.dialect.list_args())
            .output()
            .await
            .map_err(|e| SpeechError::Spawn {
                command: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SpeechError::Command {
                command: self.program.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let voices = self
            .dialect
            .parse_voices(&String::from_utf8_lossy(&output.stdout));
        let count = voices.len();
        debug!(count, program = %self.program, "Voices loaded");
        self.voices.send_replace(voices);
        Ok(count)
    }
}

#[async_trait]
impl SpeechSynthesizer for SystemSpeech {
    fn voices(&self) -> Vec<Voice> {
        self.voices.borrow().clone()
    }

    fn subscribe_voices(&self) -> watch::Receiver<Vec<Voice>> {
        self.voices.subscribe()
    }

    async fn speak(&self, text: &str, voice: &Voice) -> Result<SpeechHandle, SpeechError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(self.dialect.speak_args(voice))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Spawn {
                command: self.program.clone(),
                reason: e.to_string(),
            })?;

        // Feed text in the background so long passages don't block the caller
        if let Some(mut stdin) = child.stdin.take() {
            let text = text.to_string();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(text.as_bytes()).await {
                    warn!(error = %e, "Failed to write text to speech command");
                }
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut children) = self.children.lock() {
            children.insert(id, child);
        }
        debug!(id, voice = %voice.name, "Speech started");
        Ok(SpeechHandle(id))
    }

    async fn cancel(&self, handle: SpeechHandle) -> Result<(), SpeechError> {
        let child = self
            .children
            .lock()
            .ok()
            .and_then(|mut children| children.remove(&handle.0));

        if let Some(mut child) = child {
            child.start_kill().map_err(|e| SpeechError::Command {
                command: self.program.clone(),
                reason: e.to_string(),
            })?;
            debug!(id = handle.0, "Speech cancelled");
        }
        Ok(())
    }

    fn is_speaking(&self, handle: SpeechHandle) -> bool {
        let Ok(mut children) = self.children.lock() else {
            return false;
        };
        let running = match children.get_mut(&handle.0) {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        if !running {
            children.remove(&handle.0);
        }
        running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice {
            id: name.to_string(),
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    #[test]
    fn test_pick_prefers_female_english() {
        let voices = vec![
            voice("Thomas", "fr_FR"),
            voice("Alex", "en_US"),
            voice("Samantha", "en_US"),
        ];
        assert_eq!(pick_voice(&voices).unwrap().name, "Samantha");
    }

    #[test]
    fn test_pick_falls_back_to_any_english() {
        let voices = vec![voice("Thomas", "fr_FR"), voice("Daniel", "en_GB")];
        assert_eq!(pick_voice(&voices).unwrap().name, "Daniel");
    }

    #[test]
    fn test_pick_none_without_english() {
        assert_eq!(pick_voice(&[voice("Anna", "de_DE")]), None);
        assert_eq!(pick_voice(&[]), None);
    }

    #[test]
    fn test_parse_say_listing() {
        let listing = "Alex                en_US    # Most people recognize me by my voice.\n\
                       Bad News            en_US    # The light you see at the end of the tunnel\n\
                       Thomas              fr_FR    # Bonjour";
        let voices = parse_say_voices(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].name, "Bad News");
        assert_eq!(voices[2].lang, "fr_FR");
    }

    #[test]
    fn test_parse_espeak_listing() {
        let listing = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                       5  af              --/M      Afrikaans          gmw/af\n \
                       5  en-us           --/F      English_(America)  gmw/en-US";
        let voices = parse_espeak_voices(listing);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, "en-us");
        assert_eq!(voices[1].name, "English_(America) (Female)");
        assert_eq!(pick_voice(&voices).unwrap().id, "en-us");
    }

    #[test]
    fn test_dialect_detection() {
        assert_eq!(Dialect::detect("/usr/bin/say"), Dialect::Say);
        assert_eq!(Dialect::detect("espeak-ng"), Dialect::Espeak);
    }
}
