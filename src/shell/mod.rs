//! Presentation shell.
//!
//! Holds the active tab and the side-effect services (speech, clipboard,
//! export). Actions only borrow the orchestrator, so they can read results
//! but never change section state.

pub mod clipboard;
pub mod export;
pub mod speech;
pub mod view;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::ExportSettings;
use crate::core::Orchestrator;
use crate::domain::Section;

pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use export::ExportError;
pub use speech::{pick_voice, SpeechError, SpeechHandle, SpeechSynthesizer, SystemSpeech, Voice};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("There is no {0} to share yet")]
    NothingToShare(Section),

    #[error("Only the summary and transcript can be copied")]
    NotCopyable(Section),

    #[error("No speech synthesis voice is available on your system.")]
    NoVoice,

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a listen toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Started,
    Stopped,
}

pub struct Shell {
    tab: Section,
    speech: Arc<dyn SpeechSynthesizer>,
    clipboard: Arc<dyn Clipboard>,
    export: ExportSettings,
    voices: watch::Receiver<Vec<Voice>>,
    voice: Option<Voice>,
    playing: Option<SpeechHandle>,
}

impl Shell {
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        clipboard: Arc<dyn Clipboard>,
        export: ExportSettings,
    ) -> Self {
        let voices = speech.subscribe_voices();
        let voice = pick_voice(&voices.borrow());
        Self {
            tab: Section::Summary,
            speech,
            clipboard,
            export,
            voices,
            voice,
            playing: None,
        }
    }

    pub fn tab(&self) -> Section {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Section) {
        self.tab = tab;
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// Back to the summary tab with playback stopped; called on every submit
    pub async fn reset(&mut self) -> Result<(), ShellError> {
        self.tab = Section::Summary;
        self.stop().await
    }

    /// Re-pick the voice if the engine reported a new voice list
    pub fn refresh_voice(&mut self) {
        if self.voices.has_changed().unwrap_or(false) {
            self.voice = pick_voice(&self.voices.borrow_and_update());
            debug!(voice = ?self.voice.as_ref().map(|v| &v.name), "Voice selection updated");
        }
    }

    /// View text for the active tab
    pub fn render(&self, orchestrator: &Orchestrator) -> String {
        view::render(orchestrator, self.tab)
    }

    /// True while the summary is being read aloud
    pub fn is_playing(&mut self) -> bool {
        match self.playing {
            Some(handle) if self.speech.is_speaking(handle) => true,
            Some(_) => {
                self.playing = None;
                false
            }
            None => false,
        }
    }

    /// Read the summary aloud, or stop if it is already playing
    pub async fn toggle_listen(&mut self, orchestrator: &Orchestrator) -> Result<Playback, ShellError> {
        if self.is_playing() {
            self.stop().await?;
            return Ok(Playback::Stopped);
        }

        self.refresh_voice();
        let voice = self.voice.clone().ok_or(ShellError::NoVoice)?;
        let summary = orchestrator.result().summary.trim();
        if summary.is_empty() {
            return Err(ShellError::NothingToShare(Section::Summary));
        }

        let handle = self.speech.speak(summary, &voice).await?;
        self.playing = Some(handle);
        info!(voice = %voice.name, "Reading summary aloud");
        Ok(Playback::Started)
    }

    async fn stop(&mut self) -> Result<(), ShellError> {
        if let Some(handle) = self.playing.take() {
            self.speech.cancel(handle).await?;
        }
        Ok(())
    }

    /// Copy the summary or transcript
    pub async fn copy(&self, orchestrator: &Orchestrator, section: Section) -> Result<(), ShellError> {
        let text = orchestrator
            .result()
            .text(section)
            .ok_or(ShellError::NotCopyable(section))?;
        if text.trim().is_empty() {
            return Err(ShellError::NothingToShare(section));
        }

        self.clipboard.copy(text).await?;
        info!(%section, chars = text.len(), "Copied to clipboard");
        Ok(())
    }

    /// Export the summary or transcript to `dir` (or the configured directory)
    pub async fn export(
        &self,
        orchestrator: &Orchestrator,
        section: Section,
        dir: Option<&Path>,
    ) -> Result<PathBuf, ShellError> {
        let result = orchestrator.result();
        let body = result.text(section).unwrap_or_default();
        let dir = dir.unwrap_or(&self.export.dir);

        let path = export::export(section, result.display_title(), body, &self.export, dir).await?;
        info!(%section, path = %path.display(), "Exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::adapters::{ContentModel, ModelError};
    use crate::domain::{validate, ContentMode, VideoRef};

    /// Answers every content request, with or without a title
    struct FixedModel {
        title: Option<&'static str>,
    }

    #[async_trait]
    impl ContentModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_content(&self, mode: ContentMode, _video: &VideoRef) -> Result<String, ModelError> {
            let mut payload = match mode {
                ContentMode::Summary => serde_json::json!({ "summary": "Borrow, don't steal." }),
                ContentMode::Transcript => serde_json::json!({ "transcript": "Speaker 1: hello" }),
            };
            if let Some(title) = self.title {
                payload["title"] = title.into();
            }
            Ok(payload.to_string())
        }

        async fn fetch_quiz(&self, _prompt: &str) -> Result<String, ModelError> {
            Err(ModelError::Transport("unused".into()))
        }
    }

    #[derive(Default)]
    struct FakeSpeech {
        voices: Option<watch::Sender<Vec<Voice>>>,
        active: Mutex<HashSet<u64>>,
        spoken: Mutex<Vec<String>>,
    }

    impl FakeSpeech {
        fn with_voices(voices: Vec<Voice>) -> Self {
            let (tx, _) = watch::channel(voices);
            Self {
                voices: Some(tx),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        fn voices(&self) -> Vec<Voice> {
            self.voices.as_ref().map(|v| v.borrow().clone()).unwrap_or_default()
        }

        fn subscribe_voices(&self) -> watch::Receiver<Vec<Voice>> {
            match &self.voices {
                Some(tx) => tx.subscribe(),
                None => watch::channel(Vec::new()).1,
            }
        }

        async fn speak(&self, text: &str, _voice: &Voice) -> Result<SpeechHandle, SpeechError> {
            let mut spoken = self.spoken.lock().unwrap();
            spoken.push(text.to_string());
            let id = spoken.len() as u64;
            self.active.lock().unwrap().insert(id);
            Ok(SpeechHandle::from_raw(id))
        }

        async fn cancel(&self, handle: SpeechHandle) -> Result<(), SpeechError> {
            self.active.lock().unwrap().remove(&handle.raw());
            Ok(())
        }

        fn is_speaking(&self, handle: SpeechHandle) -> bool {
            self.active.lock().unwrap().contains(&handle.raw())
        }
    }

    #[derive(Default)]
    struct FakeClipboard {
        copied: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Clipboard for FakeClipboard {
        async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn english() -> Voice {
        Voice {
            id: "en-us".into(),
            name: "Samantha".into(),
            lang: "en_US".into(),
        }
    }

    async fn ready_orchestrator() -> Orchestrator {
        orchestrator_with_title(Some("Ownership 101")).await
    }

    async fn orchestrator_with_title(title: Option<&'static str>) -> Orchestrator {
        let mut orchestrator = Orchestrator::new(Arc::new(FixedModel { title }));
        orchestrator.submit(validate("https://youtu.be/dQw4w9WgXcQ").unwrap());
        orchestrator.settle().await;
        orchestrator
    }

    fn export_settings(dir: &Path) -> ExportSettings {
        ExportSettings {
            dir: dir.to_path_buf(),
            line_width: 60,
            lines_per_page: 20,
        }
    }

    #[tokio::test]
    async fn test_listen_toggles() {
        let orchestrator = ready_orchestrator().await;
        let speech = Arc::new(FakeSpeech::with_voices(vec![english()]));
        let mut shell = Shell::new(speech.clone(), Arc::new(FakeClipboard::default()), ExportSettings::default());

        assert_eq!(shell.toggle_listen(&orchestrator).await.unwrap(), Playback::Started);
        assert!(shell.is_playing());
        assert_eq!(speech.spoken.lock().unwrap()[0], "Borrow, don't steal.");

        assert_eq!(shell.toggle_listen(&orchestrator).await.unwrap(), Playback::Stopped);
        assert!(!shell.is_playing());
    }

    #[tokio::test]
    async fn test_listen_without_voice() {
        let orchestrator = ready_orchestrator().await;
        let mut shell = Shell::new(
            Arc::new(FakeSpeech::default()),
            Arc::new(FakeClipboard::default()),
            ExportSettings::default(),
        );
        assert!(matches!(
            shell.toggle_listen(&orchestrator).await,
            Err(ShellError::NoVoice)
        ));
    }

    #[tokio::test]
    async fn test_voice_picked_up_after_change() {
        let speech = Arc::new(FakeSpeech::with_voices(Vec::new()));
        let mut shell = Shell::new(speech.clone(), Arc::new(FakeClipboard::default()), ExportSettings::default());
        assert!(shell.voice().is_none());

        speech.voices.as_ref().unwrap().send_replace(vec![english()]);
        shell.refresh_voice();
        assert_eq!(shell.voice().unwrap().name, "Samantha");
    }

    #[tokio::test]
    async fn test_reset_stops_playback_and_returns_to_summary() {
        let orchestrator = ready_orchestrator().await;
        let speech = Arc::new(FakeSpeech::with_voices(vec![english()]));
        let mut shell = Shell::new(speech.clone(), Arc::new(FakeClipboard::default()), ExportSettings::default());

        shell.set_tab(Section::Quiz);
        shell.toggle_listen(&orchestrator).await.unwrap();
        shell.reset().await.unwrap();

        assert_eq!(shell.tab(), Section::Summary);
        assert!(speech.active.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_section_text() {
        let orchestrator = ready_orchestrator().await;
        let clipboard = Arc::new(FakeClipboard::default());
        let shell = Shell::new(Arc::new(FakeSpeech::default()), clipboard.clone(), ExportSettings::default());

        shell.copy(&orchestrator, Section::Transcript).await.unwrap();
        assert_eq!(clipboard.copied.lock().unwrap().as_slice(), ["Speaker 1: hello"]);

        assert!(matches!(
            shell.copy(&orchestrator, Section::Quiz).await,
            Err(ShellError::NotCopyable(Section::Quiz))
        ));
    }

    #[tokio::test]
    async fn test_export_to_configured_dir() {
        let orchestrator = ready_orchestrator().await;
        let temp = TempDir::new().unwrap();
        let shell = Shell::new(
            Arc::new(FakeSpeech::default()),
            Arc::new(FakeClipboard::default()),
            export_settings(temp.path()),
        );

        let path = shell.export(&orchestrator, Section::Summary, None).await.unwrap();
        assert_eq!(path, temp.path().join("Summary_Ownership_101.txt"));
    }

    #[tokio::test]
    async fn test_export_without_title_uses_fallback() {
        let orchestrator = orchestrator_with_title(None).await;
        let temp = TempDir::new().unwrap();
        let shell = Shell::new(
            Arc::new(FakeSpeech::default()),
            Arc::new(FakeClipboard::default()),
            export_settings(temp.path()),
        );

        assert_eq!(orchestrator.state(Section::Summary), crate::domain::SectionState::Ready);
        let path = shell.export(&orchestrator, Section::Summary, None).await.unwrap();
        assert_eq!(path, temp.path().join("Summary_Untitled_Video.txt"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("UNTITLED VIDEO\n"));
        assert!(written.contains("Borrow, don't steal."));
    }

    #[tokio::test]
    async fn test_copy_empty_section() {
        let orchestrator = Orchestrator::new(Arc::new(FixedModel { title: None }));
        let shell = Shell::new(
            Arc::new(FakeSpeech::default()),
            Arc::new(FakeClipboard::default()),
            ExportSettings::default(),
        );
        assert!(matches!(
            shell.copy(&orchestrator, Section::Summary).await,
            Err(ShellError::NothingToShare(Section::Summary))
        ));
    }

    #[tokio::test]
    async fn test_render_follows_tab() {
        let orchestrator = ready_orchestrator().await;
        let mut shell = Shell::new(
            Arc::new(FakeSpeech::default()),
            Arc::new(FakeClipboard::default()),
            ExportSettings::default(),
        );

        assert!(shell.render(&orchestrator).contains("Borrow, don't steal."));
        shell.set_tab(Section::Quiz);
        assert!(shell.render(&orchestrator).starts_with("Ready to test your knowledge?"));
    }
}
