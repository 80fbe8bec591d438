//! Content orchestrator: the per-request state machine.
//!
//! Drives summary and transcript retrieval, gates quiz generation on the
//! transcript, merges partial results, and tracks loading/error state per
//! section.
//!
//! Fetches run as spawned tasks and report back over a channel; the
//! orchestrator is the only writer of its state and applies completions in
//! `next_completion`. Each task carries a ticket (request generation plus
//! per-section attempt). Completions whose ticket is no longer current are
//! dropped, so a late answer for an old request never touches the new one.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::prompts::quiz_prompt;
use crate::adapters::ContentModel;
use crate::domain::{
    parse_content, parse_quiz, ContentMode, ContentPayload, ContentResult, QuizQuestion,
    QuizSession, Section, SectionErrors, SectionState, SectionStates, SelectOutcome, VideoRef,
};

use super::error::SectionError;

/// Identifies the fetch a completion belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    generation: u64,
    section: Section,
    attempt: u64,
}

/// Parsed payload of a successful fetch
#[derive(Debug)]
enum Payload {
    Content(ContentPayload),
    Quiz(Vec<QuizQuestion>),
}

/// Message sent from a fetch task back to the orchestrator
#[derive(Debug)]
struct Completion {
    ticket: Ticket,
    outcome: Result<Payload, SectionError>,
}

/// Effect of applying one completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The section moved to a terminal state
    Updated {
        section: Section,
        state: SectionState,
    },
    /// The completion belonged to a superseded request or attempt
    Discarded { section: Section },
}

/// Serializable view of the orchestrator state
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoRef>,
    pub states: SectionStates,
    pub errors: SectionErrors,
    pub result: ContentResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_session: Option<QuizSession>,
}

/// Main content orchestrator
pub struct Orchestrator {
    /// Model backend used for every fetch
    model: Arc<dyn ContentModel>,

    /// Incremented on every submit
    generation: u64,

    /// Correlates log lines of one request
    request_id: Option<Uuid>,

    video: Option<VideoRef>,
    result: ContentResult,
    states: SectionStates,
    errors: SectionErrors,
    session: Option<QuizSession>,

    /// Latest attempt number per section within the current generation
    attempts: HashMap<Section, u64>,

    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Orchestrator {
    /// Create an idle orchestrator around a model backend
    pub fn new(model: Arc<dyn ContentModel>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            model,
            generation: 0,
            request_id: None,
            video: None,
            result: ContentResult::default(),
            states: SectionStates::default(),
            errors: SectionErrors::default(),
            session: None,
            attempts: HashMap::new(),
            tx,
            rx,
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Start a new request, discarding everything from the previous one.
    ///
    /// Summary and transcript are fetched concurrently; the quiz stays idle.
    /// Returns the new generation.
    #[instrument(skip(self, video), fields(video = %video))]
    pub fn submit(&mut self, video: VideoRef) -> u64 {
        self.generation += 1;
        let request_id = Uuid::new_v4();
        self.request_id = Some(request_id);
        self.video = Some(video);
        self.result = ContentResult::default();
        self.errors = SectionErrors::default();
        self.session = None;
        self.attempts.clear();
        self.states = SectionStates {
            summary: SectionState::Loading,
            transcript: SectionState::Loading,
            quiz: SectionState::Idle,
        };

        info!(generation = self.generation, %request_id, "Request submitted");

        self.start_content(ContentMode::Summary);
        self.start_content(ContentMode::Transcript);
        self.generation
    }

    /// Request a quiz built from the current transcript.
    ///
    /// Ignored unless the transcript is ready and no quiz fetch is in flight.
    /// Returns true if a fetch was started.
    pub fn generate_quiz(&mut self) -> bool {
        if self.states.transcript != SectionState::Ready {
            debug!(transcript = ?self.states.transcript, "Quiz requested before transcript is ready");
            return false;
        }
        if self.states.quiz == SectionState::Loading {
            debug!("Quiz already loading");
            return false;
        }
        if self.result.transcript.trim().is_empty() {
            debug!("Quiz requested for an empty transcript");
            return false;
        }

        self.states.quiz = SectionState::Loading;
        self.errors.clear(Section::Quiz);
        self.session = None;
        self.result.quiz.clear();

        let ticket = self.next_ticket(Section::Quiz);
        let model = Arc::clone(&self.model);
        let prompt = quiz_prompt(&self.result.transcript);

        info!(generation = ticket.generation, attempt = ticket.attempt, "Generating quiz");

        self.dispatch(ticket, async move {
            let fetched = model
                .fetch_quiz(&prompt)
                .await
                .map_err(SectionError::fetch(Section::Quiz));
            fetched.and_then(|raw| {
                parse_quiz(&raw)
                    .map(Payload::Quiz)
                    .map_err(SectionError::parse(Section::Quiz))
            })
        });
        true
    }

    /// Record an answer; scores the quiz once every question is answered
    pub fn select_option(&mut self, index: usize, option: &str) -> SelectOutcome {
        let outcome = match self.session.as_mut() {
            Some(session) => session.select(&self.result.quiz, index, option),
            None => SelectOutcome::Ignored,
        };

        match outcome {
            SelectOutcome::Completed { score } => {
                info!(score, total = self.result.quiz.len(), "Quiz completed");
            }
            SelectOutcome::Ignored => {
                debug!(index, option, "Selection ignored");
            }
            SelectOutcome::Recorded => {}
        }
        outcome
    }

    /// Retry a failed section without touching the others.
    ///
    /// Returns true if a fetch was started.
    pub fn retry(&mut self, section: Section) -> bool {
        match section {
            Section::Quiz => self.generate_quiz(),
            Section::Summary | Section::Transcript => {
                if self.video.is_none() || self.states.get(section) != SectionState::Error {
                    debug!(%section, state = ?self.states.get(section), "Retry ignored");
                    return false;
                }
                let mode = match section {
                    Section::Summary => ContentMode::Summary,
                    _ => ContentMode::Transcript,
                };
                self.start_content(mode);
                true
            }
        }
    }

    /// Wait for the next fetch to finish and apply it
    pub async fn next_completion(&mut self) -> Option<Applied> {
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply completions until no section is loading
    pub async fn settle(&mut self) {
        while self.states.any_loading() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn video(&self) -> Option<&VideoRef> {
        self.video.as_ref()
    }

    pub fn state(&self, section: Section) -> SectionState {
        self.states.get(section)
    }

    pub fn states(&self) -> SectionStates {
        self.states
    }

    pub fn error(&self, section: Section) -> Option<&str> {
        self.errors.get(section)
    }

    pub fn result(&self) -> &ContentResult {
        &self.result
    }

    pub fn quiz_session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    /// True while any section is waiting on the model
    pub fn is_loading(&self) -> bool {
        self.states.any_loading()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            video: self.video.clone(),
            states: self.states,
            errors: self.errors.clone(),
            result: self.result.clone(),
            quiz_session: self.session.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn next_ticket(&mut self, section: Section) -> Ticket {
        let attempt = self.attempts.entry(section).or_insert(0);
        *attempt += 1;
        Ticket {
            generation: self.generation,
            section,
            attempt: *attempt,
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
            && self.attempts.get(&ticket.section) == Some(&ticket.attempt)
            && self.states.get(ticket.section) == SectionState::Loading
    }

    /// Begin a single content fetch for one section
    fn start_content(&mut self, mode: ContentMode) {
        let section = match mode {
            ContentMode::Summary => Section::Summary,
            ContentMode::Transcript => Section::Transcript,
        };
        let Some(video) = self.video.clone() else {
            return;
        };

        self.states.set(section, SectionState::Loading);
        self.errors.clear(section);

        let ticket = self.next_ticket(section);
        let model = Arc::clone(&self.model);

        debug!(%section, generation = ticket.generation, attempt = ticket.attempt, "Fetching content");

        self.dispatch(ticket, async move {
            let fetched = model
                .fetch_content(mode, &video)
                .await
                .map_err(SectionError::fetch(section));
            fetched.and_then(|raw| {
                parse_content(mode, &raw)
                    .map(Payload::Content)
                    .map_err(SectionError::parse(section))
            })
        });
    }

    /// Run a fetch in the background and report its outcome.
    ///
    /// The work runs in its own task so a panic surfaces as an error for
    /// that section only.
    fn dispatch<F>(&self, ticket: Ticket, work: F)
    where
        F: Future<Output = Result<Payload, SectionError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match tokio::spawn(work).await {
                Ok(outcome) => outcome,
                Err(e) => Err(SectionError::Aborted {
                    section: ticket.section,
                    reason: e.to_string(),
                }),
            };
            // Receiver only goes away with the orchestrator itself
            let _ = tx.send(Completion { ticket, outcome });
        });
    }

    /// Fold a completion into the state, unless it is stale
    fn apply(&mut self, completion: Completion) -> Applied {
        let Completion { ticket, outcome } = completion;
        let section = ticket.section;

        if !self.is_current(&ticket) {
            debug!(
                %section,
                ticket_generation = ticket.generation,
                generation = self.generation,
                attempt = ticket.attempt,
                "Discarding stale completion"
            );
            return Applied::Discarded { section };
        }

        let state = match outcome {
            Ok(Payload::Content(payload)) => {
                if let Some(title) = payload.title.as_deref() {
                    if self.result.offer_title(title) {
                        debug!(%section, title, "Title set");
                    }
                }
                match section {
                    Section::Summary => self.result.summary = payload.body,
                    Section::Transcript => self.result.transcript = payload.body,
                    Section::Quiz => {}
                }
                SectionState::Ready
            }
            Ok(Payload::Quiz(questions)) => {
                self.session = Some(QuizSession::new(questions.len()));
                self.result.quiz = questions;
                SectionState::Ready
            }
            Err(e) => {
                warn!(%section, error = %e, "Section failed");
                self.errors.set(section, e.to_string());
                SectionState::Error
            }
        };

        self.states.set(section, state);
        info!(
            %section,
            ?state,
            generation = self.generation,
            request_id = ?self.request_id,
            "Section updated"
        );
        Applied::Updated { section, state }
    }
}
