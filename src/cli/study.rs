//! Interactive study session.
//!
//! Reads commands from stdin while section fetches complete in the
//! background; both are multiplexed with `tokio::select!` so the view is
//! refreshed as soon as a section lands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::config::ResolvedConfig;
use crate::core::{Applied, Orchestrator};
use crate::domain::{validate, QuizSession, Section, SelectOutcome};
use crate::shell::{Playback, Shell, SystemClipboard, SystemSpeech};

const HELP: &str = "\
Commands:
  url <link>                  Load a YouTube video
  tab <summary|transcript|quiz>
                              Switch tab
  show                        Show the active tab
  quiz                        Generate a quiz from the transcript
  answer <question#> <option#>
                              Answer a quiz question (e.g. `answer 2 3`)
  retry <section>             Retry a failed section
  listen                      Read the summary aloud (again to stop)
  copy                        Copy the active tab's text
  export [dir]                Export the active tab as a text document
  status                      Show section states
  help                        Show this help
  quit                        Leave the session";

/// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyCommand {
    Url(String),
    Tab(Section),
    Show,
    Quiz,
    Answer { question: usize, option: usize },
    Retry(Section),
    Listen,
    Copy,
    Export(Option<PathBuf>),
    Status,
    Help,
    Quit,
    Empty,
}

/// Parse a line typed at the prompt. Question and option numbers are 1-based.
pub fn parse_command(line: &str) -> Result<StudyCommand, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(StudyCommand::Empty);
    };
    let rest: Vec<&str> = words.collect();

    let section_arg = |rest: &[&str]| -> Result<Section, String> {
        rest.first()
            .ok_or_else(|| "Missing section (summary, transcript or quiz)".to_string())?
            .parse()
    };
    let number = |s: Option<&&str>, what: &str| -> Result<usize, String> {
        s.ok_or_else(|| format!("Missing {} number", what))?
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("Invalid {} number", what))
    };

    match head.to_ascii_lowercase().as_str() {
        "url" | "u" => match rest.first() {
            Some(_) => Ok(StudyCommand::Url(rest.join(" "))),
            None => Err("Usage: url <link>".to_string()),
        },
        "tab" => section_arg(&rest).map(StudyCommand::Tab),
        "summary" | "transcript" => head.parse().map(StudyCommand::Tab),
        "show" => Ok(StudyCommand::Show),
        "quiz" => Ok(StudyCommand::Quiz),
        "answer" | "a" => Ok(StudyCommand::Answer {
            question: number(rest.first(), "question")?,
            option: number(rest.get(1), "option")?,
        }),
        "retry" => section_arg(&rest).map(StudyCommand::Retry),
        "listen" | "stop" => Ok(StudyCommand::Listen),
        "copy" => Ok(StudyCommand::Copy),
        "export" | "download" => Ok(StudyCommand::Export(rest.first().map(PathBuf::from))),
        "status" => Ok(StudyCommand::Status),
        "help" | "?" => Ok(StudyCommand::Help),
        "quit" | "exit" | "q" => Ok(StudyCommand::Quit),
        // A bare link is treated as a submission
        other if other.contains("youtu") => Ok(StudyCommand::Url(line.trim().to_string())),
        other => Err(format!("Unknown command '{}'. Type `help` for a list.", other)),
    }
}

/// Run the interactive session until `quit` or end of input
pub async fn run(config: &ResolvedConfig, mut orchestrator: Orchestrator, url: Option<String>) -> Result<()> {
    let speech = Arc::new(SystemSpeech::new(&config.speech_command));
    {
        let speech = Arc::clone(&speech);
        tokio::spawn(async move {
            if let Err(e) = speech.refresh_voices().await {
                warn!(error = %e, "Speech voices unavailable");
            }
        });
    }
    let clipboard = Arc::new(SystemClipboard::new(config.clipboard_command.clone()));
    let mut shell = Shell::new(speech, clipboard, config.export.clone());

    println!("youcademy ({}). Type `help` for commands.", orchestrator.model_name());
    match url {
        Some(url) => submit(&mut orchestrator, &mut shell, &url).await,
        None => println!("{}", shell.render(&orchestrator)),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(StudyCommand::Quit) => break,
                    Ok(command) => handle(command, &mut orchestrator, &mut shell).await,
                    Err(message) => println!("{}", message),
                }
            }
            Some(applied) = orchestrator.next_completion() => {
                if let Applied::Updated { section, state } = applied {
                    println!("[{} {:?}]", section, state);
                    if section == shell.tab() {
                        println!("{}", shell.render(&orchestrator));
                    }
                }
            }
        }
    }

    shell.reset().await.ok();
    Ok(())
}

async fn submit(orchestrator: &mut Orchestrator, shell: &mut Shell, input: &str) {
    if orchestrator.is_loading() {
        println!("Please wait for the current request to finish.");
        return;
    }
    match validate(input) {
        Ok(video) => {
            orchestrator.submit(video);
            if let Err(e) = shell.reset().await {
                warn!(error = %e, "Failed to stop playback");
            }
            println!("{}", shell.render(orchestrator));
        }
        Err(e) => println!("{}", e),
    }
}

async fn handle(command: StudyCommand, orchestrator: &mut Orchestrator, shell: &mut Shell) {
    match command {
        StudyCommand::Empty | StudyCommand::Quit => {}
        StudyCommand::Url(url) => submit(orchestrator, shell, &url).await,
        StudyCommand::Tab(section) => {
            shell.set_tab(section);
            println!("{}", shell.render(orchestrator));
        }
        StudyCommand::Show => println!("{}", shell.render(orchestrator)),
        StudyCommand::Quiz => {
            shell.set_tab(Section::Quiz);
            if !orchestrator.generate_quiz() {
                println!("A quiz can be generated once the transcript is ready (and no quiz is loading).");
            }
            println!("{}", shell.render(orchestrator));
        }
        StudyCommand::Answer { question, option } => answer(orchestrator, shell, question, option),
        StudyCommand::Retry(section) => {
            if orchestrator.retry(section) {
                shell.set_tab(section);
                println!("{}", shell.render(orchestrator));
            } else {
                println!("Nothing to retry for the {}.", section);
            }
        }
        StudyCommand::Listen => match shell.toggle_listen(orchestrator).await {
            Ok(Playback::Started) => println!("Reading the summary aloud. Type `listen` again to stop."),
            Ok(Playback::Stopped) => println!("Stopped."),
            Err(e) => println!("{}", e),
        },
        StudyCommand::Copy => match shell.copy(orchestrator, shell.tab()).await {
            Ok(()) => println!("Copied the {} to the clipboard.", shell.tab()),
            Err(e) => println!("{}", e),
        },
        StudyCommand::Export(dir) => {
            match shell.export(orchestrator, shell.tab(), dir.as_deref()).await {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => println!("{}", e),
            }
        }
        StudyCommand::Status => print_status(orchestrator),
        StudyCommand::Help => println!("{}", HELP),
    }
}

fn answer(orchestrator: &mut Orchestrator, shell: &mut Shell, question: usize, option: usize) {
    let chosen = orchestrator
        .result()
        .quiz
        .get(question - 1)
        .and_then(|q| q.options.get(option - 1))
        .cloned();

    let Some(chosen) = chosen else {
        println!("No such question or option.");
        return;
    };

    shell.set_tab(Section::Quiz);
    if orchestrator.select_option(question - 1, &chosen) == SelectOutcome::Ignored {
        println!("{}", ignored_answer_message(orchestrator.quiz_session()));
    }
    println!("{}", shell.render(orchestrator));
}

/// Why an answer was not recorded
fn ignored_answer_message(session: Option<&QuizSession>) -> &'static str {
    match session {
        Some(session) if session.is_complete() => "The quiz is already complete.",
        Some(_) => "That option could not be recorded.",
        None => "There is no quiz to answer yet. Type `quiz` to generate one.",
    }
}

fn print_status(orchestrator: &Orchestrator) {
    match orchestrator.video() {
        Some(video) => println!("Video: {} ({})", video.id(), video.watch_url()),
        None => println!("Video: (none)"),
    }
    println!("Title: {}", orchestrator.result().display_title());
    for section in Section::ALL {
        match orchestrator.error(section) {
            Some(error) => println!("  {:<11} {:?}: {}", section.label(), orchestrator.state(section), error),
            None => println!("  {:<11} {:?}", section.label(), orchestrator.state(section)),
        }
    }
}
