//! Command-line interface for youcademy.
//!
//! Provides an interactive study session, a one-shot fetch, URL validation,
//! and a configuration dump.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::GeminiClient;
use crate::config::{self, ResolvedConfig};
use crate::core::Orchestrator;
use crate::domain::{validate, Section, SectionState};
use crate::shell::view;

pub mod study;

/// youcademy - AI study companion for YouTube videos
#[derive(Parser, Debug)]
#[command(name = "youcademy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive study session
    Study {
        /// Video to load right away
        url: Option<String>,
    },

    /// Fetch summary and transcript for a video and print them
    Fetch {
        /// YouTube URL
        url: String,

        /// Also generate a quiz from the transcript
        #[arg(long)]
        quiz: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a YouTube URL and print the video id
    Validate {
        /// URL to check
        url: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Study { url } => {
                let cfg = config::config()?;
                let orchestrator = build_orchestrator(cfg)?;
                study::run(cfg, orchestrator, url).await
            }
            Commands::Fetch { url, quiz, json } => {
                fetch(&url, quiz, json).await
            }
            Commands::Validate { url } => {
                validate_url(&url)
            }
            Commands::Config => {
                show_config()
            }
        }
    }
}

/// Orchestrator backed by the configured Gemini model
fn build_orchestrator(cfg: &ResolvedConfig) -> Result<Orchestrator> {
    let client = GeminiClient::from_settings(&cfg.gemini)
        .context("Failed to set up the Gemini client (set GEMINI_API_KEY)")?;
    Ok(Orchestrator::new(Arc::new(client)))
}

/// Fetch everything for one video without interaction
async fn fetch(url: &str, with_quiz: bool, json: bool) -> Result<()> {
    let video = validate(url)?;
    let cfg = config::config()?;
    let mut orchestrator = build_orchestrator(cfg)?;

    eprintln!("Fetching summary and transcript for {}...", video.watch_url());
    orchestrator.submit(video);
    orchestrator.settle().await;

    if with_quiz {
        if orchestrator.generate_quiz() {
            eprintln!("Generating quiz...");
            orchestrator.settle().await;
        } else {
            eprintln!("Skipping quiz: transcript is not available");
        }
    }

    if json {
        let snapshot = orchestrator.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize result")?
        );
    } else {
        let mut sections = vec![Section::Summary, Section::Transcript];
        if with_quiz {
            sections.push(Section::Quiz);
        }
        for section in sections {
            println!("{}", view::render(&orchestrator, section));
            println!();
        }
    }

    let failed: Vec<String> = Section::ALL
        .iter()
        .filter(|s| orchestrator.state(**s) == SectionState::Error)
        .map(|s| s.to_string())
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("Failed sections: {}", failed.join(", "));
    }

    Ok(())
}

/// Print the extracted id and canonical URLs
fn validate_url(url: &str) -> Result<()> {
    match validate(url) {
        Ok(video) => {
            println!("Video ID:  {}", video.id());
            println!("Watch URL: {}", video.watch_url());
            println!("Embed URL: {}", video.embed_url());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("youcademy Configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Gemini:");
    println!("  Model:    {}", cfg.gemini.model);
    println!("  Base URL: {}", cfg.gemini.base_url);
    println!("  Timeout:  {}s", cfg.gemini.timeout_seconds);
    println!(
        "  API key:  {}",
        if cfg.gemini.api_key.is_some() { "set" } else { "(missing - set GEMINI_API_KEY)" }
    );
    println!();
    println!("Speech command:    {}", cfg.speech_command.join(" "));
    println!("Clipboard command: {}", cfg.clipboard_command.join(" "));
    println!();
    println!("Export:");
    println!("  Directory:      {}", cfg.export.dir.display());
    println!("  Line width:     {}", cfg.export.line_width);
    println!("  Lines per page: {}", cfg.export.lines_per_page);

    Ok(())
}
