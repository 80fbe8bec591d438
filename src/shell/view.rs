//! Text views for each tab.

use crate::core::Orchestrator;
use crate::domain::{QuizQuestion, QuizSession, Section, SectionState};

const OPTION_LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Letter shown in front of an option
pub fn option_letter(index: usize) -> char {
    OPTION_LETTERS.get(index).copied().unwrap_or('?')
}

/// Render the active tab
pub fn render(orchestrator: &Orchestrator, tab: Section) -> String {
    if orchestrator.video().is_none() {
        return "Paste a YouTube URL with `url <link>` to get started.".to_string();
    }

    match orchestrator.state(tab) {
        SectionState::Loading => loading(tab),
        SectionState::Error => error(tab, orchestrator.error(tab).unwrap_or_default()),
        SectionState::Idle | SectionState::Ready => match tab {
            Section::Quiz => quiz_view(orchestrator),
            Section::Summary | Section::Transcript => text_view(orchestrator, tab),
        },
    }
}

fn loading(tab: Section) -> String {
    format!(
        "Generating {}...\nAI is working its magic. Please wait.",
        tab.label()
    )
}

fn error(tab: Section, message: &str) -> String {
    format!(
        "Error Generating {}\n{}\n\nType `retry {}` to try again.",
        tab.label(),
        message,
        tab
    )
}

fn text_view(orchestrator: &Orchestrator, tab: Section) -> String {
    let result = orchestrator.result();
    let body = result.text(tab).unwrap_or_default();

    let mut out = String::new();
    out.push_str(result.display_title());
    out.push('\n');
    out.push_str(&"=".repeat(result.display_title().chars().count()));
    out.push_str("\n\n");
    if body.trim().is_empty() {
        out.push_str(&format!("{} will appear here.", tab.label()));
    } else {
        out.push_str(body);
    }
    out
}

fn quiz_view(orchestrator: &Orchestrator) -> String {
    let result = orchestrator.result();

    match (orchestrator.quiz_session(), result.quiz.is_empty()) {
        (Some(session), false) => questions(&result.quiz, session),
        _ if orchestrator.state(Section::Transcript) != SectionState::Ready => {
            "The quiz can be generated once the transcript is ready.".to_string()
        }
        _ => "Ready to test your knowledge?\nType `quiz` to generate questions from the transcript."
            .to_string(),
    }
}

fn questions(quiz: &[QuizQuestion], session: &QuizSession) -> String {
    let complete = session.is_complete();
    let mut out = String::new();

    for (i, question) in quiz.iter().enumerate() {
        let selected = session.selection(i);
        out.push_str(&format!("{}. {}\n", i + 1, question.question));

        for (j, option) in question.options.iter().enumerate() {
            let is_selected = selected == Some(option.as_str());
            let mark = match (complete, is_selected, *option == question.answer) {
                (true, _, true) => "[✓]",
                (true, true, false) => "[✗]",
                (false, true, _) => "[x]",
                _ => "[ ]",
            };
            out.push_str(&format!("   {} {}) {}\n", mark, option_letter(j), option));
        }

        if selected.is_some() {
            if let Some(explanation) = &question.explanation {
                out.push_str(&format!("   Explanation: {}\n", explanation));
            }
        }
        out.push('\n');
    }

    match session.score() {
        Some(score) => out.push_str(&format!("Quiz Complete! {} / {}", score, quiz.len())),
        None => out.push_str(&format!(
            "Answered {} of {}. Use `answer <question#> <option#>`.",
            session.answered(),
            quiz.len()
        )),
    }
    out
}
